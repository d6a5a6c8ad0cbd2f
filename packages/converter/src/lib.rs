//! eForms OCDS - Convert EU procurement notices to OCDS releases.
//!
//! This crate converts eForms UBL notices (and legacy TED R2.0.9 exports)
//! into Open Contracting Data Standard release JSON. Each eForms business
//! term (BT-xxx) has a converter that extracts its value and contributes a
//! fragment; fragments are deep-merged into one release.
//!
//! # Example
//!
//! ```
//! use eforms_ocds::{convert_notice, ConverterConfig};
//!
//! let xml = r#"<ContractNotice
//!     xmlns="urn:oasis:names:specification:ubl:schema:xsd:ContractNotice-2"
//!     xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2">
//!     <cbc:ContractFolderID>1e86a664-ae3c-41eb-8529-0242ac130003</cbc:ContractFolderID>
//! </ContractNotice>"#;
//!
//! let conversion = convert_notice(xml, &ConverterConfig::default()).unwrap();
//! assert_eq!(
//!     conversion.release.get("ocid").and_then(|v| v.as_str()),
//!     Some("ocds-id6ixc-1e86a664-ae3c-41eb-8529-0242ac130003")
//! );
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Configuration constants and validation
//! - [`error`]: Error types and Result alias
//! - [`xml`]: XML utilities and path expressions
//! - [`format`]: Date, number and duration formatting
//! - [`codes`]: Code list mappings
//! - [`release`]: The release document and deep merge
//! - [`registry`]: Extensible field converter system
//! - [`notice`]: Notice format detection and metadata
//! - [`converter`]: Main conversion service
//! - [`output`]: JSON output
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod codes;
pub mod config;
pub mod converter;
pub mod error;
pub mod format;
pub mod notice;
pub mod output;
pub mod registry;
pub mod release;
pub mod xml;

// Re-export main functions
pub use converter::{convert_bytes, convert_file, convert_notice, Conversion};

// Re-export commonly used items
pub use config::{validate_converter_id, validate_ocid_prefix, ConverterConfig};
pub use error::{ConverterError, Result};
pub use notice::{NoticeFormat, NoticeMetadata};
pub use registry::{ConversionWarning, FieldConverter};
pub use release::Release;
