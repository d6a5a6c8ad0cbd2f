//! Configuration constants and validation functions for the converter.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ConverterError, Result};

/// Namespace prefixes used in eForms notices.
///
/// Path expressions resolve prefixed names through this table.
pub const NAMESPACES: &[(&str, &str)] = &[
    (
        "cac",
        "urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2",
    ),
    (
        "cbc",
        "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2",
    ),
    (
        "ext",
        "urn:oasis:names:specification:ubl:schema:xsd:CommonExtensionComponents-2",
    ),
    (
        "efac",
        "http://data.europa.eu/p27/eforms-ubl-extension-aggregate-components/1",
    ),
    (
        "efbc",
        "http://data.europa.eu/p27/eforms-ubl-extension-basic-components/1",
    ),
    (
        "efext",
        "http://data.europa.eu/p27/eforms-ubl-extensions/1",
    ),
];

/// Namespace prefix of UBL document roots (ContractNotice-2, etc.).
pub const UBL_ROOT_NAMESPACE_PREFIX: &str = "urn:oasis:names:specification:ubl:schema:xsd:";

/// Root element names of eForms notices.
pub const EFORMS_ROOTS: &[&str] = &[
    "PriorInformationNotice",
    "ContractNotice",
    "ContractAwardNotice",
];

/// Namespace prefix of legacy TED schemas (R2.0.8, R2.0.9).
pub const TED_NAMESPACE_PREFIX: &str = "http://publications.europa.eu/resource/schema/ted/";

/// Default OCID prefix, registered for TED notices.
pub const DEFAULT_OCID_PREFIX: &str = "ocds-id6ixc";

/// Path from the notice root to the eForms extension block.
pub const EFORMS_EXTENSION: &str =
    "ext:UBLExtensions/ext:UBLExtension/ext:ExtensionContent/efext:EformsExtension";

/// Days per eForms duration unit, used to express durations in days.
pub const DAYS_PER_UNIT: &[(&str, i64)] = &[("DAY", 1), ("WEEK", 7), ("MONTH", 30), ("YEAR", 365)];

/// OCID prefix pattern: "ocds-" followed by six alphanumeric characters.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static OCID_PREFIX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ocds-[a-z0-9]{6}$").expect("valid regex"));

/// Converter id pattern: BT-, OPT-, OPP-, OPA- or TED- followed by a code.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static CONVERTER_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(BT|OPT|OPP|OPA|TED)-[0-9A-Za-z]+(\([a-z0-9]+\))?(-[A-Za-z0-9]+)*$")
        .expect("valid regex")
});

/// Look up the namespace URI for a prefix.
///
/// # Examples
/// ```
/// use eforms_ocds::config::namespace_uri;
///
/// assert!(namespace_uri("cbc").is_some());
/// assert!(namespace_uri("xyz").is_none());
/// ```
#[must_use]
pub fn namespace_uri(prefix: &str) -> Option<&'static str> {
    NAMESPACES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, uri)| *uri)
}

/// Validate OCID prefix format.
///
/// # Examples
/// ```
/// use eforms_ocds::config::validate_ocid_prefix;
///
/// assert!(validate_ocid_prefix("ocds-id6ixc").is_ok());
/// assert!(validate_ocid_prefix("id6ixc").is_err());
/// ```
pub fn validate_ocid_prefix(prefix: &str) -> Result<()> {
    if OCID_PREFIX_PATTERN.is_match(prefix) {
        Ok(())
    } else {
        Err(ConverterError::InvalidOcidPrefix(prefix.to_string()))
    }
}

/// Validate converter id format.
///
/// # Examples
/// ```
/// use eforms_ocds::config::validate_converter_id;
///
/// assert!(validate_converter_id("BT-21-Lot").is_ok());
/// assert!(validate_converter_id("OPT-300-Procedure-Buyer").is_ok());
/// assert!(validate_converter_id("title").is_err());
/// ```
pub fn validate_converter_id(id: &str) -> Result<()> {
    if CONVERTER_ID_PATTERN.is_match(id) {
        Ok(())
    } else {
        Err(ConverterError::InvalidConverterId(id.to_string()))
    }
}

/// Runtime configuration for a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConverterConfig {
    /// Prefix used to build the release `ocid`.
    pub ocid_prefix: String,

    /// Converter ids that must not run.
    pub skip: Vec<String>,

    /// When non-empty, only these converter ids run.
    pub only: Vec<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            ocid_prefix: DEFAULT_OCID_PREFIX.to_string(),
            skip: Vec::new(),
            only: Vec::new(),
        }
    }
}

impl ConverterConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text and validate it.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all fields.
    pub fn validate(&self) -> Result<()> {
        validate_ocid_prefix(&self.ocid_prefix)?;
        for id in self.skip.iter().chain(self.only.iter()) {
            validate_converter_id(id)?;
        }
        Ok(())
    }
}
