//! Error types for the converter.
//!
//! Uses the dual-error pattern: `ConverterError` for library consumers
//! with detailed error context, and conversion warnings for problems that
//! only affect a single field.

use thiserror::Error;

/// Main error type for the converter library.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// A path expression could not be parsed or evaluated.
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// The document is neither an eForms notice nor a legacy TED form.
    #[error("Unsupported notice format: root element <{root}>{}", .namespace.as_ref().map(|ns| format!(" in namespace {ns}")).unwrap_or_default())]
    UnsupportedFormat {
        root: String,
        namespace: Option<String>,
    },

    /// Invalid converter identifier format.
    #[error("Invalid converter id: '{0}'. Expected BT-, OPT-, OPP-, OPA- or TED- prefix (e.g., BT-21-Lot)")]
    InvalidConverterId(String),

    /// No converter registered under the given identifier.
    #[error("Unknown converter: {0}")]
    UnknownConverter(String),

    /// Invalid OCID prefix format.
    #[error("Invalid OCID prefix: '{0}'. Expected ocds- followed by 6 characters (e.g., ocds-id6ixc)")]
    InvalidOcidPrefix(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Some notices of a batch could not be converted.
    #[error("{failed} of {total} notices failed to convert")]
    BatchFailed { failed: usize, total: usize },

    /// Configuration file could not be read.
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_yaml_ng::Error),
}

/// Result type alias for converter operations.
pub type Result<T> = std::result::Result<T, ConverterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConverterError::InvalidConverterId("XX-1".to_string());
        assert!(err.to_string().contains("XX-1"));
        assert!(err.to_string().contains("BT-21-Lot"));
    }

    #[test]
    fn test_unsupported_format_with_namespace() {
        let err = ConverterError::UnsupportedFormat {
            root: "html".to_string(),
            namespace: Some("http://www.w3.org/1999/xhtml".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported notice format: root element <html> in namespace http://www.w3.org/1999/xhtml"
        );
    }

    #[test]
    fn test_unsupported_format_without_namespace() {
        let err = ConverterError::UnsupportedFormat {
            root: "foo".to_string(),
            namespace: None,
        };
        assert_eq!(err.to_string(), "Unsupported notice format: root element <foo>");
    }

    #[test]
    fn test_invalid_path_display() {
        let err = ConverterError::InvalidPath {
            path: "cbc:ID[".to_string(),
            reason: "unterminated predicate".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid path 'cbc:ID[': unterminated predicate"
        );
    }
}
