//! Types for the converter registry system.

use std::fmt;

use serde::Serialize;

use crate::config::DEFAULT_OCID_PREFIX;

/// A problem that affected a single field but not the conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionWarning {
    /// Id of the converter that raised the warning.
    pub converter: String,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.converter, self.message)
    }
}

/// Context passed to every converter during one conversion.
#[derive(Debug, Clone)]
pub struct ConvertContext {
    /// Prefix used to build the release `ocid`.
    pub ocid_prefix: String,

    /// Id of the converter currently running.
    current: String,

    /// Warnings collected so far.
    warnings: Vec<ConversionWarning>,
}

impl ConvertContext {
    /// Create a context with the default OCID prefix.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ocid_prefix: DEFAULT_OCID_PREFIX.to_string(),
            current: String::new(),
            warnings: Vec::new(),
        }
    }

    /// Set the OCID prefix.
    #[must_use]
    pub fn with_ocid_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.ocid_prefix = prefix.into();
        self
    }

    /// Mark `id` as the converter now running.
    pub fn enter(&mut self, id: &str) {
        self.current.clear();
        self.current.push_str(id);
    }

    /// Id of the converter now running.
    #[must_use]
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Log and record a warning for the running converter.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(converter = %self.current, "{message}");
        self.record(message);
    }

    /// Record a warning without logging it.
    pub(crate) fn record(&mut self, message: String) {
        self.warnings.push(ConversionWarning {
            converter: self.current.clone(),
            message,
        });
    }

    /// Record that `code` is not in the code list the converter expects.
    pub fn unknown_code(&mut self, code: &str) {
        self.warn(format!("unknown code '{code}'"));
    }

    /// Warnings collected so far.
    #[must_use]
    pub fn warnings(&self) -> &[ConversionWarning] {
        &self.warnings
    }

    /// Take ownership of the collected warnings.
    #[must_use]
    pub fn into_warnings(self) -> Vec<ConversionWarning> {
        self.warnings
    }
}

impl Default for ConvertContext {
    fn default() -> Self {
        Self::new()
    }
}
