//! Conversion engine that runs every registered converter over a notice.

use roxmltree::Node;

use super::core::ConverterRegistry;
use super::types::ConvertContext;
use crate::release::Release;

/// Engine that orchestrates field conversion using the registry.
///
/// The engine calls every active converter in registration order and
/// folds the fragments into one release. Converters are independent: an
/// error in one is logged and recorded as a warning, and the rest still run.
pub struct ConversionEngine {
    registry: ConverterRegistry,
}

impl ConversionEngine {
    /// Create a new engine with the given registry.
    #[must_use]
    pub fn new(registry: ConverterRegistry) -> Self {
        Self { registry }
    }

    /// Get a reference to the underlying registry.
    #[must_use]
    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    /// Run all converters over a notice.
    ///
    /// # Arguments
    /// * `root` - The notice root element
    /// * `context` - Conversion context collecting warnings
    ///
    /// # Returns
    /// The release built from every fragment. The release is not finalized.
    pub fn run(&self, root: Node<'_, '_>, context: &mut ConvertContext) -> Release {
        let mut release = Release::new();

        for converter in self.registry.active() {
            context.enter(converter.id());
            match converter.parse(root, context) {
                Ok(Some(fragment)) => converter.merge(&mut release, fragment),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        converter = %converter.id(),
                        "Error converting field, skipping"
                    );
                    context.record(format!("conversion failed: {err}"));
                }
            }
        }

        release
    }
}
