//! Field converter trait definition.

use roxmltree::Node;
use serde_json::Value;

use super::types::ConvertContext;
use crate::error::Result;
use crate::release::Release;

/// Trait for field converters.
///
/// A converter maps one business term of a notice to one fragment of the
/// release. `parse` extracts the fragment, `merge` folds it in.
pub trait FieldConverter: Send + Sync {
    /// Identifier of the business term, e.g. `BT-21-Lot`.
    fn id(&self) -> &str;

    /// Short description of what the converter maps.
    fn description(&self) -> &str;

    /// Extract the fragment for this field.
    ///
    /// # Arguments
    /// * `root` - The notice root element
    /// * `context` - Conversion context, for the OCID prefix and warnings
    ///
    /// # Returns
    /// `None` when the notice does not contain the field.
    fn parse(&self, root: Node<'_, '_>, context: &mut ConvertContext) -> Result<Option<Value>>;

    /// Fold a fragment produced by [`parse`](Self::parse) into the release.
    ///
    /// Default implementation deep-merges it, deduplicating entities by id.
    fn merge(&self, release: &mut Release, fragment: Value) {
        release.merge(fragment);
    }
}
