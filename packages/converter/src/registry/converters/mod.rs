//! Field converters, grouped by the part of the notice they read.
//!
//! Plain fields are [`FieldMapping`](super::FieldMapping) tables; fields
//! whose value depends on more than one element (references between
//! results, tenders and contracts, code lists with details, ...) have a
//! dedicated converter.

pub mod legacy;
pub mod lot;
pub mod notice;
pub mod organization;
pub mod procedure;
pub mod result;
pub mod roles;
pub mod withheld;

use serde_json::{json, Value};

use crate::release::deep_merge;

/// Fold `piece` into the fragment built so far.
pub(crate) fn accumulate(fragment: &mut Option<Value>, piece: Value) {
    match fragment.as_mut() {
        Some(existing) => deep_merge(existing, piece),
        None => *fragment = Some(piece),
    }
}

/// A `parties` fragment giving the organization `id` a role.
pub(crate) fn party_role(id: &str, role: &str) -> Value {
    json!({"parties": [{"id": id, "roles": [role]}]})
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers shared by the converter tests.

    use roxmltree::Document;
    use serde_json::Value;

    use crate::registry::{ConvertContext, FieldConverter};

    /// Namespace declarations for a test notice root.
    pub const NAMESPACES: &str = concat!(
        r#"xmlns="urn:oasis:names:specification:ubl:schema:xsd:ContractNotice-2" "#,
        r#"xmlns:cac="urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2" "#,
        r#"xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2" "#,
        r#"xmlns:ext="urn:oasis:names:specification:ubl:schema:xsd:CommonExtensionComponents-2" "#,
        r#"xmlns:efac="http://data.europa.eu/p27/eforms-ubl-extension-aggregate-components/1" "#,
        r#"xmlns:efbc="http://data.europa.eu/p27/eforms-ubl-extension-basic-components/1" "#,
        r#"xmlns:efext="http://data.europa.eu/p27/eforms-ubl-extensions/1""#,
    );

    /// Wrap `body` in a namespaced `ContractNotice` root.
    pub fn notice(body: &str) -> String {
        format!("<ContractNotice {NAMESPACES}>{body}</ContractNotice>")
    }

    /// Wrap `body` in the eForms extension block of a notice.
    pub fn extension(body: &str) -> String {
        notice(&format!(
            "<ext:UBLExtensions><ext:UBLExtension><ext:ExtensionContent>\
             <efext:EformsExtension>{body}</efext:EformsExtension>\
             </ext:ExtensionContent></ext:UBLExtension></ext:UBLExtensions>"
        ))
    }

    /// Run one converter over `xml`, returning its fragment and warnings.
    pub fn run(converter: &dyn FieldConverter, xml: &str) -> (Option<Value>, Vec<String>) {
        let doc = Document::parse(xml).unwrap();
        let mut context = ConvertContext::new();
        context.enter(converter.id());
        let fragment = converter.parse(doc.root_element(), &mut context).unwrap();
        let warnings = context
            .into_warnings()
            .into_iter()
            .map(|w| w.message)
            .collect();
        (fragment, warnings)
    }

    /// Run the converter with the given id from a mapping table.
    pub fn run_mapping(
        table: &[crate::registry::FieldMapping],
        id: &str,
        xml: &str,
    ) -> (Option<Value>, Vec<String>) {
        let mapping = table
            .iter()
            .find(|m| m.id == id)
            .unwrap_or_else(|| panic!("no mapping {id}"));
        run(mapping, xml)
    }
}
