//! Unpublished fields, written to `withheldInformation`.

use roxmltree::Node;
use serde_json::{json, Map, Value};

use crate::codes::{lookup, WITHHELD_FIELDS};
use crate::error::Result;
use crate::format::format_date;
use crate::registry::{ConvertContext, FieldConverter};
use crate::xml::{nearest_identifier, select, select_value};

/// BT-195, BT-196, BT-197 and BT-198: one entry per `efac:FieldsPrivacy`.
///
/// The entry id joins the withheld field and the id of the entity the
/// field belongs to (`win-cho-RES-0001`), so the same field withheld on
/// two results yields two entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct WithheldInformation;

impl WithheldInformation {
    fn entry(privacy: Node<'_, '_>, context: &mut ConvertContext) -> Result<Option<Value>> {
        let Some(field) = select_value(privacy, "efbc:FieldIdentifierCode")? else {
            return Ok(None);
        };
        let owner = privacy.parent_element().and_then(nearest_identifier);

        let mut entry = Map::new();
        let id = match owner {
            Some(owner) => format!("{field}-{owner}"),
            None => field.clone(),
        };
        entry.insert("id".into(), json!(id));
        entry.insert("field".into(), json!(field));
        match lookup(WITHHELD_FIELDS, &field) {
            Some(name) => {
                entry.insert("name".into(), json!(name));
            }
            None => context.unknown_code(&field),
        }

        if let Some(code) = select_value(privacy, "cbc:ReasonCode")? {
            let mut rationale = json!({"scheme": "eu-non-publication-justification", "id": code});
            if let Some(description) = select_value(privacy, "efbc:ReasonDescription")? {
                rationale["description"] = json!(description);
            }
            entry.insert("rationaleClassifications".into(), json!([rationale]));
        }

        if let Some(text) = select_value(privacy, "efbc:PublicationDate")? {
            match format_date(&text) {
                Some(date) => {
                    entry.insert("availabilityDate".into(), json!(date));
                }
                None => context.warn(format!("invalid date '{text}'")),
            }
        }

        Ok(Some(Value::Object(entry)))
    }
}

impl FieldConverter for WithheldInformation {
    fn id(&self) -> &str {
        "BT-195-FieldsPrivacy"
    }

    fn description(&self) -> &str {
        "Unpublished identifier, reason and availability date"
    }

    fn parse(&self, root: Node<'_, '_>, context: &mut ConvertContext) -> Result<Option<Value>> {
        let mut entries = Vec::new();
        for privacy in select(root, "//efac:FieldsPrivacy")? {
            if let Some(entry) = Self::entry(privacy, context)? {
                entries.push(entry);
            }
        }
        Ok((!entries.is_empty()).then(|| json!({"withheldInformation": entries})))
    }
}
