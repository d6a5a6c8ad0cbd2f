//! Notice-level fields: release id, ocid, date, tag and language.

use roxmltree::Node;
use serde_json::{json, Value};

use crate::codes::{lookup, FORM_TYPE_TAGS};
use crate::error::Result;
use crate::registry::mapping::{field, FieldMapping, Transform, NOTICE, SETTLED_CONTRACT};
use crate::registry::{ConvertContext, FieldConverter};
use crate::xml::{exists, select_value};

/// Notice fields mapped one-to-one.
pub const MAPPINGS: &[FieldMapping] = &[
    field(
        "BT-701-notice",
        "Notice identifier, used as the release id",
        NOTICE,
        "cbc:ID[@schemeName='notice-id']",
        "id",
        Transform::Text,
    ),
    field(
        "BT-05(a)-notice",
        "Notice dispatch date and time, used as the release date",
        NOTICE,
        "cbc:IssueDate",
        "date",
        Transform::DateTime("cbc:IssueTime"),
    ),
    field(
        "BT-702(a)-notice",
        "Notice official language",
        NOTICE,
        "cbc:NoticeLanguageCode",
        "language",
        Transform::Language,
    ),
];

/// BT-04: the procedure identifier, prefixed into the release `ocid`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ocid;

impl FieldConverter for Ocid {
    fn id(&self) -> &str {
        "BT-04-notice"
    }

    fn description(&self) -> &str {
        "Procedure identifier, used to build the ocid"
    }

    fn parse(&self, root: Node<'_, '_>, context: &mut ConvertContext) -> Result<Option<Value>> {
        Ok(select_value(root, "cbc:ContractFolderID")?
            .map(|id| json!({"ocid": format!("{}-{id}", context.ocid_prefix)})))
    }
}

/// BT-03 and BT-02: the form type (or notice type) decides the release tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReleaseTag;

impl ReleaseTag {
    fn from_notice_type(notice_type: &str) -> Option<&'static str> {
        let notice_type = notice_type.to_ascii_lowercase();
        if notice_type.starts_with("pin-") {
            Some("planning")
        } else if notice_type.starts_with("cn-") || notice_type.starts_with("qu-sy") {
            Some("tender")
        } else if notice_type.starts_with("can-") || notice_type == "veat" {
            Some("award")
        } else if notice_type == "corr" {
            Some("tenderUpdate")
        } else {
            None
        }
    }
}

impl FieldConverter for ReleaseTag {
    fn id(&self) -> &str {
        "BT-03-notice"
    }

    fn description(&self) -> &str {
        "Form type and notice type, used as the release tag"
    }

    fn parse(&self, root: Node<'_, '_>, context: &mut ConvertContext) -> Result<Option<Value>> {
        let form_type = select_value(root, "cbc:NoticeTypeCode/@listName")?;
        let notice_type = select_value(root, "cbc:NoticeTypeCode")?;

        let from_form = form_type.as_deref().and_then(|code| {
            let tag = lookup(FORM_TYPE_TAGS, code);
            if tag.is_none() {
                context.unknown_code(code);
            }
            tag
        });
        let tag = match from_form.or_else(|| notice_type.as_deref().and_then(Self::from_notice_type)) {
            Some(tag) => tag,
            None => {
                if let Some(code) = notice_type.as_deref() {
                    context.unknown_code(code);
                }
                return Ok(None);
            }
        };

        let mut tags = vec![tag];
        if tag == "award" && exists(root, SETTLED_CONTRACT.nodes)? {
            tags.push("contract");
        }
        Ok(Some(json!({"tag": tags})))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::converters::testing::{extension, notice, run, run_mapping};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_notice_identifier() {
        let xml = notice(r#"<cbc:ID schemeName="notice-id">f2d8c5d0-0d3b-4f3e-a1b2-5a3f6e1c9b00</cbc:ID>"#);
        let (fragment, _) = run_mapping(MAPPINGS, "BT-701-notice", &xml);
        assert_eq!(
            fragment,
            Some(json!({"id": "f2d8c5d0-0d3b-4f3e-a1b2-5a3f6e1c9b00"}))
        );
    }

    #[test]
    fn test_dispatch_date() {
        let xml = notice("<cbc:IssueDate>2019-11-26+01:00</cbc:IssueDate><cbc:IssueTime>13:38:54+01:00</cbc:IssueTime>");
        let (fragment, _) = run_mapping(MAPPINGS, "BT-05(a)-notice", &xml);
        assert_eq!(fragment, Some(json!({"date": "2019-11-26T13:38:54+01:00"})));
    }

    #[test]
    fn test_language() {
        let xml = notice("<cbc:NoticeLanguageCode>ENG</cbc:NoticeLanguageCode>");
        let (fragment, _) = run_mapping(MAPPINGS, "BT-702(a)-notice", &xml);
        assert_eq!(fragment, Some(json!({"language": "en"})));
    }

    #[test]
    fn test_ocid() {
        let xml = notice("<cbc:ContractFolderID>1e86a664-ae3c-41eb-8529-0242ac130003</cbc:ContractFolderID>");
        let (fragment, _) = run(&Ocid, &xml);
        assert_eq!(
            fragment,
            Some(json!({"ocid": "ocds-id6ixc-1e86a664-ae3c-41eb-8529-0242ac130003"}))
        );
    }

    #[test]
    fn test_ocid_missing() {
        let (fragment, _) = run(&Ocid, &notice(""));
        assert_eq!(fragment, None);
    }

    #[test]
    fn test_tag_from_form_type() {
        let xml = notice(r#"<cbc:NoticeTypeCode listName="competition">cn-standard</cbc:NoticeTypeCode>"#);
        let (fragment, _) = run(&ReleaseTag, &xml);
        assert_eq!(fragment, Some(json!({"tag": ["tender"]})));
    }

    #[test]
    fn test_tag_result_with_contract() {
        let xml = extension(
            r#"<efac:NoticeResult><efac:SettledContract><cbc:ID schemeName="contract">CON-0001</cbc:ID></efac:SettledContract></efac:NoticeResult>"#,
        )
        .replace(
            "</ContractNotice>",
            r#"<cbc:NoticeTypeCode listName="result">can-standard</cbc:NoticeTypeCode></ContractNotice>"#,
        );
        let (fragment, _) = run(&ReleaseTag, &xml);
        assert_eq!(fragment, Some(json!({"tag": ["award", "contract"]})));
    }

    #[test]
    fn test_tag_falls_back_to_notice_type() {
        let xml = notice("<cbc:NoticeTypeCode>pin-only</cbc:NoticeTypeCode>");
        let (fragment, warnings) = run(&ReleaseTag, &xml);
        assert_eq!(fragment, Some(json!({"tag": ["planning"]})));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_tag_unknown_codes() {
        let xml = notice(r#"<cbc:NoticeTypeCode listName="unknown">zz-1</cbc:NoticeTypeCode>"#);
        let (fragment, warnings) = run(&ReleaseTag, &xml);
        assert_eq!(fragment, None);
        assert_eq!(warnings.len(), 2);
    }
}
