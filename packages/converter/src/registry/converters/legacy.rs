//! Legacy TED (R2.0.9) forms.
//!
//! Notices published before eForms use one `F01_2014`..`F25_2014` form per
//! language under `FORM_SECTION`; only the first (original language) form
//! is read. Legacy forms have no organization ids, so the contracting body
//! is `ORG-0001` and contractors are numbered after it.

use std::collections::HashMap;

use roxmltree::Node;
use serde_json::{json, Map, Value};

use super::{accumulate, party_role};
use crate::codes::{LEGACY_CONTRACT_TYPES, LEGACY_PROCEDURES};
use crate::error::Result;
use crate::registry::mapping::{
    country, field, FieldMapping, Transform, LEGACY_AWARD, LEGACY_BUYER, LEGACY_LOT, LEGACY_NOTICE,
    LEGACY_PROCEDURE,
};
use crate::registry::{ConvertContext, FieldConverter};
use crate::xml::{element_children, get_tag_name, select, select_value};

const FORM: &str = "FORM_SECTION/*[1]";
const BUYER_ID: &str = "ORG-0001";

pub const MAPPINGS: &[FieldMapping] = &[
    field(
        "TED-DOC-ID",
        "TED document number, used as the release id",
        LEGACY_NOTICE,
        "@DOC_ID",
        "id",
        Transform::Text,
    ),
    field(
        "TED-DATE-PUB",
        "Publication date, used as the release date",
        LEGACY_NOTICE,
        "CODED_DATA_SECTION/REF_OJS/DATE_PUB",
        "date",
        Transform::Date,
    ),
    field(
        "TED-LG-ORIG",
        "Original language",
        LEGACY_NOTICE,
        "CODED_DATA_SECTION/NOTICE_DATA/LG_ORIG",
        "language",
        Transform::Language,
    ),
    field(
        "TED-LEGAL-BASIS",
        "Legal basis",
        LEGACY_PROCEDURE,
        "LEGAL_BASIS/@VALUE",
        "legalBasis",
        Transform::Identifier("CELEX"),
    ),
    field(
        "TED-TITLE",
        "Title of the contract",
        LEGACY_PROCEDURE,
        "OBJECT_CONTRACT/TITLE",
        "title",
        Transform::Text,
    ),
    field(
        "TED-SHORT-DESCR",
        "Short description of the contract",
        LEGACY_PROCEDURE,
        "OBJECT_CONTRACT/SHORT_DESCR",
        "description",
        Transform::Text,
    ),
    field(
        "TED-REFERENCE-NUMBER",
        "Reference number given by the contracting body",
        LEGACY_PROCEDURE,
        "OBJECT_CONTRACT/REFERENCE_NUMBER",
        "identifiers[]",
        Transform::Identifier("internal"),
    ),
    field(
        "TED-CPV-MAIN",
        "Main CPV code",
        LEGACY_PROCEDURE,
        "OBJECT_CONTRACT/CPV_MAIN/CPV_CODE/@CODE",
        "classification",
        Transform::Identifier("CPV"),
    ),
    field(
        "TED-TYPE-CONTRACT",
        "Type of contract",
        LEGACY_PROCEDURE,
        "OBJECT_CONTRACT/TYPE_CONTRACT/@CTYPE",
        "mainProcurementCategory",
        Transform::Code(LEGACY_CONTRACT_TYPES),
    ),
    field(
        "TED-VAL-ESTIMATED-TOTAL",
        "Estimated total value",
        LEGACY_PROCEDURE,
        "OBJECT_CONTRACT/VAL_ESTIMATED_TOTAL",
        "value",
        Transform::Amount,
    ),
    field(
        "TED-DATE-RECEIPT-TENDERS",
        "Time limit for receipt of tenders",
        LEGACY_PROCEDURE,
        "PROCEDURE/DATE_RECEIPT_TENDERS",
        "tenderPeriod.endDate",
        Transform::DateTime("TIME_RECEIPT_TENDERS"),
    ),
    field(
        "TED-OFFICIALNAME-Buyer",
        "Official name of the contracting body",
        LEGACY_BUYER,
        "OFFICIALNAME",
        "name",
        Transform::Text,
    ),
    field(
        "TED-NATIONALID-Buyer",
        "National registration number of the contracting body",
        LEGACY_BUYER,
        "NATIONALID",
        "identifier.id",
        Transform::Text,
    ),
    field(
        "TED-ADDRESS-Buyer",
        "Postal address of the contracting body",
        LEGACY_BUYER,
        "ADDRESS",
        "address.streetAddress",
        Transform::Text,
    ),
    field(
        "TED-TOWN-Buyer",
        "Town of the contracting body",
        LEGACY_BUYER,
        "TOWN",
        "address.locality",
        Transform::Text,
    ),
    field(
        "TED-POSTAL-CODE-Buyer",
        "Postal code of the contracting body",
        LEGACY_BUYER,
        "POSTAL_CODE",
        "address.postalCode",
        Transform::Text,
    ),
    field(
        "TED-COUNTRY-Buyer",
        "Country of the contracting body",
        LEGACY_BUYER,
        "COUNTRY/@VALUE",
        "address.country",
        Transform::Country,
    ),
    field(
        "TED-E-MAIL-Buyer",
        "Email of the contracting body",
        LEGACY_BUYER,
        "E_MAIL",
        "contactPoint.email",
        Transform::Text,
    ),
    field(
        "TED-PHONE-Buyer",
        "Telephone of the contracting body",
        LEGACY_BUYER,
        "PHONE",
        "contactPoint.telephone",
        Transform::Text,
    ),
    field(
        "TED-URL-GENERAL-Buyer",
        "Main address of the contracting body",
        LEGACY_BUYER,
        "URL_GENERAL",
        "details.url",
        Transform::Text,
    ),
    field(
        "TED-TITLE-Lot",
        "Lot title",
        LEGACY_LOT,
        "TITLE",
        "title",
        Transform::Text,
    ),
    field(
        "TED-SHORT-DESCR-Lot",
        "Lot description",
        LEGACY_LOT,
        "SHORT_DESCR",
        "description",
        Transform::Text,
    ),
    field(
        "TED-VAL-OBJECT-Lot",
        "Estimated lot value",
        LEGACY_LOT,
        "VAL_OBJECT",
        "value",
        Transform::Amount,
    ),
    field(
        "TED-TITLE-Award",
        "Award title",
        LEGACY_AWARD,
        "TITLE",
        "title",
        Transform::Text,
    ),
    field(
        "TED-LOT-NO-Award",
        "Lot the award is for",
        LEGACY_AWARD,
        "LOT_NO",
        "relatedLots",
        Transform::TextList,
    ),
    field(
        "TED-DATE-CONCLUSION-Award",
        "Date of conclusion of the contract",
        LEGACY_AWARD,
        "AWARDED_CONTRACT/DATE_CONCLUSION_CONTRACT",
        "date",
        Transform::Date,
    ),
    field(
        "TED-VAL-TOTAL-Award",
        "Total value of the contract",
        LEGACY_AWARD,
        "AWARDED_CONTRACT/VALUES/VAL_TOTAL",
        "value",
        Transform::Amount,
    ),
];

/// The notice's document number, prefixed into the release `ocid`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyOcid;

impl FieldConverter for LegacyOcid {
    fn id(&self) -> &str {
        "TED-OCID"
    }

    fn description(&self) -> &str {
        "TED document number, used to build the ocid"
    }

    fn parse(&self, root: Node<'_, '_>, context: &mut ConvertContext) -> Result<Option<Value>> {
        Ok(select_value(root, "@DOC_ID")?
            .map(|id| json!({"ocid": format!("{}-{id}", context.ocid_prefix)})))
    }
}

/// The form number decides the release tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyTag;

impl LegacyTag {
    fn from_form(form: &str) -> Option<&'static str> {
        match form {
            "F01" | "F04" | "F16" => Some("planning"),
            "F02" | "F05" | "F07" | "F12" | "F17" | "F24" => Some("tender"),
            "F03" | "F06" | "F13" | "F15" | "F18" | "F25" => Some("award"),
            "F14" => Some("tenderUpdate"),
            "F20" => Some("contractAmendment"),
            _ => None,
        }
    }
}

impl FieldConverter for LegacyTag {
    fn id(&self) -> &str {
        "TED-FORM"
    }

    fn description(&self) -> &str {
        "Form number, used as the release tag"
    }

    fn parse(&self, root: Node<'_, '_>, context: &mut ConvertContext) -> Result<Option<Value>> {
        let Some(form_node) = select(root, FORM)?.into_iter().next() else {
            return Ok(None);
        };
        // `F03_2014` carries FORM="F03"; older exports only have the name.
        let form = form_node.attribute("FORM").map_or_else(
            || get_tag_name(form_node).split('_').next().unwrap_or_default().to_string(),
            str::to_string,
        );

        let Some(tag) = Self::from_form(&form) else {
            context.unknown_code(&form);
            return Ok(None);
        };
        let mut tags = vec![tag];
        if tag == "award" && !select(form_node, "AWARD_CONTRACT/AWARDED_CONTRACT")?.is_empty() {
            tags.push("contract");
        }
        Ok(Some(json!({"tag": tags})))
    }
}

/// The procedure type is given by which `PT_*` element is present.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyProcedureType;

impl FieldConverter for LegacyProcedureType {
    fn id(&self) -> &str {
        "TED-PROCEDURE"
    }

    fn description(&self) -> &str {
        "Type of procedure"
    }

    fn parse(&self, root: Node<'_, '_>, _context: &mut ConvertContext) -> Result<Option<Value>> {
        let Some(procedure) = select(root, "FORM_SECTION/*[1]/PROCEDURE")?.into_iter().next() else {
            return Ok(None);
        };
        Ok(element_children(procedure).find_map(|child| {
            LEGACY_PROCEDURES
                .iter()
                .find(|(element, _, _)| *element == get_tag_name(child))
                .map(|(_, method, details)| {
                    json!({"tender": {"procurementMethod": method, "procurementMethodDetails": details}})
                })
        }))
    }
}

/// The contracting body, with the `buyer` role and as `release.buyer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyBuyer;

impl FieldConverter for LegacyBuyer {
    fn id(&self) -> &str {
        "TED-BUYER"
    }

    fn description(&self) -> &str {
        "Contracting body, as the buyer"
    }

    fn parse(&self, root: Node<'_, '_>, _context: &mut ConvertContext) -> Result<Option<Value>> {
        let Some(buyer) = LEGACY_BUYER.entities(root)?.into_iter().next() else {
            return Ok(None);
        };
        let mut fragment = json!({"buyer": {"id": BUYER_ID}});
        if let Some(name) = select_value(buyer.node, "OFFICIALNAME")? {
            fragment["buyer"]["name"] = json!(name);
        }
        let mut fragment = Some(fragment);
        accumulate(&mut fragment, party_role(BUYER_ID, "buyer"));
        Ok(fragment)
    }
}

/// Contractors of each award, as parties and award suppliers.
///
/// Contractors are numbered `ORG-0002`, `ORG-0003`, ... in order of first
/// appearance; a contractor named in several awards keeps one id.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyContractors;

impl LegacyContractors {
    fn party(contractor: Node<'_, '_>, id: &str) -> Result<Value> {
        let mut party = Map::new();
        party.insert("id".into(), json!(id));
        if let Some(name) = select_value(contractor, "OFFICIALNAME")? {
            party.insert("name".into(), json!(name));
        }
        if let Some(national_id) = select_value(contractor, "NATIONALID")? {
            party.insert("identifier".into(), json!({"id": national_id}));
        }

        let mut address = Map::new();
        for (element, key) in [
            ("ADDRESS", "streetAddress"),
            ("TOWN", "locality"),
            ("POSTAL_CODE", "postalCode"),
        ] {
            if let Some(value) = select_value(contractor, element)? {
                address.insert(key.into(), json!(value));
            }
        }
        if let Some(code) = select_value(contractor, "COUNTRY/@VALUE")? {
            if let Some(alpha2) = country(&code) {
                address.insert("country".into(), json!(alpha2));
            }
        }
        if !address.is_empty() {
            party.insert("address".into(), Value::Object(address));
        }

        party.insert("roles".into(), json!(["supplier"]));
        Ok(Value::Object(party))
    }
}

impl FieldConverter for LegacyContractors {
    fn id(&self) -> &str {
        "TED-CONTRACTOR"
    }

    fn description(&self) -> &str {
        "Contractors of the awarded contracts"
    }

    fn parse(&self, root: Node<'_, '_>, _context: &mut ConvertContext) -> Result<Option<Value>> {
        let mut ids: HashMap<String, String> = HashMap::new();
        let mut fragment = None;

        for award in LEGACY_AWARD.entities(root)? {
            let contractors = select(
                award.node,
                "AWARDED_CONTRACT/CONTRACTORS/CONTRACTOR/ADDRESS_CONTRACTOR",
            )?;
            for contractor in contractors {
                let key = select_value(contractor, "OFFICIALNAME")?
                    .unwrap_or_else(|| format!("#{}", ids.len()));
                let next = format!("ORG-{:04}", ids.len() + 2);
                let id = ids.entry(key).or_insert(next).clone();

                accumulate(
                    &mut fragment,
                    json!({"parties": [Self::party(contractor, &id)?]}),
                );
                accumulate(
                    &mut fragment,
                    LEGACY_AWARD.fragment(award.id.as_deref(), json!({"suppliers": [{"id": id}]})),
                );
            }
        }

        Ok(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::converters::testing::{run, run_mapping};
    use pretty_assertions::assert_eq;

    fn ted(form: &str) -> String {
        format!(
            r#"<TED_EXPORT xmlns="http://publications.europa.eu/resource/schema/ted/R2.0.9/publication" DOC_ID="123456-2019">
                <CODED_DATA_SECTION>
                    <REF_OJS><DATE_PUB>20190701</DATE_PUB></REF_OJS>
                    <NOTICE_DATA><LG_ORIG>EN</LG_ORIG></NOTICE_DATA>
                </CODED_DATA_SECTION>
                <FORM_SECTION>{form}<F03_2014 LG="FR" FORM="F03"><OBJECT_CONTRACT><TITLE><P>Travaux</P></TITLE></OBJECT_CONTRACT></F03_2014></FORM_SECTION>
            </TED_EXPORT>"#
        )
    }

    const F03: &str = r#"<F03_2014 LG="EN" CATEGORY="ORIGINAL" FORM="F03">
        <CONTRACTING_BODY><ADDRESS_CONTRACTING_BODY>
            <OFFICIALNAME>City of Springfield</OFFICIALNAME>
            <TOWN>Springfield</TOWN>
            <COUNTRY VALUE="FR"/>
        </ADDRESS_CONTRACTING_BODY></CONTRACTING_BODY>
        <OBJECT_CONTRACT>
            <TITLE><P>Road works</P></TITLE>
            <CPV_MAIN><CPV_CODE CODE="45233140"/></CPV_MAIN>
            <TYPE_CONTRACT CTYPE="WORKS"/>
            <OBJECT_DESCR ITEM="1"><LOT_NO>1</LOT_NO><TITLE><P>North</P></TITLE></OBJECT_DESCR>
            <OBJECT_DESCR ITEM="2"><LOT_NO>2</LOT_NO><TITLE><P>South</P></TITLE></OBJECT_DESCR>
        </OBJECT_CONTRACT>
        <PROCEDURE><PT_OPEN/></PROCEDURE>
        <AWARD_CONTRACT ITEM="1">
            <LOT_NO>1</LOT_NO>
            <AWARDED_CONTRACT>
                <DATE_CONCLUSION_CONTRACT>2019-06-01</DATE_CONCLUSION_CONTRACT>
                <CONTRACTORS><CONTRACTOR><ADDRESS_CONTRACTOR>
                    <OFFICIALNAME>Acme Roads</OFFICIALNAME><TOWN>Lyon</TOWN><COUNTRY VALUE="FR"/>
                </ADDRESS_CONTRACTOR></CONTRACTOR></CONTRACTORS>
                <VALUES><VAL_TOTAL CURRENCY="EUR">120000</VAL_TOTAL></VALUES>
            </AWARDED_CONTRACT>
        </AWARD_CONTRACT>
        <AWARD_CONTRACT ITEM="2">
            <LOT_NO>2</LOT_NO>
            <AWARDED_CONTRACT>
                <CONTRACTORS><CONTRACTOR><ADDRESS_CONTRACTOR>
                    <OFFICIALNAME>Acme Roads</OFFICIALNAME>
                </ADDRESS_CONTRACTOR></CONTRACTOR></CONTRACTORS>
            </AWARDED_CONTRACT>
        </AWARD_CONTRACT>
    </F03_2014>"#;

    #[test]
    fn test_notice_fields() {
        let xml = ted(F03);
        assert_eq!(run_mapping(MAPPINGS, "TED-DOC-ID", &xml).0, Some(json!({"id": "123456-2019"})));
        assert_eq!(
            run_mapping(MAPPINGS, "TED-DATE-PUB", &xml).0,
            Some(json!({"date": "2019-07-01T00:00:00Z"}))
        );
        assert_eq!(run_mapping(MAPPINGS, "TED-LG-ORIG", &xml).0, Some(json!({"language": "en"})));
        assert_eq!(
            run(&LegacyOcid, &xml).0,
            Some(json!({"ocid": "ocds-id6ixc-123456-2019"}))
        );
    }

    #[test]
    fn test_only_the_original_form_is_read() {
        let (fragment, _) = run_mapping(MAPPINGS, "TED-TITLE", &ted(F03));
        assert_eq!(fragment, Some(json!({"tender": {"title": "Road works"}})));
    }

    #[test]
    fn test_tag_award_with_contract() {
        assert_eq!(run(&LegacyTag, &ted(F03)).0, Some(json!({"tag": ["award", "contract"]})));
    }

    #[test]
    fn test_tag_from_element_name() {
        let xml = ted("<F02_2014><OBJECT_CONTRACT/></F02_2014>");
        assert_eq!(run(&LegacyTag, &xml).0, Some(json!({"tag": ["tender"]})));
    }

    #[test]
    fn test_procedure_type_by_element() {
        assert_eq!(
            run(&LegacyProcedureType, &ted(F03)).0,
            Some(json!({"tender": {"procurementMethod": "open", "procurementMethodDetails": "Open procedure"}}))
        );
    }

    #[test]
    fn test_contract_type() {
        assert_eq!(
            run_mapping(MAPPINGS, "TED-TYPE-CONTRACT", &ted(F03)).0,
            Some(json!({"tender": {"mainProcurementCategory": "works"}}))
        );
    }

    #[test]
    fn test_lots_by_number() {
        assert_eq!(
            run_mapping(MAPPINGS, "TED-TITLE-Lot", &ted(F03)).0,
            Some(json!({"tender": {"lots": [
                {"id": "1", "title": "North"},
                {"id": "2", "title": "South"}
            ]}}))
        );
    }

    #[test]
    fn test_buyer() {
        let xml = ted(F03);
        assert_eq!(
            run(&LegacyBuyer, &xml).0,
            Some(json!({
                "buyer": {"id": "ORG-0001", "name": "City of Springfield"},
                "parties": [{"id": "ORG-0001", "roles": ["buyer"]}]
            }))
        );
        assert_eq!(
            run_mapping(MAPPINGS, "TED-COUNTRY-Buyer", &xml).0,
            Some(json!({"parties": [{"id": "ORG-0001", "address": {"country": "FR"}}]}))
        );
    }

    #[test]
    fn test_contractors_keep_one_id() {
        let (fragment, _) = run(&LegacyContractors, &ted(F03));
        assert_eq!(
            fragment,
            Some(json!({
                "parties": [{
                    "id": "ORG-0002",
                    "name": "Acme Roads",
                    "address": {"locality": "Lyon", "country": "FR"},
                    "roles": ["supplier"]
                }],
                "awards": [
                    {"id": "1", "suppliers": [{"id": "ORG-0002"}]},
                    {"id": "2", "suppliers": [{"id": "ORG-0002"}]}
                ]
            }))
        );
    }

    #[test]
    fn test_award_value_and_date() {
        let xml = ted(F03);
        assert_eq!(
            run_mapping(MAPPINGS, "TED-VAL-TOTAL-Award", &xml).0,
            Some(json!({"awards": [{"id": "1", "value": {"amount": 120000, "currency": "EUR"}}]}))
        );
        assert_eq!(
            run_mapping(MAPPINGS, "TED-DATE-CONCLUSION-Award", &xml).0,
            Some(json!({"awards": [{"id": "1", "date": "2019-06-01T00:00:00Z"}]}))
        );
    }
}
