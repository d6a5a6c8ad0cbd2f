//! End-to-end integration tests for notice conversion.
//!
//! Converts complete eForms and TED notices from the fixtures directory
//! and checks the resulting OCDS releases.

use std::fs;
use std::path::{Path, PathBuf};

use eforms_ocds::{convert_file, convert_notice, ConverterConfig, NoticeFormat};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Load fixture file content.
fn load_fixture(name: &str) -> String {
    let path = fixture_path(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

/// Convert a fixture with the default configuration.
fn convert(name: &str) -> (Value, eforms_ocds::Conversion) {
    let conversion = convert_notice(&load_fixture(name), &ConverterConfig::default())
        .unwrap_or_else(|e| panic!("Failed to convert {name}: {e}"));
    (conversion.release.clone().into_value(), conversion)
}

/// Find the entry with `id` in the array at `pointer`.
fn by_id<'a>(release: &'a Value, pointer: &str, id: &str) -> &'a Value {
    release
        .pointer(pointer)
        .and_then(Value::as_array)
        .and_then(|items| items.iter().find(|item| item["id"] == id))
        .unwrap_or_else(|| panic!("no {pointer} entry with id {id}"))
}

fn has_role(party: &Value, role: &str) -> bool {
    party["roles"]
        .as_array()
        .is_some_and(|roles| roles.iter().any(|r| r == role))
}

#[test]
fn test_contract_notice_header() {
    let (release, conversion) = convert("contract_notice.xml");

    assert_eq!(
        release["ocid"],
        "ocds-id6ixc-1e86a664-ae3c-41eb-8529-0242ac130003"
    );
    assert_eq!(release["id"], "f2d8c5d0-0d3b-4f3e-a1b2-5a3f6e1c9b00");
    assert_eq!(release["date"], "2019-10-24T12:00:00+01:00");
    assert_eq!(release["tag"], json!(["tender"]));
    assert_eq!(release["initiationType"], "tender");
    assert_eq!(release["language"], "en");

    let keys: Vec<&str> = conversion
        .release
        .as_map()
        .keys()
        .take(6)
        .map(String::as_str)
        .collect();
    assert_eq!(
        keys,
        vec!["ocid", "id", "date", "tag", "initiationType", "language"]
    );

    assert_eq!(conversion.metadata.format, NoticeFormat::Eforms);
    assert_eq!(conversion.metadata.subtype.as_deref(), Some("16"));
    assert_eq!(conversion.metadata.version.as_deref(), Some("01"));
    assert!(
        conversion.warnings.is_empty(),
        "unexpected warnings: {:?}",
        conversion.warnings
    );
}

#[test]
fn test_contract_notice_tender() {
    let (release, _) = convert("contract_notice.xml");
    let tender = &release["tender"];

    assert_eq!(tender["title"], "Road maintenance 2020");
    assert_eq!(tender["procurementMethod"], "open");
    assert_eq!(tender["procurementMethodDetails"], "Open procedure");
    assert_eq!(tender["mainProcurementCategory"], "works");
    assert_eq!(tender["value"], json!({"amount": 2500000, "currency": "EUR"}));
    assert_eq!(tender["legalBasis"]["id"], "32014L0024");
    assert_eq!(tender["lots"].as_array().map(Vec::len), Some(2));
}

#[test]
fn test_contract_notice_lots() {
    let (release, _) = convert("contract_notice.xml");

    let north = by_id(&release, "/tender/lots", "LOT-0001");
    assert_eq!(north["title"], "Northern roads");
    assert_eq!(north["value"], json!({"amount": 1500000, "currency": "EUR"}));
    assert_eq!(north["contractPeriod"]["durationInDays"], 360);
    assert_eq!(north["tenderPeriod"]["endDate"], "2019-11-15T18:00:00+01:00");
    assert_eq!(north["submissionTerms"]["languages"], json!(["en", "fr"]));

    let south = by_id(&release, "/tender/lots", "LOT-0002");
    assert_eq!(south["title"], "Southern roads");
    assert_eq!(south["contractPeriod"]["durationInDays"], 730);
}

#[test]
fn test_contract_notice_parties() {
    let (release, _) = convert("contract_notice.xml");

    assert_eq!(release["buyer"], json!({"id": "ORG-0001"}));

    let buyer = by_id(&release, "/parties", "ORG-0001");
    assert_eq!(buyer["name"], "Ministry of Roads");
    assert_eq!(buyer["address"]["country"], "LU");
    assert_eq!(buyer["address"]["locality"], "Luxembourg");
    assert_eq!(buyer["contactPoint"]["email"], "desk@roads.example.lu");
    assert!(has_role(buyer, "buyer"));

    // Referenced from both lots, the role is listed once.
    let review = by_id(&release, "/parties", "ORG-0002");
    assert_eq!(review["name"], "Administrative Court");
    assert_eq!(review["roles"], json!(["reviewBody"]));
}

#[test]
fn test_award_notice_awards() {
    let (release, conversion) = convert("contract_award_notice.xml");

    assert_eq!(release["tag"], json!(["award", "contract"]));
    assert_eq!(conversion.metadata.subtype.as_deref(), Some("29"));

    let awarded = by_id(&release, "/awards", "RES-0001");
    assert_eq!(awarded["status"], "active");
    assert_eq!(awarded["relatedLots"], json!(["LOT-0001"]));
    assert_eq!(awarded["value"], json!({"amount": 1380000, "currency": "EUR"}));
    assert_eq!(awarded["suppliers"], json!([{"id": "ORG-0003"}]));
    assert_eq!(awarded["date"], "2020-01-10T00:00:00+01:00");

    let unsuccessful = by_id(&release, "/awards", "RES-0002");
    assert_eq!(unsuccessful["status"], "unsuccessful");
    assert_eq!(unsuccessful["relatedLots"], json!(["LOT-0002"]));
    assert!(unsuccessful.get("suppliers").is_none());
}

#[test]
fn test_award_notice_contracts_and_bids() {
    let (release, _) = convert("contract_award_notice.xml");

    let contract = by_id(&release, "/contracts", "CON-0001");
    assert_eq!(contract["awardID"], "RES-0001");
    assert_eq!(contract["title"], "Northern roads maintenance");
    assert_eq!(contract["dateSigned"], "2020-01-20T00:00:00+01:00");
    assert_eq!(
        contract["identifiers"],
        json!([{"id": "CRN-2020-001", "scheme": "internal"}])
    );

    let tender = by_id(&release, "/bids/details", "TEN-0001");
    assert_eq!(tender["value"], json!({"amount": 1380000, "currency": "EUR"}));
    assert_eq!(tender["tenderers"], json!([{"id": "ORG-0003"}]));
    assert_eq!(tender["relatedLots"], json!(["LOT-0001"]));

    assert_eq!(
        release["bids"]["statistics"],
        json!([{"id": "1", "measure": "bids", "value": 3, "relatedLot": "LOT-0001"}])
    );

    let supplier = by_id(&release, "/parties", "ORG-0003");
    assert_eq!(supplier["name"], "Acme Roadworks S.A.");
    assert!(has_role(supplier, "supplier"));
}

#[test]
fn test_award_notice_withheld_information() {
    let (release, _) = convert("contract_award_notice.xml");

    let withheld = by_id(&release, "/withheldInformation", "no-awa-rea-RES-0002");
    assert_eq!(withheld["field"], "no-awa-rea");
    assert_eq!(withheld["availabilityDate"], "2020-06-30T00:00:00+01:00");
    assert_eq!(
        withheld["rationaleClassifications"][0]["id"],
        "oth-int"
    );
}

#[test]
fn test_legacy_notice() {
    let (release, conversion) = convert("ted_f03.xml");

    assert_eq!(conversion.metadata.format, NoticeFormat::TedLegacy);
    assert_eq!(conversion.metadata.form_type.as_deref(), Some("F03"));

    assert_eq!(release["ocid"], "ocds-id6ixc-123456-2019");
    assert_eq!(release["id"], "123456-2019");
    assert_eq!(release["date"], "2019-07-01T00:00:00Z");
    assert_eq!(release["language"], "fr");
    assert_eq!(release["tag"], json!(["award", "contract"]));
    assert_eq!(
        release["buyer"],
        json!({"id": "ORG-0001", "name": "Ville de Lyon"})
    );

    let tender = &release["tender"];
    assert_eq!(tender["title"], "Entretien des voiries");
    assert_eq!(tender["procurementMethod"], "open");
    assert_eq!(tender["mainProcurementCategory"], "works");
    assert_eq!(by_id(&release, "/tender/lots", "2")["title"], "Secteur sud");
}

#[test]
fn test_legacy_notice_awards() {
    let (release, _) = convert("ted_f03.xml");

    let first = by_id(&release, "/awards", "1");
    assert_eq!(first["value"], json!({"amount": 500000, "currency": "EUR"}));
    assert_eq!(first["date"], "2019-06-01T00:00:00Z");
    assert_eq!(first["suppliers"], json!([{"id": "ORG-0002"}]));

    let second = by_id(&release, "/awards", "2");
    assert_eq!(second["suppliers"], json!([{"id": "ORG-0003"}]));

    let contractor = by_id(&release, "/parties", "ORG-0002");
    assert_eq!(contractor["name"], "Routes du Rhône SARL");
    assert!(has_role(contractor, "supplier"));
    assert!(has_role(by_id(&release, "/parties", "ORG-0001"), "buyer"));
}

#[test]
fn test_convert_file_matches_convert_notice() {
    let config = ConverterConfig::default();
    let from_file = convert_file(&fixture_path("contract_notice.xml"), &config).unwrap();
    let from_text = convert_notice(&load_fixture("contract_notice.xml"), &config).unwrap();

    assert_eq!(from_file.release, from_text.release);
}

#[test]
fn test_skipped_converter_leaves_field_out() {
    let config = ConverterConfig {
        skip: vec!["BT-21-Lot".to_string()],
        ..ConverterConfig::default()
    };
    let conversion = convert_notice(&load_fixture("contract_notice.xml"), &config).unwrap();
    let release = conversion.release.into_value();

    let lot = by_id(&release, "/tender/lots", "LOT-0001");
    assert!(lot.get("title").is_none());
    assert_eq!(release["tender"]["title"], "Road maintenance 2020");
}
