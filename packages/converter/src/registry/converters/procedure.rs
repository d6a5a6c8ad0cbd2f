//! Procedure fields, written to `tender`.

use roxmltree::Node;
use serde_json::{json, Value};

use crate::codes::{lookup, MAIN_NATURE, PROCUREMENT_METHODS, PROCUREMENT_METHOD_DETAILS};
use crate::error::Result;
use crate::registry::mapping::{field, FieldMapping, Transform, PROCEDURE};
use crate::registry::{ConvertContext, FieldConverter};
use crate::xml::select_value;

pub const MAPPINGS: &[FieldMapping] = &[
    field(
        "BT-01-notice",
        "Procedure legal basis",
        PROCEDURE,
        "cbc:RegulatoryDomain",
        "legalBasis",
        Transform::Identifier("CELEX"),
    ),
    field(
        "BT-21-Procedure",
        "Procedure title",
        PROCEDURE,
        "cac:ProcurementProject/cbc:Name",
        "title",
        Transform::Text,
    ),
    field(
        "BT-24-Procedure",
        "Procedure description",
        PROCEDURE,
        "cac:ProcurementProject/cbc:Description",
        "description",
        Transform::Text,
    ),
    field(
        "BT-22-Procedure",
        "Procedure internal identifier",
        PROCEDURE,
        "cac:ProcurementProject/cbc:ID",
        "identifiers[]",
        Transform::Identifier("internal"),
    ),
    field(
        "BT-23-Procedure",
        "Main nature of the procurement",
        PROCEDURE,
        "cac:ProcurementProject/cbc:ProcurementTypeCode",
        "mainProcurementCategory",
        Transform::Code(MAIN_NATURE),
    ),
    field(
        "BT-106-Procedure",
        "Accelerated procedure",
        PROCEDURE,
        "cac:TenderingProcess/cac:ProcessJustification[cbc:ProcessReasonCode/@listName='accelerated-procedure']/cbc:ProcessReasonCode",
        "procedure.isAccelerated",
        Transform::Boolean,
    ),
    field(
        "BT-1351-Procedure",
        "Accelerated procedure justification",
        PROCEDURE,
        "cac:TenderingProcess/cac:ProcessJustification[cbc:ProcessReasonCode/@listName='accelerated-procedure']/cbc:ProcessReason",
        "procedure.acceleratedRationale",
        Transform::Text,
    ),
    field(
        "BT-135-Procedure",
        "Direct award justification",
        PROCEDURE,
        "cac:TenderingProcess/cac:ProcessJustification[cbc:ProcessReasonCode/@listName='direct-award-justification']/cbc:ProcessReason",
        "procurementMethodRationale",
        Transform::Text,
    ),
    field(
        "BT-262-Procedure",
        "Main classification code",
        PROCEDURE,
        "cac:ProcurementProject/cac:MainCommodityClassification/cbc:ItemClassificationCode",
        "classification",
        Transform::Identifier("CPV"),
    ),
    field(
        "BT-263-Procedure",
        "Additional classification codes",
        PROCEDURE,
        "cac:ProcurementProject/cac:AdditionalCommodityClassification/cbc:ItemClassificationCode",
        "additionalClassifications",
        Transform::IdentifierList("CPV"),
    ),
    field(
        "BT-27-Procedure",
        "Estimated value of the procedure",
        PROCEDURE,
        "cac:ProcurementProject/cac:RequestedTenderTotal/cbc:EstimatedOverallContractAmount",
        "value",
        Transform::Amount,
    ),
    field(
        "BT-31-Procedure",
        "Maximum number of lots a tenderer can bid for",
        PROCEDURE,
        "cac:TenderingTerms/cac:LotDistribution/cbc:MaximumLotsSubmittedNumeric",
        "lotDetails.maximumLotsBidPerSupplier",
        Transform::Integer,
    ),
    field(
        "BT-33-Procedure",
        "Maximum number of lots awarded to one tenderer",
        PROCEDURE,
        "cac:TenderingTerms/cac:LotDistribution/cbc:MaximumLotsAwardedNumeric",
        "lotDetails.maximumLotsAwardedPerSupplier",
        Transform::Integer,
    ),
    field(
        "BT-726-Procedure",
        "Suitable for SMEs",
        PROCEDURE,
        "cac:ProcurementProject/cbc:SMESuitableIndicator",
        "suitability.sme",
        Transform::Boolean,
    ),
    field(
        "BT-127-notice",
        "Future notice date",
        PROCEDURE,
        "cbc:PlannedDate",
        "communication.futureNoticeDate",
        Transform::Date,
    ),
];

/// BT-105: the procedure type, mapped to `procurementMethod` and details.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcedureType;

impl FieldConverter for ProcedureType {
    fn id(&self) -> &str {
        "BT-105-Procedure"
    }

    fn description(&self) -> &str {
        "Procedure type"
    }

    fn parse(&self, root: Node<'_, '_>, context: &mut ConvertContext) -> Result<Option<Value>> {
        let Some(code) = select_value(root, "cac:TenderingProcess/cbc:ProcedureCode")? else {
            return Ok(None);
        };

        let (Some(method), Some(details)) = (
            lookup(PROCUREMENT_METHODS, &code),
            lookup(PROCUREMENT_METHOD_DETAILS, &code),
        ) else {
            context.unknown_code(&code);
            return Ok(None);
        };

        Ok(Some(json!({
            "tender": {
                "procurementMethod": method,
                "procurementMethodDetails": details,
            }
        })))
    }
}
