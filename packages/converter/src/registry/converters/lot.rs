//! Lot, lots group and part fields.

use roxmltree::Node;
use serde_json::{json, Map, Value};

use super::accumulate;
use crate::codes::{lookup, AWARD_CRITERION_TYPES, VARIANT_POLICIES};
use crate::error::Result;
use crate::format::parse_number;
use crate::registry::mapping::{
    country, extension, field, FieldMapping, Transform, LOT, LOTS_GROUP, PART,
};
use crate::registry::{ConvertContext, FieldConverter};
use crate::release::{entity_fragment, Container};
use crate::xml::{select, select_value, select_values};

/// Lot fields mapped one-to-one.
pub const MAPPINGS: &[FieldMapping] = &[
    field(
        "BT-137-Lot",
        "Purpose lot identifier",
        LOT,
        "cbc:ID",
        "id",
        Transform::Text,
    ),
    field(
        "BT-21-Lot",
        "Lot title",
        LOT,
        "cac:ProcurementProject/cbc:Name",
        "title",
        Transform::Text,
    ),
    field(
        "BT-24-Lot",
        "Lot description",
        LOT,
        "cac:ProcurementProject/cbc:Description",
        "description",
        Transform::Text,
    ),
    field(
        "BT-22-Lot",
        "Lot internal identifier",
        LOT,
        "cac:ProcurementProject/cbc:ID",
        "identifiers[]",
        Transform::Identifier("internal"),
    ),
    field(
        "BT-27-Lot",
        "Lot estimated value",
        LOT,
        "cac:ProcurementProject/cac:RequestedTenderTotal/cbc:EstimatedOverallContractAmount",
        "value",
        Transform::Amount,
    ),
    field(
        "BT-36-Lot",
        "Duration of the contract",
        LOT,
        "cac:ProcurementProject/cac:PlannedPeriod/cbc:DurationMeasure",
        "contractPeriod",
        Transform::Duration,
    ),
    field(
        "BT-536-Lot",
        "Contract start date",
        LOT,
        "cac:ProcurementProject/cac:PlannedPeriod/cbc:StartDate",
        "contractPeriod.startDate",
        Transform::Date,
    ),
    field(
        "BT-537-Lot",
        "Contract end date",
        LOT,
        "cac:ProcurementProject/cac:PlannedPeriod/cbc:EndDate",
        "contractPeriod.endDate",
        Transform::EndDate,
    ),
    field(
        "BT-54-Lot",
        "Options description",
        LOT,
        "cac:ProcurementProject/cac:ContractExtension/cbc:OptionsDescription",
        "options.description",
        Transform::Text,
    ),
    field(
        "BT-57-Lot",
        "Renewal description",
        LOT,
        "cac:ProcurementProject/cac:ContractExtension/cac:Renewal/cac:Period/cbc:Description",
        "renewal.description",
        Transform::Text,
    ),
    field(
        "BT-58-Lot",
        "Maximum number of renewals",
        LOT,
        "cac:ProcurementProject/cac:ContractExtension/cbc:MaximumNumberNumeric",
        "renewal.maximumRenewals",
        Transform::Integer,
    ),
    field(
        "BT-98-Lot",
        "Tender validity deadline",
        LOT,
        "cac:TenderingTerms/cac:TenderValidityPeriod/cbc:DurationMeasure",
        "submissionTerms.bidValidityPeriod",
        Transform::Duration,
    ),
    field(
        "BT-131(d)-Lot",
        "Deadline for receipt of tenders",
        LOT,
        "cac:TenderingProcess/cac:TenderSubmissionDeadlinePeriod/cbc:EndDate",
        "tenderPeriod.endDate",
        Transform::DateTime("cbc:EndTime"),
    ),
    field(
        "BT-13(d)-Lot",
        "Additional information deadline",
        LOT,
        "cac:TenderingProcess/cac:AdditionalInformationRequestPeriod/cbc:EndDate",
        "enquiryPeriod.endDate",
        Transform::DateTime("cbc:EndTime"),
    ),
    field(
        "BT-132(d)-Lot",
        "Public opening date",
        LOT,
        "cac:TenderingProcess/cac:OpenTenderEvent/cbc:OccurrenceDate",
        "bidOpening.date",
        Transform::DateTime("cbc:OccurrenceTime"),
    ),
    field(
        "BT-133-Lot",
        "Public opening place",
        LOT,
        "cac:TenderingProcess/cac:OpenTenderEvent/cac:OccurenceLocation/cbc:Description",
        "bidOpening.location.description",
        Transform::Text,
    ),
    field(
        "BT-97-Lot",
        "Submission languages",
        LOT,
        "cac:TenderingTerms/cac:Language/cbc:ID",
        "submissionTerms.languages",
        Transform::LanguageList,
    ),
    field(
        "BT-63-Lot",
        "Variants",
        LOT,
        "cac:TenderingTerms/cbc:VariantConstraintCode",
        "submissionTerms.variantPolicy",
        Transform::Code(VARIANT_POLICIES),
    ),
    field(
        "BT-765-Lot",
        "Framework agreement",
        LOT,
        "cac:TenderingProcess/cac:ContractingSystem[cbc:ContractingSystemTypeCode/@listName='framework-agreement']/cbc:ContractingSystemTypeCode",
        "techniques.hasFrameworkAgreement",
        Transform::CodeBool(&["none"]),
    ),
    field(
        "BT-766-Lot",
        "Dynamic purchasing system",
        LOT,
        "cac:TenderingProcess/cac:ContractingSystem[cbc:ContractingSystemTypeCode/@listName='dps-usage']/cbc:ContractingSystemTypeCode",
        "techniques.hasDynamicPurchasingSystem",
        Transform::CodeBool(&["none"]),
    ),
    field(
        "BT-271-Lot",
        "Framework maximum value",
        LOT,
        FRAMEWORK_MAXIMUM,
        "techniques.frameworkAgreement.value",
        Transform::Amount,
    ),
    field(
        "BT-726-Lot",
        "Lot suitable for SMEs",
        LOT,
        "cac:ProcurementProject/cbc:SMESuitableIndicator",
        "suitability.sme",
        Transform::Boolean,
    ),
    field(
        "BT-736-Lot",
        "Reserved execution",
        LOT,
        "cac:TenderingTerms/cac:ContractExecutionRequirement[cbc:ExecutionRequirementCode/@listName='reserved-execution']/cbc:ExecutionRequirementCode",
        "contractTerms.reservedExecution",
        Transform::CodeBool(&["no", "none"]),
    ),
    field(
        "BT-71-Lot",
        "Reserved participation",
        LOT,
        "cac:TenderingTerms/cac:TendererQualificationRequest/cac:SpecificTendererRequirement/cbc:TendererRequirementTypeCode[@listName='reserved-procurement'][.!='none']",
        "otherRequirements.reservedParticipation",
        Transform::TextList,
    ),
];

/// Lots group fields mapped one-to-one.
pub const LOTS_GROUP_MAPPINGS: &[FieldMapping] = &[
    field(
        "BT-21-LotsGroup",
        "Lots group title",
        LOTS_GROUP,
        "cac:ProcurementProject/cbc:Name",
        "title",
        Transform::Text,
    ),
    field(
        "BT-24-LotsGroup",
        "Lots group description",
        LOTS_GROUP,
        "cac:ProcurementProject/cbc:Description",
        "description",
        Transform::Text,
    ),
    field(
        "BT-271-LotsGroup",
        "Lots group framework maximum value",
        LOTS_GROUP,
        FRAMEWORK_MAXIMUM,
        "maximumValue",
        Transform::Amount,
    ),
];

/// Part fields, written to the tender.
pub const PART_MAPPINGS: &[FieldMapping] = &[
    field(
        "BT-21-Part",
        "Part title",
        PART,
        "cac:ProcurementProject/cbc:Name",
        "title",
        Transform::Text,
    ),
    field(
        "BT-24-Part",
        "Part description",
        PART,
        "cac:ProcurementProject/cbc:Description",
        "description",
        Transform::Text,
    ),
];

const FRAMEWORK_MAXIMUM: &str = "cac:ProcurementProject/cac:RequestedTenderTotal/ext:UBLExtensions/\
    ext:UBLExtension/ext:ExtensionContent/efext:EformsExtension/efbc:FrameworkMaximumAmount";

/// The lots of a notice, with the id of the item that describes each.
///
/// Items are numbered by lot position, so every converter writing to the
/// same lot's item uses the same item id.
fn lot_items<'a, 'input>(root: Node<'a, 'input>) -> Result<Vec<(String, String, Node<'a, 'input>)>> {
    Ok(LOT
        .entities(root)?
        .into_iter()
        .enumerate()
        .filter_map(|(index, entity)| {
            entity
                .id
                .map(|lot| ((index + 1).to_string(), lot, entity.node))
        })
        .collect())
}

fn item_fragment(item_id: &str, lot_id: &str, fields: Map<String, Value>) -> Value {
    let mut body = Map::new();
    body.insert("relatedLot".to_string(), Value::String(lot_id.to_string()));
    body.extend(fields);
    entity_fragment(Container::List("tender.items"), Some(item_id), Value::Object(body))
}

/// BT-262 and BT-263: lot classifications, written to the lot's item.
#[derive(Debug, Clone, Copy)]
pub struct LotClassification {
    additional: bool,
}

impl LotClassification {
    /// BT-262-Lot, the main classification.
    pub const MAIN: Self = Self { additional: false };
    /// BT-263-Lot, the additional classifications.
    pub const ADDITIONAL: Self = Self { additional: true };
}

impl FieldConverter for LotClassification {
    fn id(&self) -> &str {
        if self.additional {
            "BT-263-Lot"
        } else {
            "BT-262-Lot"
        }
    }

    fn description(&self) -> &str {
        if self.additional {
            "Lot additional classification codes"
        } else {
            "Lot main classification code"
        }
    }

    fn parse(&self, root: Node<'_, '_>, _context: &mut ConvertContext) -> Result<Option<Value>> {
        let mut fragment = None;

        for (item_id, lot_id, lot) in lot_items(root)? {
            let mut fields = Map::new();
            if self.additional {
                let codes = select_values(
                    lot,
                    "cac:ProcurementProject/cac:AdditionalCommodityClassification/cbc:ItemClassificationCode",
                )?;
                if codes.is_empty() {
                    continue;
                }
                let list = codes
                    .into_iter()
                    .map(|code| json!({"id": code, "scheme": "CPV"}))
                    .collect();
                fields.insert("additionalClassifications".to_string(), Value::Array(list));
            } else {
                let Some(code) = select_value(
                    lot,
                    "cac:ProcurementProject/cac:MainCommodityClassification/cbc:ItemClassificationCode",
                )?
                else {
                    continue;
                };
                fields.insert(
                    "classification".to_string(),
                    json!({"id": code, "scheme": "CPV"}),
                );
            }
            accumulate(&mut fragment, item_fragment(&item_id, &lot_id, fields));
        }

        Ok(fragment)
    }
}

/// BT-5071, BT-5101, BT-5121, BT-5131, BT-5141: place of performance,
/// written to the delivery addresses of the lot's item.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceOfPerformance;

impl FieldConverter for PlaceOfPerformance {
    fn id(&self) -> &str {
        "BT-5071-Lot"
    }

    fn description(&self) -> &str {
        "Place of performance (region, street, postcode, town, country)"
    }

    fn parse(&self, root: Node<'_, '_>, context: &mut ConvertContext) -> Result<Option<Value>> {
        let mut fragment = None;

        for (item_id, lot_id, lot) in lot_items(root)? {
            let mut addresses = Vec::new();
            for address in select(lot, "cac:ProcurementProject/cac:RealizedLocation/cac:Address")? {
                let mut entry = Map::new();
                for (key, path) in [
                    ("streetAddress", "cbc:StreetName"),
                    ("locality", "cbc:CityName"),
                    ("postalCode", "cbc:PostalZone"),
                    ("region", "cbc:CountrySubentityCode"),
                ] {
                    if let Some(value) = select_value(address, path)? {
                        entry.insert(key.to_string(), Value::String(value));
                    }
                }
                if let Some(code) = select_value(address, "cac:Country/cbc:IdentificationCode")? {
                    match country(&code) {
                        Some(alpha2) => {
                            entry.insert("country".to_string(), Value::from(alpha2));
                        }
                        None => context.unknown_code(&code),
                    }
                }
                if !entry.is_empty() {
                    addresses.push(Value::Object(entry));
                }
            }
            if addresses.is_empty() {
                continue;
            }

            let mut fields = Map::new();
            fields.insert("deliveryAddresses".to_string(), Value::Array(addresses));
            accumulate(&mut fragment, item_fragment(&item_id, &lot_id, fields));
        }

        Ok(fragment)
    }
}

/// BT-539, BT-540, BT-541, BT-734: award criteria of each lot.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwardCriteria;

impl FieldConverter for AwardCriteria {
    fn id(&self) -> &str {
        "BT-539-Lot"
    }

    fn description(&self) -> &str {
        "Award criteria (type, description, weighting, name)"
    }

    fn parse(&self, root: Node<'_, '_>, context: &mut ConvertContext) -> Result<Option<Value>> {
        let mut fragment = None;

        for lot in LOT.entities(root)? {
            let mut criteria = Vec::new();
            for criterion in select(
                lot.node,
                "cac:TenderingTerms/cac:AwardingTerms/cac:AwardingCriterion/cac:SubordinateAwardingCriterion",
            )? {
                let mut entry = Map::new();
                if let Some(code) = select_value(
                    criterion,
                    "cbc:AwardingCriterionTypeCode[@listName='award-criterion-type']",
                )? {
                    match lookup(AWARD_CRITERION_TYPES, &code) {
                        Some(kind) => {
                            entry.insert("type".to_string(), Value::from(kind));
                        }
                        None => context.unknown_code(&code),
                    }
                }
                if let Some(name) = select_value(criterion, "cbc:Name")? {
                    entry.insert("name".to_string(), Value::String(name));
                }
                if let Some(description) = select_value(criterion, "cbc:Description")? {
                    entry.insert("description".to_string(), Value::String(description));
                }
                let numbers: Vec<Value> = select_values(
                    criterion,
                    extension!("efac:AwardCriterionParameter/efbc:ParameterNumeric"),
                )?
                .iter()
                .filter_map(|n| parse_number(n))
                .map(|number| json!({"number": number}))
                .collect();
                if !numbers.is_empty() {
                    entry.insert("numbers".to_string(), Value::Array(numbers));
                }
                if !entry.is_empty() {
                    criteria.push(Value::Object(entry));
                }
            }
            if criteria.is_empty() {
                continue;
            }

            let body = json!({"awardCriteria": {"criteria": criteria}});
            accumulate(&mut fragment, LOT.fragment(lot.id.as_deref(), body));
        }

        Ok(fragment)
    }
}

/// BT-15: address of the procurement documents, per lot.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcurementDocuments;

impl FieldConverter for ProcurementDocuments {
    fn id(&self) -> &str {
        "BT-15-Lot"
    }

    fn description(&self) -> &str {
        "Documents URL"
    }

    fn parse(&self, root: Node<'_, '_>, _context: &mut ConvertContext) -> Result<Option<Value>> {
        let mut fragment = None;

        for lot in LOT.entities(root)? {
            let Some(lot_id) = lot.id else { continue };
            for reference in select(lot.node, "cac:TenderingTerms/cac:CallForTendersDocumentReference")? {
                let (Some(id), Some(url)) = (
                    select_value(reference, "cbc:ID")?,
                    select_value(reference, "cac:Attachment/cac:ExternalReference/cbc:URI")?,
                ) else {
                    continue;
                };
                accumulate(
                    &mut fragment,
                    json!({"tender": {"documents": [{
                        "id": id,
                        "documentType": "biddingDocuments",
                        "url": url,
                        "relatedLots": [lot_id],
                    }]}}),
                );
            }
        }

        Ok(fragment)
    }
}

/// BT-330 and BT-1375: which lots each group contains.
#[derive(Debug, Clone, Copy, Default)]
pub struct LotsGroupComposition;

impl FieldConverter for LotsGroupComposition {
    fn id(&self) -> &str {
        "BT-1375-Procedure"
    }

    fn description(&self) -> &str {
        "Group identifier and the lots it includes"
    }

    fn parse(&self, root: Node<'_, '_>, _context: &mut ConvertContext) -> Result<Option<Value>> {
        let mut fragment = None;

        for group in select(root, "cac:TenderingTerms/cac:LotDistribution/cac:LotsGroup")? {
            let Some(group_id) = select_value(group, "cbc:LotsGroupID")? else {
                continue;
            };
            let lots = select_values(group, "cac:ProcurementProjectLotReference/cbc:ID")?;
            if lots.is_empty() {
                continue;
            }
            let body = json!({"relatedLots": lots});
            accumulate(
                &mut fragment,
                entity_fragment(LOTS_GROUP.container, Some(&group_id), body),
            );
        }

        Ok(fragment)
    }
}
