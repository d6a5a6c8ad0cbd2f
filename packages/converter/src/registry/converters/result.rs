//! Results: awards, tenders, contracts and the organizations behind them.
//!
//! eForms spreads a result over four sibling lists that point at each
//! other by id:
//!
//! ```text
//! LotResult ──► LotTender ──► TenderingParty ──► Tenderer (organization)
//!     │
//!     └──────► SettledContract
//! ```
//!
//! Converters that follow these references index the lists once per
//! notice.

use std::collections::HashMap;

use roxmltree::Node;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use super::{accumulate, party_role};
use crate::codes::{lookup, AWARD_STATUS, NON_AWARD_REASONS, SUBMISSION_MEASURES};
use crate::error::Result;
use crate::format::{decimal_number, format_date, parse_decimal, parse_number};
use crate::registry::mapping::{
    field, FieldMapping, Scope, Transform, LOT_RESULT, LOT_TENDER, SETTLED_CONTRACT, TENDERING_PARTY,
};
use crate::registry::{ConvertContext, FieldConverter};
use crate::xml::{get_text, select, select_value, select_values};

pub const MAPPINGS: &[FieldMapping] = &[
    field(
        "BT-13713-LotResult",
        "Lots the result is about",
        LOT_RESULT,
        "efac:TenderLot/cbc:ID",
        "relatedLots",
        Transform::TextList,
    ),
    field(
        "BT-142-LotResult",
        "Winner chosen",
        LOT_RESULT,
        "cbc:TenderResultCode",
        "status",
        Transform::Code(AWARD_STATUS),
    ),
    field(
        "BT-144-LotResult",
        "Reason the lot was not awarded",
        LOT_RESULT,
        "efac:DecisionReason/efbc:DecisionReasonCode",
        "statusDetails",
        Transform::Code(NON_AWARD_REASONS),
    ),
    field(
        "BT-720-Tender",
        "Tender value",
        LOT_TENDER,
        "cac:LegalMonetaryTotal/cbc:PayableAmount",
        "value",
        Transform::Amount,
    ),
    field(
        "BT-13714-Tender",
        "Lot the tender is for",
        LOT_TENDER,
        "efac:TenderLot/cbc:ID",
        "relatedLots",
        Transform::TextList,
    ),
    field(
        "BT-150-Contract",
        "Contract identifier",
        SETTLED_CONTRACT,
        "efac:ContractReference/cbc:ID",
        "identifiers[]",
        Transform::Identifier("internal"),
    ),
    field(
        "BT-145-Contract",
        "Contract conclusion date",
        SETTLED_CONTRACT,
        "cbc:IssueDate",
        "dateSigned",
        Transform::Date,
    ),
    field(
        "BT-721-Contract",
        "Contract title",
        SETTLED_CONTRACT,
        "cbc:Title",
        "title",
        Transform::Text,
    ),
];

/// Entity nodes of a scope, by id.
fn index<'a, 'input>(scope: &Scope, root: Node<'a, 'input>) -> Result<HashMap<String, Node<'a, 'input>>> {
    Ok(scope
        .entities(root)?
        .into_iter()
        .filter_map(|entity| entity.id.map(|id| (id, entity.node)))
        .collect())
}

/// Organization ids of the tenderers behind a tender.
fn tenderers(tender: Node<'_, '_>, parties: &HashMap<String, Node<'_, '_>>) -> Result<Vec<String>> {
    let Some(party) = select_value(tender, "efac:TenderingParty/cbc:ID")?
        .and_then(|id| parties.get(&id).copied())
    else {
        return Ok(Vec::new());
    };
    select_values(party, "efac:Tenderer/cbc:ID")
}

/// BT-720: award value, the total of the tenders the result refers to.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwardValue;

impl FieldConverter for AwardValue {
    fn id(&self) -> &str {
        "BT-720-LotResult"
    }

    fn description(&self) -> &str {
        "Award value, summed from the winning tenders"
    }

    fn parse(&self, root: Node<'_, '_>, context: &mut ConvertContext) -> Result<Option<Value>> {
        let tenders = index(&LOT_TENDER, root)?;
        let mut fragment = None;

        for result in LOT_RESULT.entities(root)? {
            let mut total = Decimal::ZERO;
            let mut currencies: Vec<String> = Vec::new();
            let mut found = false;

            for tender_id in select_values(result.node, "efac:LotTender/cbc:ID")? {
                let Some(tender) = tenders.get(&tender_id) else {
                    continue;
                };
                let Some(payable) = select(*tender, "cac:LegalMonetaryTotal/cbc:PayableAmount")?
                    .into_iter()
                    .next()
                else {
                    continue;
                };
                let Some(text) = get_text(payable) else {
                    continue;
                };
                let Some(value) = parse_decimal(&text) else {
                    context.warn(format!("invalid amount '{text}'"));
                    continue;
                };
                total += value;
                found = true;
                if let Some(currency) = payable.attribute("currencyID") {
                    if !currencies.iter().any(|c| c == currency) {
                        currencies.push(currency.to_string());
                    }
                }
            }

            if !found {
                continue;
            }
            if currencies.len() > 1 {
                context.warn(format!(
                    "tenders of result '{}' use several currencies",
                    result.id.as_deref().unwrap_or_default()
                ));
                continue;
            }
            let Some(amount) = decimal_number(total) else {
                continue;
            };
            let value = match currencies.first() {
                Some(currency) => json!({"amount": amount, "currency": currency}),
                None => json!({"amount": amount}),
            };
            accumulate(
                &mut fragment,
                LOT_RESULT.fragment(result.id.as_deref(), json!({"value": value})),
            );
        }

        Ok(fragment)
    }
}

/// OPT-300: winners of each result, as award suppliers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Suppliers;

impl FieldConverter for Suppliers {
    fn id(&self) -> &str {
        "OPT-300-Tenderer"
    }

    fn description(&self) -> &str {
        "Winning tenderers, as award suppliers"
    }

    fn parse(&self, root: Node<'_, '_>, _context: &mut ConvertContext) -> Result<Option<Value>> {
        let tenders = index(&LOT_TENDER, root)?;
        let parties = index(&TENDERING_PARTY, root)?;
        let mut fragment = None;

        for result in LOT_RESULT.entities(root)? {
            for tender_id in select_values(result.node, "efac:LotTender/cbc:ID")? {
                let Some(tender) = tenders.get(&tender_id) else {
                    continue;
                };
                for supplier in tenderers(*tender, &parties)? {
                    accumulate(
                        &mut fragment,
                        LOT_RESULT.fragment(
                            result.id.as_deref(),
                            json!({"suppliers": [{"id": supplier}]}),
                        ),
                    );
                    accumulate(&mut fragment, party_role(&supplier, "supplier"));
                }
            }
        }

        Ok(fragment)
    }
}

/// OPT-310: the tenderers behind each tender.
#[derive(Debug, Clone, Copy, Default)]
pub struct BidTenderers;

impl FieldConverter for BidTenderers {
    fn id(&self) -> &str {
        "OPT-310-Tender"
    }

    fn description(&self) -> &str {
        "Tendering party of the tender"
    }

    fn parse(&self, root: Node<'_, '_>, _context: &mut ConvertContext) -> Result<Option<Value>> {
        let parties = index(&TENDERING_PARTY, root)?;
        let mut fragment = None;

        for tender in LOT_TENDER.entities(root)? {
            let ids = tenderers(tender.node, &parties)?;
            if ids.is_empty() {
                continue;
            }
            let tenderers: Vec<Value> = ids.iter().map(|id| json!({"id": id})).collect();
            accumulate(
                &mut fragment,
                LOT_TENDER.fragment(tender.id.as_deref(), json!({"tenderers": tenderers})),
            );
        }

        Ok(fragment)
    }
}

/// BT-1451: award date, the earliest award date of the result's contracts.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwardDate;

impl FieldConverter for AwardDate {
    fn id(&self) -> &str {
        "BT-1451-Contract"
    }

    fn description(&self) -> &str {
        "Winner decision date"
    }

    fn parse(&self, root: Node<'_, '_>, context: &mut ConvertContext) -> Result<Option<Value>> {
        let contracts = index(&SETTLED_CONTRACT, root)?;
        let mut fragment = None;

        for result in LOT_RESULT.entities(root)? {
            let mut dates = Vec::new();
            for contract_id in select_values(result.node, "efac:SettledContract/cbc:ID")? {
                let Some(contract) = contracts.get(&contract_id) else {
                    continue;
                };
                let Some(text) = select_value(*contract, "cbc:AwardDate")? else {
                    continue;
                };
                match format_date(&text) {
                    Some(date) => dates.push(date),
                    None => context.warn(format!("invalid date '{text}'")),
                }
            }
            // RFC 3339 strings with the same offset sort chronologically.
            dates.sort();
            if let Some(date) = dates.first() {
                accumulate(
                    &mut fragment,
                    LOT_RESULT.fragment(result.id.as_deref(), json!({"date": date})),
                );
            }
        }

        Ok(fragment)
    }
}

/// OPT-316: links each contract to the award that refers to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContractAward;

impl FieldConverter for ContractAward {
    fn id(&self) -> &str {
        "OPT-316-Contract"
    }

    fn description(&self) -> &str {
        "Contract technical identifier, linked to its award"
    }

    fn parse(&self, root: Node<'_, '_>, context: &mut ConvertContext) -> Result<Option<Value>> {
        let mut award_of: HashMap<String, String> = HashMap::new();
        for result in LOT_RESULT.entities(root)? {
            let Some(award_id) = result.id else {
                continue;
            };
            for contract_id in select_values(result.node, "efac:SettledContract/cbc:ID")? {
                if let Some(first) = award_of.get(&contract_id) {
                    if *first != award_id {
                        context.warn(format!(
                            "contract '{contract_id}' is referenced by results '{first}' and '{award_id}'"
                        ));
                    }
                    continue;
                }
                award_of.insert(contract_id, award_id.clone());
            }
        }

        let mut fragment = None;
        for contract in SETTLED_CONTRACT.entities(root)? {
            let Some(id) = contract.id else {
                continue;
            };
            let body = match award_of.get(&id) {
                Some(award_id) => json!({"awardID": award_id}),
                None => json!({}),
            };
            accumulate(&mut fragment, SETTLED_CONTRACT.fragment(Some(&id), body));
        }

        Ok(fragment)
    }
}

/// BT-151: contract URL, as a signed contract document.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContractDocument;

impl FieldConverter for ContractDocument {
    fn id(&self) -> &str {
        "BT-151-Contract"
    }

    fn description(&self) -> &str {
        "Contract URL"
    }

    fn parse(&self, root: Node<'_, '_>, _context: &mut ConvertContext) -> Result<Option<Value>> {
        let mut fragment = None;

        for contract in SETTLED_CONTRACT.entities(root)? {
            let (Some(id), Some(url)) = (contract.id, select_value(contract.node, "cbc:URI")?) else {
                continue;
            };
            accumulate(
                &mut fragment,
                SETTLED_CONTRACT.fragment(
                    Some(&id),
                    json!({"documents": [{
                        "id": id,
                        "documentType": "contractSigned",
                        "url": url,
                    }]}),
                ),
            );
        }

        Ok(fragment)
    }
}

/// BT-759 and BT-760: received submissions, as bid statistics.
///
/// Statistics get sequential ids in document order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReceivedSubmissions;

impl FieldConverter for ReceivedSubmissions {
    fn id(&self) -> &str {
        "BT-759-LotResult"
    }

    fn description(&self) -> &str {
        "Received submissions count and type"
    }

    fn parse(&self, root: Node<'_, '_>, context: &mut ConvertContext) -> Result<Option<Value>> {
        let mut statistics = Vec::new();

        for result in LOT_RESULT.entities(root)? {
            let lot = select_value(result.node, "efac:TenderLot/cbc:ID")?;
            for statistic in select(result.node, "efac:ReceivedSubmissionsStatistics")? {
                let (Some(code), Some(count)) = (
                    select_value(statistic, "efbc:StatisticsCode")?,
                    select_value(statistic, "efbc:StatisticsNumeric")?,
                ) else {
                    continue;
                };
                let Some(measure) = lookup(SUBMISSION_MEASURES, &code) else {
                    context.unknown_code(&code);
                    continue;
                };
                let Some(value) = parse_number(&count) else {
                    context.warn(format!("invalid number '{count}'"));
                    continue;
                };

                let mut entry = json!({
                    "id": (statistics.len() + 1).to_string(),
                    "measure": measure,
                    "value": value,
                });
                if let Some(lot) = &lot {
                    entry["relatedLot"] = json!(lot);
                }
                statistics.push(entry);
            }
        }

        Ok((!statistics.is_empty()).then(|| json!({"bids": {"statistics": statistics}})))
    }
}

/// OPT-210: every organization behind a tendering party is a tenderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tenderers;

impl FieldConverter for Tenderers {
    fn id(&self) -> &str {
        "OPT-210-Tenderer"
    }

    fn description(&self) -> &str {
        "Tenderer technical identifier reference"
    }

    fn parse(&self, root: Node<'_, '_>, _context: &mut ConvertContext) -> Result<Option<Value>> {
        let mut fragment = None;
        for party in TENDERING_PARTY.entities(root)? {
            for id in select_values(party.node, "efac:Tenderer/cbc:ID")? {
                accumulate(&mut fragment, party_role(&id, "tenderer"));
            }
        }
        Ok(fragment)
    }
}
