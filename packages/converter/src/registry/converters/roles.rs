//! Organization roles and buyer classifications.

use roxmltree::Node;
use serde_json::{json, Value};

use super::{accumulate, party_role};
use crate::codes::{lookup, BUYER_LEGAL_TYPES, COFOG_ACTIVITIES, COFOG_LABELS};
use crate::error::Result;
use crate::registry::{ConvertContext, FieldConverter};
use crate::xml::{select, select_value, select_values};

const BUYER_ID: &str = "cac:ContractingParty/cac:Party/cac:PartyIdentification/cbc:ID";

/// Gives the organizations referenced at a path a role.
#[derive(Debug, Clone, Copy)]
pub struct Role {
    id: &'static str,
    description: &'static str,
    path: &'static str,
    role: &'static str,
}

impl Role {
    const fn new(
        id: &'static str,
        description: &'static str,
        path: &'static str,
        role: &'static str,
    ) -> Self {
        Self {
            id,
            description,
            path,
            role,
        }
    }
}

impl FieldConverter for Role {
    fn id(&self) -> &str {
        self.id
    }

    fn description(&self) -> &str {
        self.description
    }

    fn parse(&self, root: Node<'_, '_>, _context: &mut ConvertContext) -> Result<Option<Value>> {
        let mut fragment = None;
        for id in select_values(root, self.path)? {
            accumulate(&mut fragment, party_role(&id, self.role));
        }
        Ok(fragment)
    }
}

/// Roles given by references from the procedure and its lots.
pub const ROLES: &[Role] = &[
    Role::new(
        "OPT-300-Procedure-SProvider",
        "Service provider acting for the buyer",
        "cac:ContractingParty/cac:Party/cac:ServiceProviderParty/cac:Party/cac:PartyIdentification/cbc:ID",
        "procurementAgent",
    ),
    Role::new(
        "OPT-301-Lot-ReviewOrg",
        "Review organization",
        "cac:ProcurementProjectLot/cac:TenderingTerms/cac:AppealTerms/cac:AppealReceiverParty/cac:PartyIdentification/cbc:ID",
        "reviewBody",
    ),
    Role::new(
        "OPT-301-Lot-ReviewInfo",
        "Review information provider",
        "cac:ProcurementProjectLot/cac:TenderingTerms/cac:AppealTerms/cac:AppealInformationParty/cac:PartyIdentification/cbc:ID",
        "reviewContactPoint",
    ),
    Role::new(
        "OPT-301-Lot-Mediator",
        "Mediation organization",
        "cac:ProcurementProjectLot/cac:TenderingTerms/cac:AppealTerms/cac:MediationParty/cac:PartyIdentification/cbc:ID",
        "mediationBody",
    ),
    Role::new(
        "OPT-301-Lot-AddInfo",
        "Additional information provider",
        "cac:ProcurementProjectLot/cac:TenderingTerms/cac:AdditionalInformationParty/cac:PartyIdentification/cbc:ID",
        "processContactPoint",
    ),
    Role::new(
        "OPT-301-Lot-DocProvider",
        "Documents provider",
        "cac:ProcurementProjectLot/cac:TenderingTerms/cac:DocumentProviderParty/cac:PartyIdentification/cbc:ID",
        "processContactPoint",
    ),
    Role::new(
        "OPT-301-Lot-TenderReceipt",
        "Tender recipient",
        "cac:ProcurementProjectLot/cac:TenderingTerms/cac:TenderRecipientParty/cac:PartyIdentification/cbc:ID",
        "submissionReceiptBody",
    ),
    Role::new(
        "OPT-301-Lot-TenderEval",
        "Tender evaluator",
        "cac:ProcurementProjectLot/cac:TenderingTerms/cac:TenderEvaluationParty/cac:PartyIdentification/cbc:ID",
        "evaluationBody",
    ),
    Role::new(
        "OPT-301-Lot-FiscalLegis",
        "Fiscal legislation information provider",
        "cac:ProcurementProjectLot/cac:TenderingTerms/cac:FiscalLegislationDocumentReference/cac:IssuerParty/cac:PartyIdentification/cbc:ID",
        "informationService",
    ),
    Role::new(
        "OPT-301-Lot-EnvironLegis",
        "Environmental legislation information provider",
        "cac:ProcurementProjectLot/cac:TenderingTerms/cac:EnvironmentalLegislationDocumentReference/cac:IssuerParty/cac:PartyIdentification/cbc:ID",
        "informationService",
    ),
    Role::new(
        "OPT-301-Lot-EmployLegis",
        "Employment legislation information provider",
        "cac:ProcurementProjectLot/cac:TenderingTerms/cac:EmploymentLegislationDocumentReference/cac:IssuerParty/cac:PartyIdentification/cbc:ID",
        "informationService",
    ),
];

/// OPT-300: the buyers, with the `buyer` role and as `release.buyer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Buyer;

impl FieldConverter for Buyer {
    fn id(&self) -> &str {
        "OPT-300-Procedure-Buyer"
    }

    fn description(&self) -> &str {
        "Buyer technical identifier reference"
    }

    fn parse(&self, root: Node<'_, '_>, _context: &mut ConvertContext) -> Result<Option<Value>> {
        let buyers = select_values(root, BUYER_ID)?;
        let Some(first) = buyers.first() else {
            return Ok(None);
        };

        // A release has one buyer; further buyers only get the role.
        let mut fragment = Some(json!({"buyer": {"id": first}}));
        for id in &buyers {
            accumulate(&mut fragment, party_role(id, "buyer"));
        }
        Ok(fragment)
    }
}

/// BT-11: buyer legal type, as a party classification.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuyerLegalType;

impl FieldConverter for BuyerLegalType {
    fn id(&self) -> &str {
        "BT-11-Procedure-Buyer"
    }

    fn description(&self) -> &str {
        "Buyer legal type"
    }

    fn parse(&self, root: Node<'_, '_>, context: &mut ConvertContext) -> Result<Option<Value>> {
        let mut fragment = None;

        for party in select(root, "cac:ContractingParty")? {
            let (Some(id), Some(code)) = (
                select_value(party, "cac:Party/cac:PartyIdentification/cbc:ID")?,
                select_value(
                    party,
                    "cac:ContractingPartyType/cbc:PartyTypeCode[@listName='buyer-legal-type']",
                )?,
            ) else {
                continue;
            };
            let Some(description) = lookup(BUYER_LEGAL_TYPES, &code) else {
                context.unknown_code(&code);
                continue;
            };
            accumulate(
                &mut fragment,
                json!({"parties": [{
                    "id": id,
                    "details": {"classifications": [{
                        "scheme": "eu-buyer-legal-type",
                        "id": code,
                        "description": description,
                    }]}
                }]}),
            );
        }

        Ok(fragment)
    }
}

/// BT-10: activity of the authority, as a COFOG party classification.
///
/// Activities without a COFOG division keep their eForms code.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuyerActivity;

impl FieldConverter for BuyerActivity {
    fn id(&self) -> &str {
        "BT-10-Procedure-Buyer"
    }

    fn description(&self) -> &str {
        "Activity of the contracting authority"
    }

    fn parse(&self, root: Node<'_, '_>, _context: &mut ConvertContext) -> Result<Option<Value>> {
        let mut fragment = None;

        for party in select(root, "cac:ContractingParty")? {
            let (Some(id), Some(code)) = (
                select_value(party, "cac:Party/cac:PartyIdentification/cbc:ID")?,
                select_value(
                    party,
                    "cac:ContractingActivity/cbc:ActivityTypeCode[@listName='authority-activity']",
                )?,
            ) else {
                continue;
            };
            let classification = match (lookup(COFOG_ACTIVITIES, &code), lookup(COFOG_LABELS, &code)) {
                (Some(division), Some(label)) => {
                    json!({"scheme": "COFOG", "id": division, "description": label})
                }
                _ => json!({"scheme": "eu-main-activity", "id": code}),
            };
            accumulate(
                &mut fragment,
                json!({"parties": [{"id": id, "details": {"classifications": [classification]}}]}),
            );
        }

        Ok(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::converters::testing::{notice, run};
    use pretty_assertions::assert_eq;

    fn contracting_party(id: &str, extra: &str) -> String {
        format!(
            "<cac:ContractingParty>{extra}<cac:Party><cac:PartyIdentification><cbc:ID>{id}</cbc:ID></cac:PartyIdentification></cac:Party></cac:ContractingParty>"
        )
    }

    #[test]
    fn test_buyer_role_and_release_buyer() {
        let xml = notice(&format!(
            "{}{}",
            contracting_party("ORG-0001", ""),
            contracting_party("ORG-0002", "")
        ));
        let (fragment, _) = run(&Buyer, &xml);
        assert_eq!(
            fragment,
            Some(json!({
                "buyer": {"id": "ORG-0001"},
                "parties": [
                    {"id": "ORG-0001", "roles": ["buyer"]},
                    {"id": "ORG-0002", "roles": ["buyer"]}
                ]
            }))
        );
    }

    #[test]
    fn test_no_buyer() {
        assert_eq!(run(&Buyer, &notice("")).0, None);
    }

    #[test]
    fn test_review_body_referenced_by_two_lots() {
        let lot = |id: &str| {
            format!(
                r#"<cac:ProcurementProjectLot><cbc:ID schemeName="Lot">{id}</cbc:ID><cac:TenderingTerms><cac:AppealTerms>
                    <cac:AppealReceiverParty><cac:PartyIdentification><cbc:ID>ORG-0003</cbc:ID></cac:PartyIdentification></cac:AppealReceiverParty>
                </cac:AppealTerms></cac:TenderingTerms></cac:ProcurementProjectLot>"#
            )
        };
        let xml = notice(&format!("{}{}", lot("LOT-0001"), lot("LOT-0002")));
        let review = ROLES.iter().find(|r| r.id == "OPT-301-Lot-ReviewOrg").unwrap();

        let (fragment, _) = run(review, &xml);
        assert_eq!(
            fragment,
            Some(json!({"parties": [{"id": "ORG-0003", "roles": ["reviewBody"]}]}))
        );
    }

    #[test]
    fn test_buyer_legal_type() {
        let xml = notice(&contracting_party(
            "ORG-0001",
            r#"<cac:ContractingPartyType><cbc:PartyTypeCode listName="buyer-legal-type">body-pl</cbc:PartyTypeCode></cac:ContractingPartyType>"#,
        ));
        let (fragment, _) = run(&BuyerLegalType, &xml);
        assert_eq!(
            fragment,
            Some(json!({"parties": [{
                "id": "ORG-0001",
                "details": {"classifications": [{
                    "scheme": "eu-buyer-legal-type",
                    "id": "body-pl",
                    "description": "Body governed by public law"
                }]}
            }]}))
        );
    }

    #[test]
    fn test_buyer_legal_type_unknown_code() {
        let xml = notice(&contracting_party(
            "ORG-0001",
            r#"<cac:ContractingPartyType><cbc:PartyTypeCode listName="buyer-legal-type">martian</cbc:PartyTypeCode></cac:ContractingPartyType>"#,
        ));
        let (fragment, warnings) = run(&BuyerLegalType, &xml);
        assert_eq!(fragment, None);
        assert_eq!(warnings, vec!["unknown code 'martian'".to_string()]);
    }

    #[test]
    fn test_buyer_activity_cofog_and_fallback() {
        let xml = notice(&format!(
            "{}{}",
            contracting_party(
                "ORG-0001",
                r#"<cac:ContractingActivity><cbc:ActivityTypeCode listName="authority-activity">health</cbc:ActivityTypeCode></cac:ContractingActivity>"#,
            ),
            contracting_party(
                "ORG-0002",
                r#"<cac:ContractingActivity><cbc:ActivityTypeCode listName="authority-activity">gas-oil</cbc:ActivityTypeCode></cac:ContractingActivity>"#,
            ),
        ));
        let (fragment, _) = run(&BuyerActivity, &xml);
        assert_eq!(
            fragment,
            Some(json!({"parties": [
                {"id": "ORG-0001", "details": {"classifications": [{"scheme": "COFOG", "id": "07", "description": "Health"}]}},
                {"id": "ORG-0002", "details": {"classifications": [{"scheme": "eu-main-activity", "id": "gas-oil"}]}}
            ]}))
        );
    }
}
