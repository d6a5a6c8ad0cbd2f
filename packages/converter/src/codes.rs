//! Code lists used to translate eForms codes into OCDS values.

/// A code list: eForms code → OCDS value (or label).
pub type CodeTable = &'static [(&'static str, &'static str)];

/// Look up a code, ignoring ASCII case.
///
/// # Examples
/// ```
/// use eforms_ocds::codes::{lookup, MAIN_NATURE};
///
/// assert_eq!(lookup(MAIN_NATURE, "supplies"), Some("goods"));
/// assert_eq!(lookup(MAIN_NATURE, "unknown"), None);
/// ```
#[must_use]
pub fn lookup(table: CodeTable, code: &str) -> Option<&'static str> {
    let code = code.trim();
    table
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(code))
        .map(|(_, value)| *value)
}

/// ISO 3166-1 alpha-3 → alpha-2.
pub const COUNTRIES: CodeTable = &[
    ("ALB", "AL"),
    ("AND", "AD"),
    ("ARE", "AE"),
    ("ARM", "AM"),
    ("AUS", "AU"),
    ("AUT", "AT"),
    ("AZE", "AZ"),
    ("BEL", "BE"),
    ("BGR", "BG"),
    ("BIH", "BA"),
    ("BLR", "BY"),
    ("BRA", "BR"),
    ("CAN", "CA"),
    ("CHE", "CH"),
    ("CHN", "CN"),
    ("CYP", "CY"),
    ("CZE", "CZ"),
    ("DEU", "DE"),
    ("DNK", "DK"),
    ("EGY", "EG"),
    ("ESP", "ES"),
    ("EST", "EE"),
    ("FIN", "FI"),
    ("FRA", "FR"),
    ("GBR", "GB"),
    ("GEO", "GE"),
    ("GRC", "GR"),
    ("HRV", "HR"),
    ("HUN", "HU"),
    ("IND", "IN"),
    ("IRL", "IE"),
    ("ISL", "IS"),
    ("ISR", "IL"),
    ("ITA", "IT"),
    ("JPN", "JP"),
    ("KOR", "KR"),
    ("LIE", "LI"),
    ("LTU", "LT"),
    ("LUX", "LU"),
    ("LVA", "LV"),
    ("MAR", "MA"),
    ("MCO", "MC"),
    ("MDA", "MD"),
    ("MEX", "MX"),
    ("MKD", "MK"),
    ("MLT", "MT"),
    ("MNE", "ME"),
    ("NLD", "NL"),
    ("NOR", "NO"),
    ("NZL", "NZ"),
    ("POL", "PL"),
    ("PRT", "PT"),
    ("ROU", "RO"),
    ("RUS", "RU"),
    ("SAU", "SA"),
    ("SGP", "SG"),
    ("SMR", "SM"),
    ("SRB", "RS"),
    ("SVK", "SK"),
    ("SVN", "SI"),
    ("SWE", "SE"),
    ("TUN", "TN"),
    ("TUR", "TR"),
    ("UKR", "UA"),
    ("USA", "US"),
    ("VAT", "VA"),
    ("XKX", "XK"),
    ("ZAF", "ZA"),
];

/// EU languages, ISO 639 three-letter (eForms) → two-letter (OCDS).
pub const LANGUAGES: CodeTable = &[
    ("BUL", "bg"),
    ("CES", "cs"),
    ("DAN", "da"),
    ("DEU", "de"),
    ("ELL", "el"),
    ("ENG", "en"),
    ("EST", "et"),
    ("FIN", "fi"),
    ("FRA", "fr"),
    ("GLE", "ga"),
    ("HRV", "hr"),
    ("HUN", "hu"),
    ("ISL", "is"),
    ("ITA", "it"),
    ("LAV", "lv"),
    ("LIT", "lt"),
    ("MLT", "mt"),
    ("NLD", "nl"),
    ("NOR", "no"),
    ("POL", "pl"),
    ("POR", "pt"),
    ("RON", "ro"),
    ("SLK", "sk"),
    ("SLV", "sl"),
    ("SPA", "es"),
    ("SWE", "sv"),
];

/// BT-105 procedure type → OCDS `procurementMethod`.
pub const PROCUREMENT_METHODS: CodeTable = &[
    ("open", "open"),
    ("restricted", "selective"),
    ("comp-dial", "selective"),
    ("comp-tend", "selective"),
    ("innovation", "selective"),
    ("neg-w-call", "selective"),
    ("exp-int-rail", "selective"),
    ("neg-wo-call", "limited"),
    ("oth-mult", "selective"),
    ("oth-single", "open"),
];

/// BT-105 procedure type → human-readable details.
pub const PROCUREMENT_METHOD_DETAILS: CodeTable = &[
    ("open", "Open procedure"),
    ("restricted", "Restricted procedure"),
    ("comp-dial", "Competitive dialogue"),
    ("comp-tend", "Competitive tendering (article 5(3) of Regulation 1370/2007)"),
    ("innovation", "Innovation partnership"),
    ("neg-w-call", "Negotiated with prior publication of a call for competition / competitive with negotiation"),
    ("exp-int-rail", "Request for expression of interest – only for rail (article 5(3b) of Regulation 1370/2007)"),
    ("neg-wo-call", "Negotiated without prior call for competition"),
    ("oth-mult", "Other multiple stage procedure"),
    ("oth-single", "Other single stage procedure"),
];

/// BT-23 main nature → OCDS `mainProcurementCategory`.
pub const MAIN_NATURE: CodeTable = &[
    ("works", "works"),
    ("services", "services"),
    ("supplies", "goods"),
];

/// BT-142 winner chosen → award `status`.
pub const AWARD_STATUS: CodeTable = &[
    ("selec-w", "active"),
    ("clos-nw", "unsuccessful"),
    ("open-nw", "pending"),
];

/// BT-144 reason for not awarding → description.
pub const NON_AWARD_REASONS: CodeTable = &[
    ("all-rej", "Tenders or requests to participate were received, but all were rejected"),
    ("chan-need", "Decision of the buyer, because of a change in needs"),
    ("ins-funds", "Decision of the buyer, because of insufficient funds"),
    ("no-rece", "No tenders, requests to participate or projects were received"),
    ("no-facts", "Decision of the buyer, not following the procedure rules"),
    ("oth-int", "Decision of the buyer, because of other reasons"),
    ("rev-body", "Decision of a review body or another judicial body"),
];

/// BT-760 received submissions type → OCDS statistic `measure`.
pub const SUBMISSION_MEASURES: CodeTable = &[
    ("tenders", "bids"),
    ("t-sme", "smeBids"),
    ("t-micro", "microBids"),
    ("t-small", "smallBids"),
    ("t-med", "mediumBids"),
    ("t-esubm", "electronicBids"),
    ("t-oth-eea", "foreignBidsFromEU"),
    ("t-no-eea", "foreignBidsFromNonEU"),
    ("t-verif-inad", "disqualifiedBids"),
    ("t-verif-inad-low", "tooLowBids"),
    ("part-req", "requests"),
];

/// BT-539 award criterion type → OCDS criterion `type`.
pub const AWARD_CRITERION_TYPES: CodeTable = &[
    ("price", "price"),
    ("cost", "cost"),
    ("quality", "quality"),
];

/// BT-63 variants → OCDS `variantPolicy`.
pub const VARIANT_POLICIES: CodeTable = &[
    ("allowed", "allowed"),
    ("required", "required"),
    ("not-allowed", "notAllowed"),
];

/// BT-03 form type → OCDS release tag.
pub const FORM_TYPE_TAGS: CodeTable = &[
    ("planning", "planning"),
    ("competition", "tender"),
    ("dir-awa-pre", "tender"),
    ("result", "award"),
    ("cont-modif", "contractAmendment"),
    ("change", "tenderUpdate"),
];

/// BT-11 buyer legal type → description.
pub const BUYER_LEGAL_TYPES: CodeTable = &[
    ("body-pl", "Body governed by public law"),
    ("body-pl-cga", "Body governed by public law, controlled by a central government authority"),
    ("body-pl-la", "Body governed by public law, controlled by a local authority"),
    ("body-pl-ra", "Body governed by public law, controlled by a regional authority"),
    ("cga", "Central government authority"),
    ("def-cont", "Defence contractor"),
    ("eu-ins-bod-ag", "EU institution, body or agency"),
    ("eu-int-org", "European Institution/Agency or International Organisation"),
    ("grp-p-aut", "Group of public authorities"),
    ("int-org", "International organisation"),
    ("la", "Local authority"),
    ("org-sub", "Organisation awarding a contract subsidised by a contracting authority"),
    ("pub-undert", "Public undertaking"),
    ("ra", "Regional authority"),
    ("rl-aut", "Regional or local authority"),
    ("spec-rights-entity", "Entity with special or exclusive rights"),
];

/// BT-10 buyer activity → COFOG division.
pub const COFOG_ACTIVITIES: CodeTable = &[
    ("gen-pub", "01"),
    ("defence", "02"),
    ("pub-os", "03"),
    ("econ-aff", "04"),
    ("env-pro", "05"),
    ("hc-am", "06"),
    ("health", "07"),
    ("rcr", "08"),
    ("education", "09"),
    ("soc-pro", "10"),
];

/// BT-10 buyer activity → COFOG division label.
pub const COFOG_LABELS: CodeTable = &[
    ("gen-pub", "General public services"),
    ("defence", "Defence"),
    ("pub-os", "Public order and safety"),
    ("econ-aff", "Economic affairs"),
    ("env-pro", "Environmental protection"),
    ("hc-am", "Housing and community amenities"),
    ("health", "Health"),
    ("rcr", "Recreation, culture and religion"),
    ("education", "Education"),
    ("soc-pro", "Social protection"),
];

/// BT-195 unpublished field identifier → field label.
pub const WITHHELD_FIELDS: CodeTable = &[
    ("not-app-val", "Not Applicable Value"),
    ("rec-sub-cou", "Received Submissions Count"),
    ("rec-sub-typ", "Received Submissions Type"),
    ("ten-ran", "Tender Rank"),
    ("ten-val", "Tender Value"),
    ("ten-val-hig", "Tender Value Highest"),
    ("ten-val-low", "Tender Value Lowest"),
    ("win-cho", "Winner Chosen"),
    ("no-awa-rea", "Not Awarded Reason"),
    ("win-ten-var", "Winning Tender Variant"),
    ("sub-val", "Subcontracting Value"),
    ("sub-per", "Subcontracting Percentage"),
    ("sub-con", "Subcontracting"),
    ("buy-rev-cou", "Buyer Review Requests Count"),
    ("buy-rev-typ", "Buyer Review Requests Irregularity Type"),
    ("cou-ori", "Country Origin"),
    ("ten-ran-tot", "Tender Rank Total"),
    ("pro-typ", "Procedure Type"),
    ("pro-acc", "Procedure Accelerated"),
    ("pro-fea", "Procedure Features"),
];

/// Legacy TED contract type (`TYPE_CONTRACT/@CTYPE`) → `mainProcurementCategory`.
pub const LEGACY_CONTRACT_TYPES: CodeTable = &[
    ("WORKS", "works"),
    ("SUPPLIES", "goods"),
    ("SERVICES", "services"),
];

/// Legacy TED procedure element → (`procurementMethod`, details).
pub const LEGACY_PROCEDURES: &[(&str, &str, &str)] = &[
    ("PT_OPEN", "open", "Open procedure"),
    ("PT_RESTRICTED", "selective", "Restricted procedure"),
    ("PT_COMPETITIVE_NEGOTIATION", "selective", "Competitive procedure with negotiation"),
    ("PT_COMPETITIVE_DIALOGUE", "selective", "Competitive dialogue"),
    ("PT_INNOVATION_PARTNERSHIP", "selective", "Innovation partnership"),
    ("PT_NEGOTIATED_WITH_PRIOR_CALL", "selective", "Negotiated procedure with prior call for competition"),
    ("PT_AWARD_CONTRACT_WITHOUT_CALL", "limited", "Award of a contract without prior publication of a call for competition"),
];
