//! Registry configuration for eForms and legacy TED notices.

use super::converters::{legacy, lot, notice, organization, procedure, result, roles, withheld};
use super::core::ConverterRegistry;

/// Create a registry with every eForms converter.
///
/// Converters run in registration order: notice fields first, then the
/// procedure, lots, organizations and results.
#[must_use]
pub fn create_eforms_registry() -> ConverterRegistry {
    let mut registry = ConverterRegistry::new();

    // Notice
    registry.register_all(notice::MAPPINGS.iter().copied());
    registry.register(notice::Ocid);
    registry.register(notice::ReleaseTag);

    // Procedure
    registry.register_all(procedure::MAPPINGS.iter().copied());
    registry.register(procedure::ProcedureType);

    // Lots, groups of lots and parts
    registry.register_all(lot::MAPPINGS.iter().copied());
    registry.register(lot::LotClassification::MAIN);
    registry.register(lot::LotClassification::ADDITIONAL);
    registry.register(lot::PlaceOfPerformance);
    registry.register(lot::AwardCriteria);
    registry.register(lot::ProcurementDocuments);
    registry.register_all(lot::LOTS_GROUP_MAPPINGS.iter().copied());
    registry.register(lot::LotsGroupComposition);
    registry.register_all(lot::PART_MAPPINGS.iter().copied());

    // Organizations and their roles
    registry.register_all(organization::IDENTIFIERS.iter().copied());
    registry.register_all(organization::COMPANY.iter().copied());
    registry.register_all(organization::TOUCH_POINTS.iter().copied());
    registry.register(roles::Buyer);
    registry.register_all(roles::ROLES.iter().copied());
    registry.register(roles::BuyerLegalType);
    registry.register(roles::BuyerActivity);

    // Results
    registry.register_all(result::MAPPINGS.iter().copied());
    registry.register(result::AwardValue);
    registry.register(result::AwardDate);
    registry.register(result::Suppliers);
    registry.register(result::Tenderers);
    registry.register(result::BidTenderers);
    registry.register(result::ContractAward);
    registry.register(result::ContractDocument);
    registry.register(result::ReceivedSubmissions);

    registry.register(withheld::WithheldInformation);

    registry
}

/// Create a registry with every legacy TED converter.
#[must_use]
pub fn create_legacy_registry() -> ConverterRegistry {
    let mut registry = ConverterRegistry::new();

    registry.register(legacy::LegacyOcid);
    registry.register(legacy::LegacyTag);
    registry.register_all(legacy::MAPPINGS.iter().copied());
    registry.register(legacy::LegacyProcedureType);
    registry.register(legacy::LegacyBuyer);
    registry.register(legacy::LegacyContractors);

    registry
}
