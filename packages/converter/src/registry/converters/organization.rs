//! Organization and touch point fields, written to `parties`.

use crate::registry::mapping::{field, FieldMapping, Transform, ORGANIZATION, TOUCH_POINT};

/// Address and contact fields shared by companies and touch points.
macro_rules! party_fields {
    ($scope:expr, $suffix:literal) => {
        [
            field(
                concat!("BT-500-", $suffix),
                "Organization name",
                $scope,
                "cac:PartyName/cbc:Name",
                "name",
                Transform::Text,
            ),
            field(
                concat!("BT-510(a)-", $suffix),
                "Organization street",
                $scope,
                "cac:PostalAddress/cbc:StreetName",
                "address.streetAddress",
                Transform::Text,
            ),
            field(
                concat!("BT-513-", $suffix),
                "Organization city",
                $scope,
                "cac:PostalAddress/cbc:CityName",
                "address.locality",
                Transform::Text,
            ),
            field(
                concat!("BT-512-", $suffix),
                "Organization postcode",
                $scope,
                "cac:PostalAddress/cbc:PostalZone",
                "address.postalCode",
                Transform::Text,
            ),
            field(
                concat!("BT-507-", $suffix),
                "Organization country subdivision",
                $scope,
                "cac:PostalAddress/cbc:CountrySubentityCode",
                "address.region",
                Transform::Text,
            ),
            field(
                concat!("BT-514-", $suffix),
                "Organization country code",
                $scope,
                "cac:PostalAddress/cac:Country/cbc:IdentificationCode",
                "address.country",
                Transform::Country,
            ),
            field(
                concat!("BT-502-", $suffix),
                "Organization contact point",
                $scope,
                "cac:Contact/cbc:Name",
                "contactPoint.name",
                Transform::Text,
            ),
            field(
                concat!("BT-506-", $suffix),
                "Organization contact email address",
                $scope,
                "cac:Contact/cbc:ElectronicMail",
                "contactPoint.email",
                Transform::Text,
            ),
            field(
                concat!("BT-503-", $suffix),
                "Organization contact telephone number",
                $scope,
                "cac:Contact/cbc:Telephone",
                "contactPoint.telephone",
                Transform::Text,
            ),
            field(
                concat!("BT-739-", $suffix),
                "Organization contact fax",
                $scope,
                "cac:Contact/cbc:Telefax",
                "contactPoint.faxNumber",
                Transform::Text,
            ),
            field(
                concat!("BT-505-", $suffix),
                "Organization internet address",
                $scope,
                "cbc:WebsiteURI",
                "details.url",
                Transform::Text,
            ),
        ]
    };
}

/// Identifiers of companies and touch points.
pub const IDENTIFIERS: &[FieldMapping] = &[
    field(
        "OPT-200-Organization-Company",
        "Organization technical identifier",
        ORGANIZATION,
        "cac:PartyIdentification/cbc:ID",
        "id",
        Transform::Text,
    ),
    field(
        "BT-501-Organization-Company",
        "Organization identifier",
        ORGANIZATION,
        "cac:PartyLegalEntity/cbc:CompanyID",
        "identifier.id",
        Transform::Text,
    ),
    field(
        "OPT-201-Organization-TouchPoint",
        "Touch point technical identifier",
        TOUCH_POINT,
        "cac:PartyIdentification/cbc:ID",
        "id",
        Transform::Text,
    ),
];

/// Company fields.
pub const COMPANY: &[FieldMapping] = &party_fields!(ORGANIZATION, "Organization-Company");

/// Touch point fields.
pub const TOUCH_POINTS: &[FieldMapping] = &party_fields!(TOUCH_POINT, "Organization-TouchPoint");
