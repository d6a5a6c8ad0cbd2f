//! Notice format detection and metadata.

use roxmltree::Node;
use serde::Serialize;

use crate::config::{EFORMS_EXTENSION, EFORMS_ROOTS, TED_NAMESPACE_PREFIX, UBL_ROOT_NAMESPACE_PREFIX};
use crate::error::{ConverterError, Result};
use crate::format::{format_date, format_date_time};
use crate::registry::mapping::language;
use crate::xml::{get_tag_name, select, select_value};

/// Schema generation of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeFormat {
    /// eForms UBL notice (`ContractNotice`, `ContractAwardNotice`, ...).
    Eforms,
    /// Legacy TED export (`TED_EXPORT`, R2.0.8/R2.0.9).
    TedLegacy,
}

impl NoticeFormat {
    /// Detect the format from the root element.
    ///
    /// # Examples
    /// ```
    /// use roxmltree::Document;
    /// use eforms_ocds::notice::NoticeFormat;
    ///
    /// let xml = r#"<ContractNotice xmlns="urn:oasis:names:specification:ubl:schema:xsd:ContractNotice-2"/>"#;
    /// let doc = Document::parse(xml).unwrap();
    /// assert_eq!(NoticeFormat::detect(doc.root_element()).unwrap(), NoticeFormat::Eforms);
    /// ```
    pub fn detect(root: Node<'_, '_>) -> Result<Self> {
        let name = get_tag_name(root);
        let namespace = root.tag_name().namespace();

        if EFORMS_ROOTS.contains(&name)
            && namespace.is_some_and(|ns| ns.starts_with(UBL_ROOT_NAMESPACE_PREFIX))
        {
            return Ok(Self::Eforms);
        }
        if name == "TED_EXPORT" && namespace.is_some_and(|ns| ns.starts_with(TED_NAMESPACE_PREFIX)) {
            return Ok(Self::TedLegacy);
        }

        Err(ConverterError::UnsupportedFormat {
            root: name.to_string(),
            namespace: namespace.map(str::to_string),
        })
    }

    /// Short name, as shown by the CLI.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eforms => "eForms",
            Self::TedLegacy => "TED",
        }
    }
}

/// Facts about a notice that are not part of the release body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoticeMetadata {
    pub format: NoticeFormat,
    /// BT-701 notice identifier, or the TED document number.
    pub notice_id: Option<String>,
    /// BT-757 notice version.
    pub version: Option<String>,
    /// BT-04 procedure identifier.
    pub procedure_id: Option<String>,
    /// OPP-070 notice subtype.
    pub subtype: Option<String>,
    /// BT-03 form type, or the TED form number.
    pub form_type: Option<String>,
    /// BT-02 notice type, or the TED document type.
    pub notice_type: Option<String>,
    /// BT-05 dispatch date and time.
    pub dispatch_date: Option<String>,
    /// BT-702 notice language, as a two-letter code.
    pub language: Option<String>,
}

impl NoticeMetadata {
    /// Read the metadata of a notice.
    pub fn read(root: Node<'_, '_>, format: NoticeFormat) -> Result<Self> {
        match format {
            NoticeFormat::Eforms => Self::read_eforms(root),
            NoticeFormat::TedLegacy => Self::read_legacy(root),
        }
    }

    fn read_eforms(root: Node<'_, '_>) -> Result<Self> {
        let dispatch_date = match (
            select_value(root, "cbc:IssueDate")?,
            select_value(root, "cbc:IssueTime")?,
        ) {
            (Some(date), Some(time)) => format_date_time(&date, &time),
            (Some(date), None) => format_date(&date),
            _ => None,
        };

        Ok(Self {
            format: NoticeFormat::Eforms,
            notice_id: select_value(root, "cbc:ID[@schemeName='notice-id']")?,
            version: select_value(root, "cbc:VersionID")?,
            procedure_id: select_value(root, "cbc:ContractFolderID")?,
            subtype: select_value(
                root,
                &format!("{EFORMS_EXTENSION}/efac:NoticeSubType/cbc:SubTypeCode"),
            )?,
            form_type: select_value(root, "cbc:NoticeTypeCode/@listName")?,
            notice_type: select_value(root, "cbc:NoticeTypeCode")?,
            dispatch_date,
            language: select_value(root, "cbc:NoticeLanguageCode")?
                .and_then(|code| language(&code)),
        })
    }

    fn read_legacy(root: Node<'_, '_>) -> Result<Self> {
        let form_type = match select_value(root, "FORM_SECTION/*[1]/@FORM")? {
            Some(form) => Some(form),
            None => select(root, "FORM_SECTION/*[1]")?
                .first()
                .map(|form| get_tag_name(*form).to_string()),
        };

        Ok(Self {
            format: NoticeFormat::TedLegacy,
            notice_id: select_value(root, "@DOC_ID")?,
            version: None,
            procedure_id: None,
            subtype: None,
            form_type,
            notice_type: select_value(root, "CODED_DATA_SECTION/CODIF_DATA/TD_DOCUMENT_TYPE")?,
            dispatch_date: select_value(root, "CODED_DATA_SECTION/CODIF_DATA/DS_DATE_DISPATCH")?
                .and_then(|date| format_date(&date)),
            language: select_value(root, "CODED_DATA_SECTION/NOTICE_DATA/LG_ORIG")?
                .and_then(|code| language(&code)),
        })
    }
}
