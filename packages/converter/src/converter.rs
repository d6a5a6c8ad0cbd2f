//! Main conversion service that ties all components together.

use std::path::Path;

use roxmltree::Document;
use serde::Serialize;

use crate::config::ConverterConfig;
use crate::error::{ConverterError, Result};
use crate::notice::{NoticeFormat, NoticeMetadata};
use crate::registry::{
    create_eforms_registry, create_legacy_registry, ConversionEngine, ConversionWarning,
    ConvertContext, ConverterRegistry,
};
use crate::release::Release;

/// The result of converting one notice.
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    /// The finalized OCDS release.
    pub release: Release,
    /// Facts about the source notice.
    pub metadata: NoticeMetadata,
    /// Problems that only affected single fields.
    pub warnings: Vec<ConversionWarning>,
}

/// Converter name used for warnings raised outside any converter.
const INPUT: &str = "input";

/// Check that every configured id names a converter of either registry.
fn check_ids(config: &ConverterConfig) -> Result<()> {
    let eforms = create_eforms_registry();
    let legacy = create_legacy_registry();
    for id in config.skip.iter().chain(config.only.iter()) {
        if !eforms.has_converter(id) && !legacy.has_converter(id) {
            return Err(ConverterError::UnknownConverter(id.clone()));
        }
    }
    Ok(())
}

/// Build the registry for a notice format, with the configuration applied.
fn registry_for(format: NoticeFormat, config: &ConverterConfig) -> ConverterRegistry {
    let mut registry = match format {
        NoticeFormat::Eforms => create_eforms_registry(),
        NoticeFormat::TedLegacy => create_legacy_registry(),
    };
    if !config.only.is_empty() {
        registry.retain_only(&config.only);
    }
    registry.skip(config.skip.iter().cloned());
    registry
}

/// Convert one notice to an OCDS release.
///
/// # Arguments
/// * `xml` - The notice XML
/// * `config` - OCID prefix and converter selection
///
/// # Returns
/// The release, the notice metadata, and any warnings raised while
/// converting individual fields.
///
/// # Errors
/// Invalid configuration, malformed XML and unsupported documents are
/// errors. Problems with single fields are warnings.
pub fn convert_notice(xml: &str, config: &ConverterConfig) -> Result<Conversion> {
    config.validate()?;
    check_ids(config)?;

    let doc = Document::parse(xml)?;
    let root = doc.root_element();
    let format = NoticeFormat::detect(root)?;
    let metadata = NoticeMetadata::read(root, format)?;

    tracing::debug!(
        format = format.as_str(),
        notice = metadata.notice_id.as_deref().unwrap_or_default(),
        "Converting notice"
    );

    let engine = ConversionEngine::new(registry_for(format, config));
    let mut context = ConvertContext::new().with_ocid_prefix(&config.ocid_prefix);
    let mut release = engine.run(root, &mut context);
    release.finalize();

    Ok(Conversion {
        release,
        metadata,
        warnings: context.into_warnings(),
    })
}

/// Convert a notice given as raw bytes.
///
/// Bytes that are not valid UTF-8 are decoded lossily, with a warning.
pub fn convert_bytes(bytes: &[u8], config: &ConverterConfig) -> Result<Conversion> {
    match std::str::from_utf8(bytes) {
        Ok(xml) => convert_notice(xml, config),
        Err(err) => {
            tracing::warn!(error = %err, "Notice is not valid UTF-8, decoding lossily");
            let xml = String::from_utf8_lossy(bytes);
            let mut conversion = convert_notice(&xml, config)?;
            conversion.warnings.insert(
                0,
                ConversionWarning {
                    converter: INPUT.to_string(),
                    message: format!("invalid UTF-8 replaced: {err}"),
                },
            );
            Ok(conversion)
        }
    }
}

/// Read and convert a notice file.
pub fn convert_file(path: &Path, config: &ConverterConfig) -> Result<Conversion> {
    let bytes = std::fs::read(path)?;
    convert_bytes(&bytes, config)
}
