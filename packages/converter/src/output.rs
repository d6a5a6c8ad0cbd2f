//! JSON output of converted releases.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::converter::Conversion;
use crate::error::Result;

/// Generate the release JSON of a conversion.
///
/// Pretty output ends with a newline; compact output is a single line.
pub fn generate_json(conversion: &Conversion, pretty: bool) -> Result<String> {
    if pretty {
        let mut json = serde_json::to_string_pretty(&conversion.release)?;
        json.push('\n');
        Ok(json)
    } else {
        Ok(serde_json::to_string(&conversion.release)?)
    }
}

/// Save the release JSON next to other outputs in `output_dir`.
///
/// The file is named after the input file (`notice.xml` → `notice.json`).
/// Uses atomic write pattern: writes to temp file, syncs to disk, then renames.
///
/// # Returns
/// Path to the saved file
pub fn save_json(
    conversion: &Conversion,
    input: &Path,
    output_dir: &Path,
    pretty: bool,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;

    let stem = input
        .file_stem()
        .map_or_else(|| "release".into(), |s| s.to_string_lossy());
    let output_file = output_dir.join(format!("{stem}.json"));
    let temp_file = output_dir.join(format!(".{stem}.json.tmp"));

    let content = generate_json(conversion, pretty)?;

    {
        let mut file = File::create(&temp_file)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    // On Windows, rename fails if the destination already exists
    #[cfg(target_os = "windows")]
    if output_file.exists() {
        fs::remove_file(&output_file)?;
    }

    fs::rename(&temp_file, &output_file)?;

    Ok(output_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConverterConfig;
    use crate::converter::convert_notice;
    use tempfile::tempdir;

    const NOTICE: &str = r#"<ContractNotice
        xmlns="urn:oasis:names:specification:ubl:schema:xsd:ContractNotice-2"
        xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2">
        <cbc:ContractFolderID>PROC-1</cbc:ContractFolderID>
        <cbc:ID schemeName="notice-id">NOTICE-1</cbc:ID>
    </ContractNotice>"#;

    fn conversion() -> Conversion {
        convert_notice(NOTICE, &ConverterConfig::default()).unwrap()
    }

    #[test]
    fn test_generate_json_key_order() {
        let json = generate_json(&conversion(), false).unwrap();
        assert_eq!(
            json,
            r#"{"ocid":"ocds-id6ixc-PROC-1","id":"NOTICE-1","initiationType":"tender"}"#
        );
    }

    #[test]
    fn test_generate_json_pretty() {
        let json = generate_json(&conversion(), true).unwrap();
        assert!(json.starts_with("{\n  \"ocid\""));
        assert!(json.ends_with("}\n"));
    }

    #[test]
    fn test_save_json() {
        let temp_dir = tempdir().unwrap();
        let path = save_json(
            &conversion(),
            Path::new("notices/12345-2024.xml"),
            temp_dir.path(),
            true,
        )
        .unwrap();

        assert_eq!(path, temp_dir.path().join("12345-2024.json"));
        let content = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["id"], "NOTICE-1");
        assert!(!temp_dir.path().join(".12345-2024.json.tmp").exists());
    }
}
