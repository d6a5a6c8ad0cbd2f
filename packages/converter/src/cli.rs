//! Command-line interface for the converter.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::ConverterConfig;
use crate::converter::{convert_file, Conversion};
use crate::error::{ConverterError, Result};
use crate::output::{generate_json, save_json};
use crate::registry::{create_eforms_registry, create_legacy_registry, ConverterRegistry};

/// eForms OCDS - Convert EU procurement notices to OCDS releases.
#[derive(Parser)]
#[command(name = "eforms-ocds")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert eForms or TED notices to OCDS release JSON.
    Convert {
        /// Notice XML files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory (default: stdout for one notice, next to each input otherwise)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// OCID prefix (e.g., ocds-id6ixc)
        #[arg(long)]
        ocid_prefix: Option<String>,

        /// Converter id to skip (repeatable)
        #[arg(long)]
        skip: Vec<String>,

        /// Converter id to run, skipping all others (repeatable)
        #[arg(long)]
        only: Vec<String>,

        /// Write compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },

    /// List every converter id with its description.
    List,
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            inputs,
            output,
            config,
            ocid_prefix,
            skip,
            only,
            compact,
        } => {
            let config = build_config(config.as_deref(), ocid_prefix, skip, only)?;
            convert_command(&inputs, output.as_deref(), &config, !compact)
        }
        Commands::List => {
            list_command();
            Ok(())
        }
    }
}

/// Merge the configuration file with command-line overrides.
fn build_config(
    path: Option<&Path>,
    ocid_prefix: Option<String>,
    skip: Vec<String>,
    only: Vec<String>,
) -> Result<ConverterConfig> {
    let mut config = match path {
        Some(path) => ConverterConfig::from_file(path)?,
        None => ConverterConfig::default(),
    };
    if let Some(prefix) = ocid_prefix {
        config.ocid_prefix = prefix;
    }
    config.skip.extend(skip);
    if !only.is_empty() {
        config.only = only;
    }
    config.validate()?;
    Ok(config)
}

/// Execute the convert command.
fn convert_command(
    inputs: &[PathBuf],
    output: Option<&Path>,
    config: &ConverterConfig,
    pretty: bool,
) -> Result<()> {
    // Validate output directory (if specified) before converting
    if let Some(output_dir) = output {
        if output_dir.exists() && !output_dir.is_dir() {
            return Err(ConverterError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Output path is not a directory: {}", output_dir.display()),
            )));
        }
    }

    // One notice without an output directory goes to stdout
    if let ([input], None) = (inputs, output) {
        let conversion = convert_file(input, config)?;
        let json = generate_json(&conversion, pretty)?;
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(json.as_bytes())?;
        if !pretty {
            stdout.write_all(b"\n")?;
        }
        report_warnings(&conversion);
        return Ok(());
    }

    let pb = ProgressBar::new(inputs.len() as u64);
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid template")
            .progress_chars("=> "),
    );

    let mut failed = 0;
    for input in inputs {
        pb.set_message(input.display().to_string());
        let output_dir = output
            .or_else(|| input.parent())
            .unwrap_or_else(|| Path::new("."));

        match convert_file(input, config)
            .and_then(|conversion| save_json(&conversion, input, output_dir, pretty).map(|path| (conversion, path)))
        {
            Ok((conversion, path)) => {
                let warnings = if conversion.warnings.is_empty() {
                    String::new()
                } else {
                    format!(" ({} warnings)", style(conversion.warnings.len()).yellow())
                };
                pb.println(format!(
                    "{} {} → {}{warnings}",
                    style("Converted").green().bold(),
                    input.display(),
                    path.display()
                ));
            }
            Err(e) => {
                failed += 1;
                pb.println(format!(
                    "{} {}: {e}",
                    style("Failed").red().bold(),
                    input.display()
                ));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if failed > 0 {
        return Err(ConverterError::BatchFailed {
            failed,
            total: inputs.len(),
        });
    }
    Ok(())
}

/// Print field warnings to stderr.
fn report_warnings(conversion: &Conversion) {
    if conversion.warnings.is_empty() {
        return;
    }
    eprintln!(
        "{} {}",
        style("Warnings:").yellow().bold(),
        conversion.warnings.len()
    );
    for warning in &conversion.warnings {
        eprintln!("  {warning}");
    }
}

/// Execute the list command.
fn list_command() {
    print_registry("eForms", &create_eforms_registry());
    println!();
    print_registry("TED", &create_legacy_registry());
}

fn print_registry(title: &str, registry: &ConverterRegistry) {
    println!("{} ({})", style(title).bold(), registry.len());
    for converter in registry.active() {
        println!("  {:<36} {}", style(converter.id()).cyan(), converter.description());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_convert() {
        let cli = Cli::parse_from(["eforms-ocds", "convert", "notice.xml"]);

        let Commands::Convert {
            inputs,
            output,
            compact,
            skip,
            ..
        } = cli.command
        else {
            panic!("expected convert command");
        };
        assert_eq!(inputs, vec![PathBuf::from("notice.xml")]);
        assert!(output.is_none());
        assert!(!compact);
        assert!(skip.is_empty());
    }

    #[test]
    fn test_cli_parse_convert_with_options() {
        let cli = Cli::parse_from([
            "eforms-ocds",
            "convert",
            "a.xml",
            "b.xml",
            "--output",
            "out",
            "--skip",
            "BT-21-Lot",
            "--skip",
            "BT-24-Lot",
            "--only",
            "BT-04-notice",
            "--compact",
        ]);

        let Commands::Convert {
            inputs,
            output,
            skip,
            only,
            compact,
            ..
        } = cli.command
        else {
            panic!("expected convert command");
        };
        assert_eq!(inputs.len(), 2);
        assert_eq!(output, Some(PathBuf::from("out")));
        assert_eq!(skip, vec!["BT-21-Lot".to_string(), "BT-24-Lot".to_string()]);
        assert_eq!(only, vec!["BT-04-notice".to_string()]);
        assert!(compact);
    }

    #[test]
    fn test_cli_parse_list() {
        let cli = Cli::parse_from(["eforms-ocds", "list"]);
        assert!(matches!(cli.command, Commands::List));
    }

    #[test]
    fn test_cli_requires_input() {
        assert!(Cli::try_parse_from(["eforms-ocds", "convert"]).is_err());
    }

    #[test]
    fn test_build_config_overrides() {
        let config = build_config(
            None,
            Some("ocds-abc123".to_string()),
            vec!["BT-21-Lot".to_string()],
            Vec::new(),
        )
        .unwrap();
        assert_eq!(config.ocid_prefix, "ocds-abc123");
        assert_eq!(config.skip, vec!["BT-21-Lot".to_string()]);
        assert!(config.only.is_empty());
    }

    #[test]
    fn test_build_config_rejects_bad_prefix() {
        let result = build_config(None, Some("bad".to_string()), Vec::new(), Vec::new());
        assert!(matches!(result, Err(ConverterError::InvalidOcidPrefix(_))));
    }
}
