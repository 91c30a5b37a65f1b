//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{GatewayBlueprint, WriterConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    gateway_id: String,
    writers: Vec<WriterSummary>,
}

#[derive(Serialize)]
struct WriterSummary {
    name: String,
    writer_type: String,
    max_unwritten_logs: usize,
    write_period_secs: i64,
    filtered: bool,
}

impl From<&WriterConfig> for WriterSummary {
    fn from(writer: &WriterConfig) -> Self {
        Self {
            name: writer.name.clone(),
            writer_type: format!("{:?}", writer.writer_type),
            max_unwritten_logs: writer.logging.max_unwritten_logs,
            write_period_secs: writer.logging.write_period_secs,
            filtered: writer.filter.is_some(),
        }
    }
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    gateway_id: blueprint.gateway_id.clone(),
                    writers: blueprint.writers.iter().map(WriterSummary::from).collect(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &GatewayBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.writers.is_empty() {
        warnings.push("No writers configured - published records will be dropped".to_string());
    }

    for writer in &blueprint.writers {
        if writer.logging.write_period().is_none() && writer.logging.max_unwritten_logs > 0 {
            warnings.push(format!(
                "Writer '{}' has no periodic flush - up to {} records may stay unwritten",
                writer.name, writer.logging.max_unwritten_logs
            ));
        }
        if let Some(filter) = &writer.filter {
            if let Some(both) = filter.include.iter().find(|t| filter.exclude.contains(t)) {
                warnings.push(format!(
                    "Writer '{}' both includes and excludes '{}' - it will be rejected",
                    writer.name, both
                ));
            }
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Gateway: {}", summary.gateway_id);
            println!("  Writers: {}", summary.writers.len());
            for writer in &summary.writers {
                println!(
                    "    - {} ({}) max_unwritten_logs={} write_period_secs={}{}",
                    writer.name,
                    writer.writer_type,
                    writer.max_unwritten_logs,
                    writer.write_period_secs,
                    if writer.filtered { " filtered" } else { "" }
                );
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\nWarnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
