//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::ActionsManifest;

use super::load_manifest;
use crate::cli::ValidateArgs;
use crate::demo::DEMO_ACTIONS;

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
    action_count: usize,
    enabled_count: usize,
    disabled_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating actions file");

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

    match load_manifest(&args.config) {
        Ok(manifest) => {
            let warnings = collect_warnings(&manifest);
            let (enabled_count, disabled_count) = manifest
                .actions
                .iter()
                .flatten()
                .fold((0, 0), |(on, off), (_, settings)| {
                    if settings.disabled {
                        (on, off + 1)
                    } else {
                        (on + 1, off)
                    }
                });

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
                    action_count: enabled_count + disabled_count,
                    enabled_count,
                    disabled_count,
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
fn collect_warnings(manifest: &ActionsManifest) -> Vec<String> {
    let Some(actions) = &manifest.actions else {
        return vec!["No [actions] table - every action is disabled".to_string()];
    };

    let mut warnings = Vec::new();
    if actions.is_empty() {
        warnings.push("[actions] table is empty - every action is disabled".to_string());
    }
    for name in actions.keys() {
        if !DEMO_ACTIONS.contains(&name.as_str()) {
            warnings.push(format!(
                "Action '{}' has no handler - requests will get \"Unknown action\"",
                name
            ));
        }
    }
    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Actions: {}", summary.action_count);
            println!("  Enabled: {}", summary.enabled_count);
            println!("  Disabled: {}", summary.disabled_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
