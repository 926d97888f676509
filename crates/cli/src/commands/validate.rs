//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{DeliveryPolicy, RigBlueprint};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;
use crate::error::CliError;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    rig_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<RigSummary>,
}

#[derive(Serialize)]
struct RigSummary {
    version: String,
    device_count: usize,
    sensor_count: usize,
    profile_count: usize,
    queue_capacity: usize,
    policy: DeliveryPolicy,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(rig = %args.path.display(), "Validating rig");

    let result = validate_rig(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    match result.error {
        None => Ok(()),
        Some(message) => Err(CliError::validation(message).into()),
    }
}

fn validate_rig(args: &ValidateArgs) -> ValidationResult {
    let rig_path = args.path.display().to_string();

    if !args.path.exists() {
        return ValidationResult {
            valid: false,
            error: Some(CliError::rig_not_found(rig_path.clone()).to_string()),
            rig_path,
            warnings: Vec::new(),
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.path) {
        Ok(blueprint) => ValidationResult {
            valid: true,
            rig_path,
            error: None,
            warnings: collect_warnings(&blueprint),
            summary: Some(RigSummary {
                version: format!("{:?}", blueprint.version),
                device_count: blueprint.devices.len(),
                sensor_count: blueprint.sensor_count(),
                profile_count: blueprint.profile_count(),
                queue_capacity: blueprint.delivery.queue_capacity,
                policy: blueprint.delivery.policy,
            }),
        },
        Err(e) => ValidationResult {
            valid: false,
            rig_path,
            error: Some(e.to_string()),
            warnings: Vec::new(),
            summary: None,
        },
    }
}

/// Non-fatal issues
fn collect_warnings(blueprint: &RigBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.devices.is_empty() {
        warnings.push("No devices configured - enumeration will be empty".to_string());
    }

    for (i, device) in blueprint.devices.iter().enumerate() {
        let label = device.name.clone().unwrap_or_else(|| format!("device #{}", i));

        if device.serial_number.is_none() {
            warnings.push(format!("Device '{}' reports no serial number", label));
        }
        if device.sensors.is_empty() {
            warnings.push(format!("Device '{}' has no sensors", label));
        }

        for sensor in &device.sensors {
            if sensor.profiles.is_empty() {
                warnings.push(format!(
                    "Sensor '{}' of '{}' has no stream profiles and cannot stream",
                    sensor.name, label
                ));
            }
            let delivery = sensor.delivery.unwrap_or(blueprint.delivery);
            if delivery.policy == DeliveryPolicy::Block {
                warnings.push(format!(
                    "Sensor '{}' uses the block policy - a slow handler stalls frame production",
                    sensor.name
                ));
            }
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Rig is valid: {}", result.rig_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Devices: {}", summary.device_count);
            println!("  Sensors: {}", summary.sensor_count);
            println!("  Stream profiles: {}", summary.profile_count);
            println!(
                "  Delivery: {} frames, {:?}",
                summary.queue_capacity, summary.policy
            );
        }

        if !result.warnings.is_empty() {
            println!("\n⚠ Warnings:");
            for warning in &result.warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Rig is invalid: {}", result.rig_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
