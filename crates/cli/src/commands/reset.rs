//! `reset` command implementation.

use anyhow::{Context as _, Result};
use control::{reset_to_defaults, ResetReport};
use contracts::Context;
use device_sim::SimContext;
use tracing::warn;

use super::{load_rig, print_device_info, print_sensor_name, sensor_selected};
use crate::cli::ResetArgs;
use crate::error::{format_sdk_error, CliError};

/// Execute the `reset` command
///
/// Options that cannot be written in the current state are reported and
/// skipped. Any other rejection fails the command after every sensor has
/// been visited.
pub fn run_reset(rig: Option<&std::path::Path>, args: &ResetArgs) -> Result<()> {
    let blueprint = load_rig(rig)?;
    let context = SimContext::from_blueprint(&blueprint).context("Failed to build context")?;

    let mut visited = 0usize;
    let mut unexpected = None;

    for device in context.query_devices() {
        print_device_info(device.as_ref());

        for sensor in device.query_sensors() {
            if !sensor_selected(sensor.as_ref(), args.sensor.as_deref()) {
                continue;
            }
            visited += 1;
            print_sensor_name(sensor.as_ref());

            let name = sensor.name();
            let report = reset_to_defaults(sensor.as_ref());
            record(&name, &report);
            print_report(&report);

            if unexpected.is_none() {
                unexpected = report.unexpected().next().map(|r| r.error.clone());
            }
        }
    }

    if visited == 0 {
        if let Some(name) = &args.sensor {
            return Err(CliError::sensor_not_found(name.clone()).into());
        }
        println!("No device detected. Is it plugged in?");
    }

    match unexpected {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

fn record(sensor: &str, report: &ResetReport) {
    observability::record_option_reset(sensor, report.applied.len(), report.rejected.len());
    for rejected in &report.rejected {
        observability::record_option_rejected(sensor, rejected.kind, &rejected.error);
    }
}

fn print_report(report: &ResetReport) {
    for kind in &report.applied {
        println!("\t\t{}: reset to default", kind);
    }
    for rejected in &report.rejected {
        if rejected.error.is_invalid_state() {
            println!(
                "\t\t{}: skipped, {}",
                rejected.kind, rejected.error.message
            );
        } else {
            warn!(option = %rejected.kind, default = rejected.default, "unexpected rejection");
            eprintln!("{}", format_sdk_error(&rejected.error));
        }
    }
}
