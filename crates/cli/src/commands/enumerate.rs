//! `enumerate` command implementation.

use anyhow::{Context as _, Result};
use control::{list_options, ContextReport, ReportScope};
use contracts::{Context, OptionMutability, OptionSnapshot};
use device_sim::SimContext;
use tracing::info;

use super::{load_rig, print_device_info, print_profiles, print_sensor_name};
use crate::cli::EnumerateArgs;

/// Execute the `enumerate` command
pub fn run_enumerate(rig: Option<&std::path::Path>, args: &EnumerateArgs) -> Result<()> {
    let blueprint = load_rig(rig)?;
    let context = SimContext::from_blueprint(&blueprint).context("Failed to build context")?;

    let scope = ReportScope {
        options: args.options,
        profiles: args.profiles,
    };

    if args.json {
        let report = ContextReport::capture(&context, scope);
        info!(
            devices = report.devices.len(),
            sensors = report.sensor_count(),
            "Enumeration captured"
        );
        let json =
            serde_json::to_string_pretty(&report).context("Failed to serialize enumeration")?;
        println!("{}", json);
    } else {
        print_enumeration(&context, scope);
    }

    Ok(())
}

fn print_enumeration(context: &dyn Context, scope: ReportScope) {
    let devices = context.query_devices();
    if devices.is_empty() {
        println!("No device detected. Is it plugged in?");
        return;
    }

    for device in &devices {
        print_device_info(device.as_ref());

        for sensor in device.query_sensors() {
            print_sensor_name(sensor.as_ref());

            if scope.options {
                for option in list_options(sensor.as_ref()) {
                    println!("\t\t{}", describe_option(&option));
                }
            }
            if scope.profiles {
                print_profiles(&sensor.stream_profiles());
            }
        }
    }
}

fn describe_option(option: &OptionSnapshot) -> String {
    let window = match option.mutability {
        OptionMutability::Always => "",
        OptionMutability::StreamingOnly => ", settable while streaming",
        OptionMutability::IdleOnly => ", settable while idle",
    };
    format!(
        "{}: {} ({}) {}{}",
        option.kind, option.value, option.description, option.range, window
    )
}
