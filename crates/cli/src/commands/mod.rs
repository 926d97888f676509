//! Command implementations.

mod enumerate;
mod reset;
mod stream;
mod validate;

pub use enumerate::run_enumerate;
pub use reset::run_reset;
pub use stream::run_stream;
pub use validate::run_validate;

use std::path::Path;

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::{CameraInfo, Device, RigBlueprint, Sensor, StreamProfile};
use tracing::info;

use crate::error::CliError;

/// Load the rig from `path`, or the built-in rig
pub(crate) fn load_rig(path: Option<&Path>) -> Result<RigBlueprint> {
    let blueprint = match path {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::rig_not_found(path.display().to_string()).into());
            }
            ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load rig from {}", path.display()))?
        }
        None => ConfigLoader::builtin().context("Built-in rig is invalid")?,
    };

    info!(
        rig = %path.map(|p| p.display().to_string()).unwrap_or_else(|| "built-in".into()),
        devices = blueprint.devices.len(),
        sensors = blueprint.sensor_count(),
        profiles = blueprint.profile_count(),
        "Rig loaded"
    );
    Ok(blueprint)
}

/// Sensors to visit, `None` for every sensor
pub(crate) fn sensor_selected(sensor: &dyn Sensor, filter: Option<&str>) -> bool {
    filter.map_or(true, |name| sensor.name() == name)
}

pub(crate) fn print_device_info(device: &dyn Device) {
    let lines = [
        (CameraInfo::Name, "Device name"),
        (CameraInfo::SerialNumber, "Device serial number"),
        (CameraInfo::FirmwareVersion, "Device firmware version"),
    ];
    for (kind, label) in lines {
        if let Some(value) = device.info(kind) {
            println!("{}: {}", label, value);
        }
    }
}

pub(crate) fn print_sensor_name(sensor: &dyn Sensor) {
    if let Some(name) = sensor.info(CameraInfo::Name) {
        println!("\tSensor name: {}", name);
    }
}

pub(crate) fn print_profiles(profiles: &[StreamProfile]) {
    for profile in profiles {
        println!("\t\t{}", control::profiles::describe(profile));
        if let Some(detail) = control::profiles::describe_extension(profile) {
            println!("\t\t\t{}", detail);
        }
    }
}
