//! Config validation
//!
//! Rules:
//! - field ranges (derive): queue capacity, fps, non-empty names
//! - serial_number unique across devices
//! - sensor name unique within a device
//! - option kind unique within a sensor
//! - option min <= max, step > 0, default and initial value inside [min, max]
//! - video profiles carry a non-zero width and height

use std::collections::HashSet;

use ::validator::Validate;
use contracts::{ConfigError, ProfileKind, RigBlueprint, SensorConfig};

/// Validate a RigBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &RigBlueprint) -> Result<(), ConfigError> {
    validate_fields(blueprint)?;
    validate_serial_numbers(blueprint)?;
    for (d, device) in blueprint.devices.iter().enumerate() {
        validate_sensor_names(d, &device.sensors)?;
        for (s, sensor) in device.sensors.iter().enumerate() {
            let path = format!("devices[{d}].sensors[{s}]");
            validate_options(&path, sensor)?;
            validate_profiles(&path, sensor)?;
        }
    }
    Ok(())
}

/// Derive-based field checks
fn validate_fields(blueprint: &RigBlueprint) -> Result<(), ConfigError> {
    blueprint
        .validate()
        .map_err(|e| ConfigError::validation("fields", e.to_string().replace('\n', "; ")))
}

/// Serial numbers are unique across devices
fn validate_serial_numbers(blueprint: &RigBlueprint) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for (d, device) in blueprint.devices.iter().enumerate() {
        if let Some(serial) = &device.serial_number {
            if !seen.insert(serial.as_str()) {
                return Err(ConfigError::validation(
                    format!("devices[{d}].serial_number"),
                    format!("duplicate serial_number '{serial}'"),
                ));
            }
        }
    }
    Ok(())
}

/// Sensor names are unique within a device
fn validate_sensor_names(device_idx: usize, sensors: &[SensorConfig]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for (s, sensor) in sensors.iter().enumerate() {
        if !seen.insert(sensor.name.as_str()) {
            return Err(ConfigError::validation(
                format!("devices[{device_idx}].sensors[{s}].name"),
                format!("duplicate sensor name '{}'", sensor.name),
            ));
        }
    }
    Ok(())
}

fn validate_options(path: &str, sensor: &SensorConfig) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for (o, option) in sensor.options.iter().enumerate() {
        let field = format!("{path}.options[{o}]");

        if !seen.insert(option.kind) {
            return Err(ConfigError::validation(
                field,
                format!("duplicate option kind {:?}", option.kind),
            ));
        }

        let range = option.range();
        if !(range.min <= range.max) {
            return Err(ConfigError::validation(
                field,
                format!("min ({}) must be <= max ({})", range.min, range.max),
            ));
        }
        if !(range.step > 0.0) {
            return Err(ConfigError::validation(
                field,
                format!("step must be > 0, got {}", range.step),
            ));
        }
        if !range.contains(range.default) {
            return Err(ConfigError::validation(
                field,
                format!("default {} outside [{}, {}]", range.default, range.min, range.max),
            ));
        }
        let initial = option.initial_value();
        if !range.contains(initial) {
            return Err(ConfigError::validation(
                field,
                format!("value {} outside [{}, {}]", initial, range.min, range.max),
            ));
        }
    }
    Ok(())
}

fn validate_profiles(path: &str, sensor: &SensorConfig) -> Result<(), ConfigError> {
    for (p, profile) in sensor.profiles.iter().enumerate() {
        if profile.kind != ProfileKind::Video {
            continue;
        }
        match (profile.width, profile.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => {}
            _ => {
                return Err(ConfigError::validation(
                    format!("{path}.profiles[{p}]"),
                    "video profile requires non-zero width and height",
                ));
            }
        }
    }
    Ok(())
}
