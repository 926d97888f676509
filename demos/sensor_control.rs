//! Sensor Control Example
//!
//! The plain control flow over the built-in rig (or a rig file):
//! context -> devices -> sensors -> options / stream profiles, then
//! open -> start -> stop -> close on every sensor's first profile.
//!
//! Run with: cargo run --bin sensor_control [rig_path]

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context as _, Result};
use config_loader::ConfigLoader;
use contracts::{frame_callback, CameraInfo, Context, Frame, FrameHandler, SdkError, Sensor};
use device_sim::SimContext;
use observability::{LogFormat, ObservabilityConfig};
use tracing::info;

/// Handler type with no behavior, accepted by `start` like any closure
struct MyFrameHandler;

impl FrameHandler for MyFrameHandler {
    fn on_frame(&self, _frame: Frame) {}
}

fn frame_handler_that_does_nothing(_frame: Frame) {}

fn main() -> ExitCode {
    if let Err(e) = observability::init_with_config(ObservabilityConfig {
        log_format: LogFormat::Compact,
        default_log_level: "warn".to_string(),
        ..Default::default()
    }) {
        eprintln!("{:#}", e);
    }

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.chain().find_map(|c| c.downcast_ref::<SdkError>()) {
                Some(sdk) => eprintln!(
                    "error calling {}({}):\n    {}",
                    sdk.failed_function(),
                    sdk.failed_args(),
                    sdk.message
                ),
                None => eprintln!("{:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let blueprint = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => ConfigLoader::load_from_path(&path)
            .with_context(|| format!("Failed to load rig from {}", path.display()))?,
        None => ConfigLoader::builtin()?,
    };
    let context = SimContext::from_blueprint(&blueprint)?;
    info!(devices = blueprint.devices.len(), "Rig loaded");

    for device in context.query_devices() {
        if let Some(name) = device.info(CameraInfo::Name) {
            println!("Device name: {}", name);
        }
        if let Some(serial) = device.info(CameraInfo::SerialNumber) {
            println!("Device serial number: {}", serial);
        }
        if let Some(firmware) = device.info(CameraInfo::FirmwareVersion) {
            println!("Device firmware version: {}", firmware);
        }

        for sensor in device.query_sensors() {
            if let Some(name) = sensor.info(CameraInfo::Name) {
                println!("\tSensor name: {}", name);
            }

            // options that can only be set while streaming are skipped
            control::reset_to_defaults(sensor.as_ref()).check()?;

            for profile in sensor.stream_profiles() {
                println!("\t\t{}", control::profiles::describe(&profile));
                if let Some(video) = profile.video() {
                    println!(
                        "\t\t\tThis stream is a video stream representing a stream of images \
                         with a resolution of {}x{}, a frame rate of {} frames per second, \
                         and a pixel format of: {}",
                        video.width(),
                        video.height(),
                        video.fps(),
                        video.format()
                    );
                }
            }

            let Some(first_profile) = control::profiles::first_profile(sensor.as_ref()) else {
                continue;
            };

            sensor.open_profile(&first_profile)?;
            sensor.start(frame_callback(|frame: Frame| {
                println!(
                    "Frame received #{} with stream type: {}",
                    frame.frame_number(),
                    frame.stream_type()
                );
            }))?;

            if let Err(e) = start_other_handlers(sensor.as_ref()) {
                eprintln!(
                    "error calling {}({}):\n    {}",
                    e.failed_function(),
                    e.failed_args(),
                    e.message
                );
            }

            std::thread::sleep(Duration::from_secs(5));

            sensor.stop()?;
            sensor.close()?;
        }
    }

    Ok(())
}

/// A function item and a handler type, each rejected while streaming
fn start_other_handlers(sensor: &dyn Sensor) -> contracts::Result<()> {
    sensor.start(frame_callback(frame_handler_that_does_nothing))?;
    sensor.start(MyFrameHandler.into_callback())
}
