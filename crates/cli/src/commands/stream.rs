//! `stream` command implementation.
//!
//! Per sensor: print identity, reset options, list profiles, open one
//! profile, start a printing handler, show that a second `start` is
//! rejected, wait, then stop and close.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use anyhow::{Context as _, Result};
use control::{reset_to_defaults, StreamSession};
use contracts::{
    frame_callback, Context, DeliveryConfig, DeliveryPolicy, Frame, FrameCallback, FrameHandler,
    ProfileId, RigBlueprint, Sensor, StreamProfile,
};
use device_sim::SimContext;
use observability::StreamStatsAggregator;
use tracing::{debug, info, warn};

use super::{load_rig, print_device_info, print_profiles, print_sensor_name, sensor_selected};
use crate::cli::StreamArgs;
use crate::error::{format_sdk_error, CliError};

/// Execute the `stream` command
pub async fn run_stream(rig: Option<&std::path::Path>, args: &StreamArgs) -> Result<()> {
    let mut blueprint = load_rig(rig)?;
    apply_delivery_override(
        &mut blueprint,
        args.policy.map(DeliveryPolicy::from),
        args.queue_capacity,
    );
    config_loader::ConfigLoader::validate(&blueprint).context("Invalid delivery override")?;

    let context = SimContext::from_blueprint(&blueprint).context("Failed to build context")?;
    let devices = context.query_devices();
    if devices.is_empty() {
        println!("No device detected. Is it plugged in?");
        return Ok(());
    }

    let duration = Duration::from_secs(args.duration);
    let wanted_profile = args.profile.map(ProfileId);
    let mut sensors_visited = 0usize;
    let mut profile_found = false;

    for device in &devices {
        print_device_info(device.as_ref());

        for sensor in device.query_sensors() {
            if !sensor_selected(sensor.as_ref(), args.sensor.as_deref()) {
                continue;
            }
            sensors_visited += 1;
            print_sensor_name(sensor.as_ref());
            reset_options(sensor.as_ref())?;

            let profiles = sensor.stream_profiles();
            print_profiles(&profiles);

            let Some(profile) = select_profile(&profiles, wanted_profile) else {
                debug!(sensor = %sensor.name(), "no profile to open");
                continue;
            };
            profile_found = true;

            if stream_sensor(sensor, profile, duration).await? == Flow::Interrupted {
                warn!("Interrupted, skipping remaining sensors");
                return Ok(());
            }
        }
    }

    if let Some(name) = &args.sensor {
        if sensors_visited == 0 {
            return Err(CliError::sensor_not_found(name.clone()).into());
        }
    }
    if let (Some(id), false) = (args.profile, profile_found) {
        return Err(CliError::ProfileNotFound { id }.into());
    }

    info!(sensors = sensors_visited, "Walkthrough finished");
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Interrupted,
}

/// Apply `--policy` / `--queue-capacity` to the rig and every sensor override
fn apply_delivery_override(
    blueprint: &mut RigBlueprint,
    policy: Option<DeliveryPolicy>,
    queue_capacity: Option<usize>,
) {
    if policy.is_none() && queue_capacity.is_none() {
        return;
    }

    let merge = |base: DeliveryConfig| {
        DeliveryConfig::new(
            queue_capacity.unwrap_or(base.queue_capacity),
            policy.unwrap_or(base.policy),
        )
    };

    let rig_default = blueprint.delivery;
    blueprint.delivery = merge(rig_default);
    for sensor in blueprint.devices.iter_mut().flat_map(|d| d.sensors.iter_mut()) {
        sensor.delivery = Some(merge(sensor.delivery.unwrap_or(rig_default)));
    }
    info!(delivery = ?blueprint.delivery, "Delivery override applied");
}

fn select_profile(profiles: &[StreamProfile], wanted: Option<ProfileId>) -> Option<StreamProfile> {
    match wanted {
        Some(id) => control::profiles::find_by_id(profiles, id).cloned(),
        None => profiles.first().cloned(),
    }
}

/// Write every default; options that are only writable while streaming are
/// expected to be rejected here
/// Write option defaults, failing on any rejection other than `InvalidState`
fn reset_options(sensor: &dyn Sensor) -> Result<()> {
    let name = sensor.name();
    let report = reset_to_defaults(sensor);
    observability::record_option_reset(&name, report.applied.len(), report.rejected.len());

    for rejected in &report.rejected {
        observability::record_option_rejected(&name, rejected.kind, &rejected.error);
        if !rejected.error.is_invalid_state() {
            warn!(
                sensor = %name,
                option = %rejected.kind,
                error = %rejected.error,
                "Option default rejected"
            );
        }
    }
    report.check()?;
    Ok(())
}

async fn stream_sensor(
    sensor: Arc<dyn Sensor>,
    profile: StreamProfile,
    duration: Duration,
) -> Result<Flow> {
    let name = sensor.name();
    let stats = Arc::new(Mutex::new(StreamStatsAggregator::new()));

    let mut session = StreamSession::open(sensor, std::slice::from_ref(&profile))?;
    session.start(printing_handler(stats.clone()))?;

    if let Err(e) = start_again(&mut session) {
        observability::record_sdk_error(&e);
        eprintln!("{}", format_sdk_error(&e));
    }

    let started = Instant::now();
    let flow = tokio::select! {
        _ = tokio::time::sleep(duration) => Flow::Continue,
        _ = shutdown_signal() => Flow::Interrupted,
    };

    session.stop()?;
    session.close()?;
    observability::record_stream_duration(&name, started.elapsed().as_secs_f64());

    let summary = stats.lock().unwrap_or_else(PoisonError::into_inner).summary();
    print!("{}", summary);
    Ok(flow)
}

/// Frame handler printing one line per frame
///
/// Called concurrently from one delivery thread per stream.
fn printing_handler(stats: Arc<Mutex<StreamStatsAggregator>>) -> FrameCallback {
    frame_callback(move |frame: Frame| {
        println!(
            "Frame received #{} with stream type: {}",
            frame.frame_number(),
            frame.stream_type()
        );
        observability::record_frame_received(&frame);
        stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .update(&frame);
    })
}

fn discard_frame(_frame: Frame) {}

/// Named handler type, accepted by `start` like any closure
struct DiscardFrames;

impl FrameHandler for DiscardFrames {
    fn on_frame(&self, _frame: Frame) {}
}

/// Register more handlers on a streaming session
///
/// Each `start` while streaming is rejected with `AlreadyStreaming`; the
/// first failure ends the attempt and the original handler keeps running.
fn start_again(session: &mut StreamSession) -> contracts::Result<()> {
    session.start(frame_callback(discard_frame))?;
    session.start(DiscardFrames.into_callback())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config_loader::ConfigLoader;
    use contracts::{ErrorKind, SensorState};

    fn builtin() -> RigBlueprint {
        ConfigLoader::builtin().unwrap()
    }

    #[test]
    fn test_override_reaches_every_sensor() {
        let mut blueprint = builtin();
        apply_delivery_override(&mut blueprint, Some(DeliveryPolicy::DropNewest), Some(4));

        assert_eq!(blueprint.delivery, DeliveryConfig::new(4, DeliveryPolicy::DropNewest));
        for sensor in blueprint.devices.iter().flat_map(|d| d.sensors.iter()) {
            assert_eq!(
                sensor.delivery,
                Some(DeliveryConfig::new(4, DeliveryPolicy::DropNewest))
            );
        }
    }

    #[test]
    fn test_partial_override_keeps_sensor_capacity() {
        let mut blueprint = builtin();
        apply_delivery_override(&mut blueprint, Some(DeliveryPolicy::Block), None);

        // Motion Module carries its own queue depth in the built-in rig
        let motion = blueprint
            .devices
            .iter()
            .flat_map(|d| d.sensors.iter())
            .find(|s| s.name == "Motion Module")
            .unwrap();
        assert_eq!(
            motion.delivery,
            Some(DeliveryConfig::new(64, DeliveryPolicy::Block))
        );
    }

    #[test]
    fn test_no_override_leaves_rig_untouched() {
        let mut blueprint = builtin();
        apply_delivery_override(&mut blueprint, None, None);
        assert_eq!(blueprint.delivery, builtin().delivery);
    }

    #[test]
    fn test_reset_options_skips_state_rejections() {
        let context = SimContext::from_blueprint(&builtin()).unwrap();
        for sensor in context.devices()[0].sensors() {
            // Stereo Module rejects its streaming-only emitter option while idle
            reset_options(sensor.as_ref()).unwrap();
        }
    }

    #[test]
    fn test_select_profile() {
        let context = SimContext::from_blueprint(&builtin()).unwrap();
        let sensor = context.devices()[0].sensors()[0].clone();
        let profiles = sensor.stream_profiles();

        assert_eq!(select_profile(&profiles, None).as_ref(), profiles.first());
        let last = profiles.last().unwrap().clone();
        assert_eq!(select_profile(&profiles, Some(last.unique_id())), Some(last));
        assert_eq!(select_profile(&profiles, Some(ProfileId(9999))), None);
    }

    #[test]
    fn test_start_again_rejected_first_handler_kept() {
        let context = SimContext::from_blueprint(&builtin()).unwrap();
        let sensor: Arc<dyn Sensor> = context.devices()[0].sensors()[1].clone();
        let profile = sensor.stream_profiles()[0].clone();
        let stats = Arc::new(Mutex::new(StreamStatsAggregator::new()));

        let mut session = StreamSession::open(sensor.clone(), &[profile]).unwrap();
        session.start(printing_handler(stats.clone())).unwrap();

        let err = start_again(&mut session).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyStreaming);
        assert_eq!(sensor.state(), SensorState::Streaming);

        std::thread::sleep(Duration::from_millis(300));
        session.close().unwrap();
        assert!(stats.lock().unwrap().total_frames() > 0);
    }

    #[tokio::test]
    async fn test_stream_sensor_releases() {
        let context = SimContext::from_blueprint(&builtin()).unwrap();
        let sensor: Arc<dyn Sensor> = context.devices()[0].sensors()[1].clone();
        let profile = sensor.stream_profiles()[0].clone();

        let flow = stream_sensor(sensor.clone(), profile, Duration::from_millis(200))
            .await
            .unwrap();
        assert_eq!(flow, Flow::Continue);
        assert_eq!(sensor.state(), SensorState::Closed);
    }
}
