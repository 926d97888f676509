//! # Integration Tests
//!
//! Cross-crate scenarios over the simulated runtime.
//!
//! - Lifecycle state machine
//! - Option control and reset-to-defaults
//! - Streaming, concurrent multi-stream delivery, exclusive ownership
//! - Hot-plug snapshots

#[cfg(test)]
pub(crate) mod support {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{frame_callback, FrameCallback, RigBlueprint, Sensor};
    use device_sim::SimContext;

    /// One device, one sensor, one 640x480 @ 30 fps video profile
    pub const SINGLE_VIDEO_RIG: &str = r#"
[[devices]]
name = "Single Stream Camera"
serial_number = "SIM-SINGLE"

[[devices.sensors]]
name = "Video Sensor"

[[devices.sensors.options]]
kind = "exposure"
min = 1.0
max = 10000.0
default = 100.0
step = 1.0

[[devices.sensors.profiles]]
stream = "color"
fps = 30
format = "rgb8"
kind = "video"
width = 640
height = 480
"#;

    pub fn builtin_rig() -> RigBlueprint {
        ConfigLoader::builtin().unwrap()
    }

    pub fn builtin_context() -> SimContext {
        SimContext::from_blueprint(&builtin_rig()).unwrap()
    }

    pub fn single_video_context() -> SimContext {
        let rig = ConfigLoader::load_from_str(SINGLE_VIDEO_RIG, ConfigFormat::Toml).unwrap();
        SimContext::from_blueprint(&rig).unwrap()
    }

    pub fn sensor_named(context: &SimContext, name: &str) -> Arc<dyn Sensor> {
        context
            .devices()
            .iter()
            .flat_map(|d| d.sensors().iter().cloned())
            .find(|s| s.name() == name)
            .map(|s| s as Arc<dyn Sensor>)
            .unwrap()
    }

    /// Handler recording every frame number it sees
    pub fn recording_handler() -> (FrameCallback, Arc<Mutex<Vec<u64>>>) {
        let numbers = Arc::new(Mutex::new(Vec::new()));
        let sink = numbers.clone();
        let callback = frame_callback(move |frame| sink.lock().unwrap().push(frame.number));
        (callback, numbers)
    }

    pub fn counting_handler() -> (FrameCallback, Arc<AtomicU64>) {
        let count = Arc::new(AtomicU64::new(0));
        let counter = count.clone();
        let callback = frame_callback(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (callback, count)
    }

    /// Poll `condition` until it holds or `timeout` passes
    pub fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        condition()
    }
}

#[cfg(test)]
mod lifecycle_tests {
    use contracts::{frame_callback, ErrorKind, Sensor, SensorState};

    use crate::support::*;

    #[test]
    fn test_start_without_open_fails() {
        let context = builtin_context();
        for device in context.devices() {
            for sensor in device.sensors() {
                assert_eq!(sensor.state(), SensorState::Closed);
                let err = sensor.start(frame_callback(|_| {})).unwrap_err();
                assert_eq!(err.kind(), ErrorKind::InvalidState);
                assert_eq!(err.failed_function(), "start");
                assert_eq!(sensor.state(), SensorState::Closed);
            }
        }
    }

    #[test]
    fn test_full_transition_sequence() {
        let context = single_video_context();
        let sensor = sensor_named(&context, "Video Sensor");
        let profile = sensor.stream_profiles()[0].clone();

        let mut states = vec![sensor.state()];
        sensor.open_profile(&profile).unwrap();
        states.push(sensor.state());
        sensor.start(frame_callback(|_| {})).unwrap();
        states.push(sensor.state());

        let err = sensor.close().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(sensor.state(), SensorState::Streaming);

        sensor.stop().unwrap();
        states.push(sensor.state());
        sensor.close().unwrap();
        states.push(sensor.state());

        assert_eq!(
            states,
            vec![
                SensorState::Closed,
                SensorState::Open,
                SensorState::Streaming,
                SensorState::Open,
                SensorState::Closed,
            ]
        );
    }

    #[test]
    fn test_repeated_transitions_rejected() {
        let context = single_video_context();
        let sensor = sensor_named(&context, "Video Sensor");
        let profile = sensor.stream_profiles()[0].clone();

        sensor.open_profile(&profile).unwrap();
        assert_eq!(
            sensor.open_profile(&profile).unwrap_err().kind(),
            ErrorKind::InvalidState
        );
        assert_eq!(sensor.stop().unwrap_err().kind(), ErrorKind::InvalidState);

        sensor.close().unwrap();
        assert_eq!(sensor.close().unwrap_err().kind(), ErrorKind::InvalidState);
        assert_eq!(sensor.state(), SensorState::Closed);
    }

    #[test]
    fn test_profile_of_other_sensor_rejected() {
        let context = builtin_context();
        let stereo = sensor_named(&context, "Stereo Module");
        let rgb = sensor_named(&context, "RGB Camera");

        let foreign = rgb.stream_profiles()[0].clone();
        let err = stereo.open_profile(&foreign).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidProfile);
        assert!(err.failed_args().contains(&format!("#{}", foreign.unique_id())));
        assert_eq!(stereo.state(), SensorState::Closed);
        assert_eq!(rgb.state(), SensorState::Closed);
    }
}

#[cfg(test)]
mod option_tests {
    use control::{list_options, reset_to_defaults};
    use contracts::{frame_callback, ErrorKind, OptionKind, Sensor};

    use crate::support::*;

    fn values(sensor: &dyn Sensor) -> Vec<(OptionKind, f32)> {
        list_options(sensor)
            .into_iter()
            .map(|o| (o.kind, o.value))
            .collect()
    }

    #[test]
    fn test_unsupported_option_leaves_others() {
        let context = builtin_context();
        let motion = sensor_named(&context, "Motion Module");
        let before = values(motion.as_ref());

        for kind in OptionKind::ALL {
            if motion.supports_option(kind) {
                continue;
            }
            assert_eq!(
                motion.get_option(kind).unwrap_err().kind(),
                ErrorKind::CapabilityUnsupported
            );
            assert_eq!(
                motion.set_option(kind, 1.0).unwrap_err().kind(),
                ErrorKind::CapabilityUnsupported
            );
            assert!(motion.option_range(kind).is_none());
            assert!(motion.option_description(kind).is_none());
        }

        assert_eq!(values(motion.as_ref()), before);
    }

    #[test]
    fn test_out_of_range_keeps_value() {
        let context = builtin_context();
        let stereo = sensor_named(&context, "Stereo Module");
        stereo.set_option(OptionKind::LaserPower, 90.0).unwrap();
        let range = stereo.option_range(OptionKind::LaserPower).unwrap();

        for value in [range.min - 1.0, range.max + 1.0, f32::NAN, f32::INFINITY] {
            let err = stereo.set_option(OptionKind::LaserPower, value).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::OutOfRange);
            assert_eq!(stereo.get_option(OptionKind::LaserPower).unwrap(), 90.0);
        }
    }

    #[test]
    fn test_streaming_only_option_window() {
        let context = builtin_context();
        let stereo = sensor_named(&context, "Stereo Module");

        let err = stereo.set_option(OptionKind::EmitterOnOff, 0.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(stereo.get_option(OptionKind::EmitterOnOff).unwrap(), 1.0);

        let profile = stereo.stream_profiles()[0].clone();
        stereo.open_profile(&profile).unwrap();
        stereo.start(frame_callback(|_| {})).unwrap();

        stereo.set_option(OptionKind::EmitterOnOff, 0.0).unwrap();
        assert_eq!(stereo.get_option(OptionKind::EmitterOnOff).unwrap(), 0.0);

        // idle-only options flip the other way
        let err = stereo.set_option(OptionKind::FramesQueueSize, 8.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        stereo.stop().unwrap();
        stereo.close().unwrap();
    }

    #[test]
    fn test_reset_attempts_every_option() {
        let context = builtin_context();
        for device in context.devices() {
            for sensor in device.sensors() {
                let supported = list_options(sensor.as_ref());
                let report = reset_to_defaults(sensor.as_ref());

                assert_eq!(report.attempted(), supported.len());
                assert_eq!(report.unexpected().count(), 0);
                for option in &supported {
                    let value = sensor.get_option(option.kind).unwrap();
                    if report.applied.contains(&option.kind) {
                        assert_eq!(value, option.range.default, "{}", option.kind);
                    } else {
                        assert_eq!(value, option.value, "{}", option.kind);
                    }
                }
            }
        }
    }

    #[test]
    fn test_reset_while_streaming_swaps_rejections() {
        let context = builtin_context();
        let stereo = sensor_named(&context, "Stereo Module");
        let profile = stereo.stream_profiles()[0].clone();
        stereo.open_profile(&profile).unwrap();
        stereo.start(frame_callback(|_| {})).unwrap();

        let report = reset_to_defaults(stereo.as_ref());
        let rejected: Vec<OptionKind> = report.rejected.iter().map(|r| r.kind).collect();
        assert_eq!(rejected, vec![OptionKind::FramesQueueSize]);
        assert!(report.applied.contains(&OptionKind::EmitterOnOff));
        assert_eq!(stereo.get_option(OptionKind::EmitterOnOff).unwrap(), 0.0);

        stereo.stop().unwrap();
        stereo.close().unwrap();
    }
}

#[cfg(test)]
mod streaming_tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    use contracts::{
        frame_callback, ErrorKind, Frame, FrameHandler, PixelFormat, Sensor, SensorState,
        StreamKind,
    };
    use delivery::FrameQueue;

    use crate::support::*;

    #[test]
    fn test_single_video_profile_delivers_then_stops() {
        let context = single_video_context();
        let sensor = sensor_named(&context, "Video Sensor");
        let profile = sensor.stream_profiles()[0].clone();

        let video = profile.as_video();
        assert_eq!((video.width(), video.height(), video.fps()), (640, 480, 30));
        assert_eq!(video.format(), PixelFormat::Rgb8);

        let (callback, numbers) = recording_handler();
        sensor.open_profile(&profile).unwrap();
        sensor.start(callback).unwrap();

        assert!(wait_until(Duration::from_secs(2), || numbers.lock().unwrap().len() >= 3));
        sensor.stop().unwrap();

        let seen = numbers.lock().unwrap().clone();
        assert!(seen.windows(2).all(|w| w[0] < w[1]), "{:?}", seen);

        std::thread::sleep(Duration::from_millis(200));
        assert_eq!(numbers.lock().unwrap().len(), seen.len());
        sensor.close().unwrap();
    }

    #[test]
    fn test_second_start_keeps_first_handler() {
        let context = single_video_context();
        let sensor = sensor_named(&context, "Video Sensor");
        let profile = sensor.stream_profiles()[0].clone();

        let (first, first_count) = counting_handler();
        let (second, second_count) = counting_handler();
        sensor.open_profile(&profile).unwrap();
        sensor.start(first).unwrap();

        let err = sensor.start(second).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyStreaming);
        assert_eq!(sensor.state(), SensorState::Streaming);

        let at_rejection = first_count.load(Ordering::SeqCst);
        assert!(wait_until(Duration::from_secs(2), || {
            first_count.load(Ordering::SeqCst) > at_rejection + 2
        }));
        assert_eq!(second_count.load(Ordering::SeqCst), 0);

        sensor.stop().unwrap();
        sensor.close().unwrap();
    }

    #[test]
    fn test_sequence_numbers_continue_across_restart() {
        let context = single_video_context();
        let sensor = sensor_named(&context, "Video Sensor");
        let profile = sensor.stream_profiles()[0].clone();
        sensor.open_profile(&profile).unwrap();

        let (callback, numbers) = recording_handler();
        sensor.start(callback.clone()).unwrap();
        assert!(wait_until(Duration::from_secs(2), || !numbers.lock().unwrap().is_empty()));
        sensor.stop().unwrap();
        let last_before = *numbers.lock().unwrap().last().unwrap();

        sensor.start(callback).unwrap();
        assert!(wait_until(Duration::from_secs(2), || {
            numbers.lock().unwrap().last().copied() > Some(last_before)
        }));
        sensor.stop().unwrap();
        sensor.close().unwrap();

        let seen = numbers.lock().unwrap().clone();
        assert!(seen.windows(2).all(|w| w[0] < w[1]), "{:?}", seen);
        assert_eq!(seen[0], 1);
    }

    /// Depth, Infrared 1 and Infrared 2 of the stereo module deliver from
    /// distinct threads and overlap in the handler
    #[test]
    fn test_concurrent_multi_stream_delivery() {
        let context = builtin_context();
        let stereo = sensor_named(&context, "Stereo Module");
        let profiles = stereo.stream_profiles();
        let selected = vec![
            control::profiles::find(&profiles, StreamKind::Depth, 0).unwrap().clone(),
            control::profiles::find(&profiles, StreamKind::Infrared, 1).unwrap().clone(),
            control::profiles::find(&profiles, StreamKind::Infrared, 2).unwrap().clone(),
        ];

        let threads: Arc<Mutex<HashMap<String, HashSet<String>>>> = Arc::default();
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_in_flight = Arc::new(AtomicUsize::new(0));
        let callback = {
            let threads = threads.clone();
            let in_flight = in_flight.clone();
            let max_in_flight = max_in_flight.clone();
            frame_callback(move |frame: Frame| {
                let current = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max_in_flight.fetch_max(current, Ordering::SeqCst);

                let thread = std::thread::current().name().unwrap_or("").to_string();
                threads
                    .lock()
                    .unwrap()
                    .entry(frame.profile.stream_name().to_string())
                    .or_default()
                    .insert(thread);

                // hold the frame until the other streams are inside the handler too
                let deadline = Instant::now() + Duration::from_millis(500);
                while in_flight.load(Ordering::SeqCst) < 3 && Instant::now() < deadline {
                    std::thread::sleep(Duration::from_millis(1));
                }
                in_flight.fetch_sub(1, Ordering::SeqCst);
            })
        };

        stereo.open(&selected).unwrap();
        stereo.start(callback).unwrap();
        assert!(wait_until(Duration::from_secs(3), || {
            threads.lock().unwrap().len() == 3
        }));
        stereo.stop().unwrap();
        stereo.close().unwrap();

        let threads = threads.lock().unwrap();
        let caller = std::thread::current().name().map(str::to_string);
        let mut all: HashSet<&String> = HashSet::new();
        for (stream, names) in threads.iter() {
            assert_eq!(names.len(), 1, "{} delivered from {:?}", stream, names);
            all.extend(names.iter());
        }
        assert_eq!(all.len(), 3);
        assert!(caller.map_or(true, |c| !all.contains(&c)));
        assert_eq!(max_in_flight.load(Ordering::SeqCst), 3);
    }

    struct CountingHandler {
        frames: Arc<AtomicU64>,
    }

    impl FrameHandler for CountingHandler {
        fn on_frame(&self, _frame: Frame) {
            self.frames.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_named_handler_type() {
        let context = single_video_context();
        let sensor = sensor_named(&context, "Video Sensor");
        let profile = sensor.stream_profiles()[0].clone();
        let frames = Arc::new(AtomicU64::new(0));

        sensor.open_profile(&profile).unwrap();
        sensor
            .start(
                CountingHandler {
                    frames: frames.clone(),
                }
                .into_callback(),
            )
            .unwrap();
        assert!(wait_until(Duration::from_secs(2), || frames.load(Ordering::SeqCst) > 0));
        sensor.stop().unwrap();
        sensor.close().unwrap();
    }

    #[tokio::test]
    async fn test_polling_handoff_through_queue() {
        let context = builtin_context();
        let motion = sensor_named(&context, "Motion Module");
        let profiles = motion.stream_profiles();
        let gyro = control::profiles::find(&profiles, StreamKind::Gyro, 0)
            .unwrap()
            .clone();

        let queue = Arc::new(FrameQueue::new("polled", Default::default()));
        motion.open_profile(&gyro).unwrap();
        motion.start(queue.handler()).unwrap();

        let mut last = 0;
        for _ in 0..5 {
            let frame = tokio::time::timeout(Duration::from_secs(2), queue.recv())
                .await
                .expect("frame within timeout")
                .unwrap();
            assert_eq!(frame.stream_type(), StreamKind::Gyro);
            assert_eq!(frame.data_size(), 12);
            assert!(frame.number > last);
            last = frame.number;
        }

        motion.stop().unwrap();
        motion.close().unwrap();
    }

    #[test]
    fn test_stream_stats_from_live_frames() {
        let context = single_video_context();
        let sensor = sensor_named(&context, "Video Sensor");
        let profile = sensor.stream_profiles()[0].clone();
        let stats = Arc::new(Mutex::new(observability::StreamStatsAggregator::new()));

        let callback = {
            let stats = stats.clone();
            frame_callback(move |frame: Frame| stats.lock().unwrap().update(&frame))
        };
        sensor.open_profile(&profile).unwrap();
        sensor.start(callback).unwrap();
        assert!(wait_until(Duration::from_secs(2), || {
            stats.lock().unwrap().total_frames() >= 5
        }));
        sensor.stop().unwrap();
        sensor.close().unwrap();

        let stats = stats.lock().unwrap();
        let color = stats.stream(profile.stream_name()).unwrap();
        assert_eq!(color.out_of_order, 0);
        assert_eq!(color.first_number, Some(1));
    }
}

#[cfg(test)]
mod ownership_tests {
    use std::sync::Arc;

    use contracts::{frame_callback, ErrorKind, Sensor, SensorState};
    use control::StreamSession;
    use device_sim::{SimContext, SimHardware};

    use crate::support::*;

    fn two_contexts() -> (SimContext, SimContext) {
        let hardware = SimHardware::from_blueprint(&builtin_rig()).unwrap();
        (SimContext::new(hardware.clone()), SimContext::new(hardware))
    }

    #[test]
    fn test_second_owner_gets_device_busy() {
        let (first_ctx, second_ctx) = two_contexts();
        let first = sensor_named(&first_ctx, "RGB Camera");
        let second = sensor_named(&second_ctx, "RGB Camera");
        let profile = first.stream_profiles()[0].clone();

        first.open_profile(&profile).unwrap();
        let err = second.open_profile(&profile).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeviceBusy);
        assert_eq!(second.state(), SensorState::Closed);

        // the losing handle cannot start either
        let err = second.start(frame_callback(|_| {})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        first.close().unwrap();
        second.open_profile(&profile).unwrap();
        second.close().unwrap();
    }

    #[test]
    fn test_session_drop_releases_ownership() {
        let (first_ctx, second_ctx) = two_contexts();
        let first = sensor_named(&first_ctx, "Stereo Module");
        let second = sensor_named(&second_ctx, "Stereo Module");
        let profile = first.stream_profiles()[0].clone();

        {
            let mut session = StreamSession::open(first.clone(), &[profile.clone()]).unwrap();
            session.start(frame_callback(|_| {})).unwrap();
            assert_eq!(
                second.open_profile(&profile).unwrap_err().kind(),
                ErrorKind::DeviceBusy
            );
        }

        assert_eq!(first.state(), SensorState::Closed);
        second.open_profile(&profile).unwrap();
        second.close().unwrap();
    }

    #[test]
    fn test_sensors_are_independent() {
        let context = builtin_context();
        let stereo = sensor_named(&context, "Stereo Module");
        let rgb: Arc<dyn Sensor> = sensor_named(&context, "RGB Camera");

        stereo.open_profile(&stereo.stream_profiles()[0]).unwrap();
        rgb.open_profile(&rgb.stream_profiles()[0]).unwrap();
        assert_eq!(stereo.state(), SensorState::Open);
        assert_eq!(rgb.state(), SensorState::Open);
        stereo.close().unwrap();
        rgb.close().unwrap();
    }
}

#[cfg(test)]
mod enumeration_tests {
    use std::collections::HashSet;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use contracts::{CameraInfo, Context, ErrorKind, ProfileKind};
    use control::{ContextReport, ReportScope};
    use device_sim::{SimContext, SimHardware};

    use crate::support::*;

    #[test]
    fn test_unique_ids_across_context() {
        let context = builtin_context();
        let mut ids = HashSet::new();
        for device in context.query_devices() {
            for sensor in device.query_sensors() {
                for profile in sensor.stream_profiles() {
                    assert!(ids.insert(profile.unique_id()), "{}", profile.unique_id());
                }
            }
        }
        assert!(ids.len() >= 9);
    }

    #[test]
    fn test_profile_narrowing() {
        let context = builtin_context();
        for device in context.query_devices() {
            for sensor in device.query_sensors() {
                for profile in sensor.stream_profiles() {
                    match profile.kind() {
                        ProfileKind::Video => {
                            assert!(profile.video().is_some());
                            assert!(profile.as_video().width() > 0);
                        }
                        ProfileKind::Motion => {
                            assert!(profile.video().is_none());
                            assert_eq!(profile.as_motion().fps(), profile.fps());
                        }
                        ProfileKind::Base => {
                            assert!(profile.video().is_none() && profile.motion().is_none());
                            assert!(control::profiles::describe_extension(&profile).is_none());
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_absent_info_is_none() {
        let rig = config_loader::ConfigLoader::load_from_str(
            r#"{"devices": [{"name": "Anonymous", "sensors": [{"name": "Only"}]}]}"#,
            config_loader::ConfigFormat::Json,
        )
        .unwrap();
        let context = SimContext::from_blueprint(&rig).unwrap();
        let devices = context.query_devices();

        assert_eq!(devices[0].info(CameraInfo::Name).as_deref(), Some("Anonymous"));
        assert_eq!(devices[0].info(CameraInfo::SerialNumber), None);
        assert!(!devices[0].supports_info(CameraInfo::FirmwareVersion));
        assert!(devices[0].query_sensors()[0].stream_profiles().is_empty());
    }

    #[test]
    fn test_hot_plug_snapshots() {
        let hardware = SimHardware::from_blueprint(&builtin_rig()).unwrap();
        let context = SimContext::new(hardware.clone());
        assert_eq!(context.query_devices().len(), 1);

        let extra = single_video_rig_device();
        let key = hardware.attach_device(&extra).unwrap();
        let devices = context.query_devices();
        assert_eq!(devices.len(), 2);
        assert_eq!(
            devices[1].info(CameraInfo::SerialNumber).as_deref(),
            Some("SIM-SINGLE")
        );

        let sensor = sensor_named(&context, "Video Sensor");
        let (callback, count) = counting_handler();
        sensor.open_profile(&sensor.stream_profiles()[0]).unwrap();
        sensor.start(callback).unwrap();
        assert!(wait_until(Duration::from_secs(2), || count.load(Ordering::SeqCst) > 0));

        assert!(hardware.detach_device(key));
        assert!(!hardware.detach_device(key));
        assert_eq!(context.query_devices().len(), 1);

        // no frames from an unplugged device
        std::thread::sleep(Duration::from_millis(100));
        let settled = count.load(Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(200));
        assert_eq!(count.load(Ordering::SeqCst), settled);

        sensor.stop().unwrap();
        sensor.close().unwrap();
        let err = sensor.open_profile(&sensor.stream_profiles()[0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    fn single_video_rig_device() -> contracts::DeviceConfig {
        config_loader::ConfigLoader::load_from_str(SINGLE_VIDEO_RIG, config_loader::ConfigFormat::Toml)
            .unwrap()
            .devices
            .remove(0)
    }

    #[test]
    fn test_report_matches_traits() {
        let context = builtin_context();
        let report = ContextReport::capture(&context, ReportScope::full());
        assert_eq!(report.sensor_count(), 3);

        let device = &report.devices[0];
        assert_eq!(
            device.info(CameraInfo::Name),
            context.query_devices()[0].info(CameraInfo::Name).as_deref()
        );

        let json = serde_json::to_value(&report).unwrap();
        let sensors = json["devices"][0]["sensors"].as_array().unwrap();
        assert_eq!(sensors[0]["name"], "Stereo Module");
        assert_eq!(sensors[0]["state"], "closed");
        assert!(!sensors[0]["profiles"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_sensor_info_name() {
        let context = builtin_context();
        let names: Vec<String> = context
            .query_devices()
            .iter()
            .flat_map(|d| d.query_sensors())
            .map(|s| s.name())
            .collect();
        assert_eq!(names, vec!["Stereo Module", "RGB Camera", "Motion Module"]);
    }
}
