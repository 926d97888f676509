//! Simulated sensor handle: lifecycle state machine and stream threads

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use contracts::{
    CameraInfo, ErrorKind, Frame, FrameCallback, OptionKind, OptionMutability, OptionRange,
    Result, SdkError, Sensor, SensorState, StreamProfile,
};
use delivery::{DeliveryWorker, FrameQueue, MetricsSnapshot, PushOutcome};
use tracing::{debug, error, info, instrument, trace, warn};

use crate::frames::PayloadSource;
use crate::hardware::{OwnerId, SensorUnit, SimHardware};
use crate::lock;

/// One owner's handle to a physical sensor
///
/// Handles of the same context are shared; handles from different contexts
/// contend for the sensor and the second `open` fails with `DeviceBusy`.
/// Dropping a handle that is still open stops and closes it.
pub struct SimSensor {
    owner_id: OwnerId,
    unit: Arc<SensorUnit>,
    hardware: Arc<SimHardware>,
    inner: Mutex<Inner>,
}

struct Inner {
    state: SensorState,
    profiles: Vec<Arc<StreamProfile>>,
    streams: Vec<StreamRunner>,
}

impl SimSensor {
    pub(crate) fn new(unit: Arc<SensorUnit>, hardware: Arc<SimHardware>) -> Self {
        Self {
            owner_id: hardware.allocate_owner_id(),
            unit,
            hardware,
            inner: Mutex::new(Inner {
                state: SensorState::Closed,
                profiles: Vec::new(),
                streams: Vec::new(),
            }),
        }
    }

    /// Profiles currently opened by this handle
    pub fn active_profiles(&self) -> Vec<StreamProfile> {
        lock(&self.inner)
            .profiles
            .iter()
            .map(|p| p.as_ref().clone())
            .collect()
    }

    /// Delivery counters of the running streams, summed
    pub fn delivery_stats(&self) -> MetricsSnapshot {
        lock(&self.inner)
            .streams
            .iter()
            .map(|s| s.queue.metrics().snapshot())
            .fold(MetricsSnapshot::default(), MetricsSnapshot::merge)
    }

    fn sensor_args(&self) -> String {
        format!("sensor: {}", self.unit.name)
    }

    fn ensure_attached(&self, function: &'static str) -> Result<()> {
        if self.unit.is_attached() {
            Ok(())
        } else {
            Err(SdkError::invalid_state(
                function,
                self.sensor_args(),
                "device has been disconnected",
            ))
        }
    }

    /// Map requested profiles onto this sensor's own descriptors
    fn resolve_profiles(&self, requested: &[StreamProfile]) -> Result<Vec<Arc<StreamProfile>>> {
        let args = || {
            let ids: Vec<String> = requested.iter().map(|p| format!("#{}", p.unique_id())).collect();
            format!("sensor: {}, profiles: [{}]", self.unit.name, ids.join(", "))
        };
        let invalid = |message: String| SdkError::new(ErrorKind::InvalidProfile, "open", args(), message);

        if requested.is_empty() {
            return Err(invalid("no stream profile given".to_string()));
        }

        let mut ids = HashSet::new();
        let mut targets = HashSet::new();
        let mut resolved = Vec::with_capacity(requested.len());
        for profile in requested {
            let own = self
                .unit
                .find_profile(profile.unique_id())
                .filter(|own| {
                    own.stream_type() == profile.stream_type() && own.format() == profile.format()
                })
                .ok_or_else(|| {
                    invalid(format!(
                        "profile #{} does not belong to sensor {}",
                        profile.unique_id(),
                        self.unit.name
                    ))
                })?;
            if !ids.insert(own.unique_id()) {
                return Err(invalid(format!("profile #{} requested twice", own.unique_id())));
            }
            if !targets.insert((own.stream_type(), own.stream_index())) {
                return Err(invalid(format!(
                    "more than one profile requested for stream {}",
                    own.stream_name()
                )));
            }
            resolved.push(own.clone());
        }
        Ok(resolved)
    }

    fn shutdown_streams(&self, streams: Vec<StreamRunner>) {
        for stream in streams {
            stream.shutdown();
        }
    }
}

impl Sensor for SimSensor {
    fn info(&self, info: CameraInfo) -> Option<String> {
        match info {
            CameraInfo::Name => Some(self.unit.name.clone()),
            other => self.unit.device_identity.get(&other).cloned(),
        }
    }

    fn supports_option(&self, option: OptionKind) -> bool {
        lock(&self.unit.options).supports(option)
    }

    fn option_description(&self, option: OptionKind) -> Option<String> {
        lock(&self.unit.options).description(option)
    }

    fn option_range(&self, option: OptionKind) -> Option<OptionRange> {
        lock(&self.unit.options).range(option)
    }

    fn option_mutability(&self, option: OptionKind) -> Option<OptionMutability> {
        lock(&self.unit.options).mutability(option)
    }

    fn get_option(&self, option: OptionKind) -> Result<f32> {
        lock(&self.unit.options).get(option)
    }

    fn set_option(&self, option: OptionKind, value: f32) -> Result<()> {
        let streaming = self.unit.streaming.load(Ordering::Acquire);
        let result = lock(&self.unit.options).set(option, value, streaming);
        match &result {
            Ok(()) => debug!(sensor = %self.unit.name, option = %option, value, "option set"),
            Err(e) => {
                debug!(sensor = %self.unit.name, option = %option, value, error = %e, "option write rejected");
                metrics::counter!(
                    "sensor_control_option_writes_rejected_total",
                    "option" => option.label(),
                    "reason" => e.kind().as_str()
                )
                .increment(1);
            }
        }
        result
    }

    fn stream_profiles(&self) -> Vec<StreamProfile> {
        self.unit
            .profiles
            .iter()
            .map(|p| p.as_ref().clone())
            .collect()
    }

    #[instrument(
        name = "sim_sensor_open",
        skip(self, profiles),
        fields(sensor = %self.unit.name, profiles = profiles.len())
    )]
    fn open(&self, profiles: &[StreamProfile]) -> Result<()> {
        let mut inner = lock(&self.inner);
        if inner.state != SensorState::Closed {
            return Err(SdkError::invalid_state(
                "open",
                self.sensor_args(),
                format!("sensor is already {}", inner.state),
            ));
        }
        self.ensure_attached("open")?;
        let resolved = self.resolve_profiles(profiles)?;

        if self.unit.acquire(self.owner_id).is_err() {
            return Err(SdkError::new(
                ErrorKind::DeviceBusy,
                "open",
                self.sensor_args(),
                "sensor is held open by another owner",
            ));
        }

        inner.profiles = resolved;
        inner.state = SensorState::Open;
        info!("sensor opened");
        Ok(())
    }

    #[instrument(name = "sim_sensor_start", skip(self, callback), fields(sensor = %self.unit.name))]
    fn start(&self, callback: FrameCallback) -> Result<()> {
        let mut inner = lock(&self.inner);
        match inner.state {
            SensorState::Open => {}
            SensorState::Streaming => {
                return Err(SdkError::new(
                    ErrorKind::AlreadyStreaming,
                    "start",
                    self.sensor_args(),
                    "sensor is already streaming, stop it before registering another handler",
                ));
            }
            SensorState::Closed => {
                return Err(SdkError::invalid_state(
                    "start",
                    self.sensor_args(),
                    "sensor is not open",
                ));
            }
        }
        self.ensure_attached("start")?;

        let mut streams = Vec::with_capacity(inner.profiles.len());
        let mut failure = None;
        for profile in &inner.profiles {
            match StreamRunner::spawn(&self.unit, &self.hardware, profile.clone(), callback.clone()) {
                Ok(runner) => streams.push(runner),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        if let Some(message) = failure {
            drop(inner);
            self.shutdown_streams(streams);
            return Err(SdkError::invalid_state("start", self.sensor_args(), message));
        }

        let count = streams.len();
        inner.streams = streams;
        inner.state = SensorState::Streaming;
        self.unit.streaming.store(true, Ordering::Release);
        metrics::gauge!("sensor_control_streaming_sensors").increment(1.0);
        info!(streams = count, "streaming started");
        Ok(())
    }

    #[instrument(name = "sim_sensor_stop", skip(self), fields(sensor = %self.unit.name))]
    fn stop(&self) -> Result<()> {
        let streams = {
            let mut inner = lock(&self.inner);
            if inner.state != SensorState::Streaming {
                return Err(SdkError::invalid_state(
                    "stop",
                    self.sensor_args(),
                    format!("sensor is {}, not streaming", inner.state),
                ));
            }
            inner.state = SensorState::Open;
            self.unit.streaming.store(false, Ordering::Release);
            std::mem::take(&mut inner.streams)
        };

        // joined outside the lock: handlers may query this sensor
        self.shutdown_streams(streams);
        metrics::gauge!("sensor_control_streaming_sensors").decrement(1.0);
        info!("streaming stopped");
        Ok(())
    }

    #[instrument(name = "sim_sensor_close", skip(self), fields(sensor = %self.unit.name))]
    fn close(&self) -> Result<()> {
        let mut inner = lock(&self.inner);
        match inner.state {
            SensorState::Open => {}
            SensorState::Streaming => {
                return Err(SdkError::invalid_state(
                    "close",
                    self.sensor_args(),
                    "sensor is streaming, stop it first",
                ));
            }
            SensorState::Closed => {
                return Err(SdkError::invalid_state(
                    "close",
                    self.sensor_args(),
                    "sensor is not open",
                ));
            }
        }

        self.unit.release(self.owner_id);
        inner.profiles.clear();
        inner.state = SensorState::Closed;
        info!("sensor closed");
        Ok(())
    }

    fn state(&self) -> SensorState {
        lock(&self.inner).state
    }
}

impl Drop for SimSensor {
    fn drop(&mut self) {
        if self.state() == SensorState::Streaming {
            if let Err(e) = self.stop() {
                warn!(sensor = %self.unit.name, error = %e, "stop on release failed");
            }
        }
        if self.state() == SensorState::Open {
            if let Err(e) = self.close() {
                error!(sensor = %self.unit.name, error = %e, "close on release failed");
            }
        }
    }
}

/// Clock thread plus delivery worker of one opened profile
struct StreamRunner {
    running: Arc<AtomicBool>,
    producer: JoinHandle<()>,
    worker: DeliveryWorker,
    queue: Arc<FrameQueue>,
}

impl StreamRunner {
    fn spawn(
        unit: &Arc<SensorUnit>,
        hardware: &Arc<SimHardware>,
        profile: Arc<StreamProfile>,
        callback: FrameCallback,
    ) -> std::result::Result<Self, String> {
        let queue = Arc::new(FrameQueue::new(profile.stream_name(), unit.delivery));
        let worker = DeliveryWorker::spawn(&queue, callback).map_err(|e| e.to_string())?;
        let running = Arc::new(AtomicBool::new(true));

        let producer = {
            let unit = unit.clone();
            let hardware = hardware.clone();
            let queue = queue.clone();
            let running = running.clone();
            thread::Builder::new()
                .name(format!("clock-{}", profile.unique_id()))
                .spawn(move || produce(unit, hardware, profile, queue, running))
                .map_err(|e| format!("failed to spawn clock thread: {e}"))?
        };

        Ok(Self {
            running,
            producer,
            worker,
            queue,
        })
    }

    /// Stop the clock, then the delivery worker
    fn shutdown(self) {
        self.running.store(false, Ordering::Release);
        self.producer.thread().unpark();
        self.worker.shutdown();
        self.queue.close();
        if self.producer.join().is_err() {
            error!(stream = %self.queue.stream(), "clock thread terminated abnormally");
        }
    }
}

/// Clock loop: synthesize one frame per period until stopped or detached
fn produce(
    unit: Arc<SensorUnit>,
    hardware: Arc<SimHardware>,
    profile: Arc<StreamProfile>,
    queue: Arc<FrameQueue>,
    running: Arc<AtomicBool>,
) {
    let period = Duration::from_secs_f64(1.0 / f64::from(profile.fps().max(1)));
    let source = PayloadSource::for_profile(&profile);
    let mut next_tick = Instant::now() + period;

    debug!(stream = %profile.stream_name(), fps = profile.fps(), "clock started");

    while running.load(Ordering::Acquire) && unit.is_attached() {
        let now = Instant::now();
        if now < next_tick {
            thread::park_timeout(next_tick - now);
            continue;
        }
        next_tick = (next_tick + period).max(now);

        let number = unit.next_frame_number(profile.unique_id());
        let frame = Frame {
            number,
            timestamp_ms: hardware.timestamp_ms(),
            profile: profile.clone(),
            data: source.payload(number),
        };

        match queue.push(frame) {
            PushOutcome::Closed => break,
            outcome if outcome.is_drop() => {
                warn!(stream = %profile.stream_name(), frame = number, ?outcome, "frame dropped");
            }
            _ => trace!(stream = %profile.stream_name(), frame = number, "frame produced"),
        }
    }

    debug!(stream = %profile.stream_name(), "clock stopped");
}
