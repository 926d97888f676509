//! Sensor runtime traits
//!
//! The capability hierarchy consumed by orchestration code:
//! `Context -> Device* -> Sensor* -> (options | stream profiles)`.
//! A simulated runtime and any real SDK binding implement the same traits.
//!
//! # Example
//!
//! ```ignore
//! for device in context.query_devices() {
//!     for sensor in device.query_sensors() {
//!         let profiles = sensor.stream_profiles();
//!         sensor.open(&profiles[..1])?;
//!         sensor.start(frame_callback(|frame| println!("#{}", frame.number)))?;
//!         // ...
//!         sensor.stop()?;
//!         sensor.close()?;
//!     }
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::{CameraInfo, Frame, OptionKind, OptionMutability, OptionRange, Result, StreamProfile};

/// Frame callback type
///
/// Invoked once per frame from a delivery thread owned by the runtime. A sensor
/// with several streams calls it concurrently from one thread per stream, so it
/// must be reentrant and must not block indefinitely.
pub type FrameCallback = Arc<dyn Fn(Frame) + Send + Sync>;

/// Wrap any closure or function item as a `FrameCallback`
pub fn frame_callback<F>(f: F) -> FrameCallback
where
    F: Fn(Frame) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Named frame handler type
pub trait FrameHandler: Send + Sync + 'static {
    /// Handle one frame
    fn on_frame(&self, frame: Frame);

    /// Convert into a shareable callback
    fn into_callback(self) -> FrameCallback
    where
        Self: Sized,
    {
        let handler = Arc::new(self);
        Arc::new(move |frame| handler.on_frame(frame))
    }
}

/// Sensor lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorState {
    Closed,
    Open,
    Streaming,
}

impl fmt::Display for SensorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::Streaming => "streaming",
        };
        f.write_str(name)
    }
}

/// Platform entry point: enumerates attached devices
pub trait Context: Send + Sync {
    /// Point-in-time snapshot of attached devices
    ///
    /// Repeated calls may differ when hardware is attached or removed.
    fn query_devices(&self) -> Vec<Arc<dyn Device>>;
}

/// One physical unit
pub trait Device: Send + Sync {
    /// Identity attribute, `None` when unsupported
    fn info(&self, info: CameraInfo) -> Option<String>;

    /// Whether the attribute is reported
    fn supports_info(&self, info: CameraInfo) -> bool {
        self.info(info).is_some()
    }

    /// Sensors of this device
    fn query_sensors(&self) -> Vec<Arc<dyn Sensor>>;
}

/// Independently controllable data source
///
/// Queries (`info`, `supports_option`, `option_*`, `stream_profiles`, `state`)
/// never fail. Mutating calls return `SdkError` and leave the sensor unchanged
/// on failure.
pub trait Sensor: Send + Sync {
    /// Identity attribute, `None` when unsupported
    fn info(&self, info: CameraInfo) -> Option<String>;

    /// Whether the attribute is reported
    fn supports_info(&self, info: CameraInfo) -> bool {
        self.info(info).is_some()
    }

    /// Sensor name, falls back to `"Unknown Sensor"`
    fn name(&self) -> String {
        self.info(CameraInfo::Name)
            .unwrap_or_else(|| "Unknown Sensor".to_string())
    }

    /// Whether the option exists on this sensor
    fn supports_option(&self, option: OptionKind) -> bool;

    /// Description of a supported option
    fn option_description(&self, option: OptionKind) -> Option<String>;

    /// Range of a supported option
    fn option_range(&self, option: OptionKind) -> Option<OptionRange>;

    /// Write window of a supported option
    fn option_mutability(&self, option: OptionKind) -> Option<OptionMutability>;

    /// Current value
    ///
    /// Fails with `CapabilityUnsupported` when the option does not exist.
    fn get_option(&self, option: OptionKind) -> Result<f32>;

    /// Commit a new value
    ///
    /// Fails with `CapabilityUnsupported`, `OutOfRange` or `InvalidState`;
    /// the previous value is kept on failure.
    fn set_option(&self, option: OptionKind, value: f32) -> Result<()>;

    /// Profiles this sensor can stream
    fn stream_profiles(&self) -> Vec<StreamProfile>;

    /// Acquire exclusive access for the given profiles (Closed -> Open)
    fn open(&self, profiles: &[StreamProfile]) -> Result<()>;

    /// Single-profile convenience for `open`
    fn open_profile(&self, profile: &StreamProfile) -> Result<()> {
        self.open(std::slice::from_ref(profile))
    }

    /// Register the frame handler and begin delivery (Open -> Streaming)
    fn start(&self, callback: FrameCallback) -> Result<()>;

    /// Stop delivery (Streaming -> Open)
    ///
    /// After return no further frames are delivered.
    fn stop(&self) -> Result<()>;

    /// Release exclusive access (Open -> Closed)
    fn close(&self) -> Result<()>;

    /// Current lifecycle state of this handle
    fn state(&self) -> SensorState;
}
