//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace: the
//! sensor data model, the runtime traits and the error taxonomy.
//! Business crates depend on this crate only, never the reverse.
//!
//! ## Capability hierarchy
//! `Context -> Device* -> Sensor* -> (Option* | StreamProfile*)`, then
//! `open -> start -> [frames] -> stop -> close` on a sensor.

mod blueprint;
mod error;
mod frame;
mod info;
mod option;
mod sdk;
mod stream;

pub use blueprint::*;
pub use error::*;
pub use frame::Frame;
pub use info::CameraInfo;
pub use option::*;
pub use sdk::{frame_callback, Context, Device, FrameCallback, FrameHandler, Sensor, SensorState};
pub use stream::*;
