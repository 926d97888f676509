//! # Device Sim
//!
//! Simulated sensor runtime implementing the `contracts` traits.
//!
//! Responsibilities:
//! - Build devices, sensors, options and stream profiles from a `RigBlueprint`
//! - Hot-plug (`attach_device` / `detach_device`) on shared `SimHardware`
//! - Exclusive sensor ownership across contexts
//! - Sensor lifecycle state machine (`Closed -> Open -> Streaming -> Open -> Closed`)
//! - One clock thread and one delivery thread per opened stream
//!
//! ## Usage
//!
//! ```ignore
//! use config_loader::ConfigLoader;
//! use contracts::{frame_callback, Context};
//! use device_sim::SimContext;
//!
//! let ctx = SimContext::from_blueprint(&ConfigLoader::builtin()?)?;
//! for device in ctx.query_devices() {
//!     for sensor in device.query_sensors() {
//!         let profiles = sensor.stream_profiles();
//!         sensor.open_profile(&profiles[0])?;
//!         sensor.start(frame_callback(|f| println!("frame #{}", f.number)))?;
//!         sensor.stop()?;
//!         sensor.close()?;
//!     }
//! }
//! ```

mod context;
mod frames;
mod hardware;
mod options;
mod sensor;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use context::{SimContext, SimDevice};
pub use hardware::{DeviceKey, SimHardware};
pub use options::OptionStore;
pub use sensor::SimSensor;

/// Lock ignoring poisoning: the guarded state stays consistent between statements
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
