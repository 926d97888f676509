//! # Control
//!
//! Backend-agnostic orchestration over the `contracts` runtime traits.
//!
//! - `options`: option enumeration and reset-to-defaults
//! - `profiles`: profile description and lookup
//! - `session`: scoped streaming guard (stop then close on every exit path)
//! - `report`: serializable enumeration snapshot

pub mod options;
pub mod profiles;
pub mod report;
pub mod session;

pub use options::{list_options, reset_to_defaults, RejectedOption, ResetReport};
pub use report::{ContextReport, DeviceReport, ReportScope, SensorReport};
pub use session::StreamSession;
