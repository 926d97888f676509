//! # Frame Delivery
//!
//! Moves frames from a producer (the simulated hardware clock) to a user
//! frame handler on a dedicated delivery thread.
//!
//! Responsibilities:
//! - Bounded per-stream queue with an overflow policy (`DeliveryPolicy`)
//! - Delivery thread that invokes the `FrameCallback` in order
//! - Drop / delivery accounting (atomics + `metrics` counters)
//!
//! ## Usage
//!
//! ```ignore
//! use delivery::{DeliveryWorker, FrameQueue};
//! use contracts::{frame_callback, DeliveryConfig};
//!
//! let queue = FrameQueue::new("Depth", DeliveryConfig::default());
//! let worker = DeliveryWorker::spawn(&queue, frame_callback(|f| println!("{}", f.number)))?;
//!
//! queue.push(frame);      // from the producer thread
//! worker.shutdown();      // no callback runs after this returns
//! ```

mod config;
mod error;
mod queue;
mod worker;

pub use config::{DeliveryMetrics, MetricsSnapshot};
pub use contracts::{DeliveryConfig, DeliveryPolicy};
pub use error::{DeliveryError, Result};
pub use queue::{FrameQueue, PushOutcome};
pub use worker::DeliveryWorker;
