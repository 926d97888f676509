//! Delivery thread

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use async_channel::Receiver;
use contracts::{Frame, FrameCallback};
use tracing::{debug, warn};

use crate::config::DeliveryMetrics;
use crate::error::{DeliveryError, Result};
use crate::queue::FrameQueue;

/// Thread that drains one `FrameQueue` into a frame handler
///
/// Frames of one stream are delivered in queue order, one at a time.
pub struct DeliveryWorker {
    stream: String,
    active: Arc<AtomicBool>,
    rx: Receiver<Frame>,
    handle: Option<JoinHandle<()>>,
}

impl DeliveryWorker {
    /// Spawn the delivery thread for `queue`
    pub fn spawn(queue: &FrameQueue, callback: FrameCallback) -> Result<Self> {
        let stream = queue.stream().to_string();
        let active = Arc::new(AtomicBool::new(true));
        let rx = queue.receiver();

        let handle = {
            let thread_stream = stream.clone();
            let active = active.clone();
            let rx = rx.clone();
            let metrics = queue.metrics();
            thread::Builder::new()
                .name(format!("delivery-{}", stream.to_lowercase().replace(' ', "-")))
                .spawn(move || run(thread_stream, rx, callback, active, metrics))
                .map_err(|source| DeliveryError::SpawnFailed {
                    stream: stream.clone(),
                    source,
                })?
        };

        debug!(stream = %stream, "delivery worker started");
        Ok(Self {
            stream,
            active,
            rx,
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Stop delivery and wait for the thread to exit
    ///
    /// No frame handler invocation starts after this returns. Called from the
    /// delivery thread itself (a handler stopping its own sensor), the join is
    /// skipped and the thread exits once the handler returns.
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        self.active.store(false, Ordering::Release);
        self.rx.close();

        let Some(handle) = self.handle.take() else {
            return;
        };
        if handle.thread().id() == thread::current().id() {
            debug!(stream = %self.stream, "delivery worker stopped from its own handler");
            return;
        }
        if handle.join().is_err() {
            warn!(stream = %self.stream, "delivery thread terminated abnormally");
        }
        debug!(stream = %self.stream, "delivery worker stopped");
    }
}

impl Drop for DeliveryWorker {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

fn run(
    stream: String,
    rx: Receiver<Frame>,
    callback: FrameCallback,
    active: Arc<AtomicBool>,
    metrics: Arc<DeliveryMetrics>,
) {
    while let Ok(frame) = rx.recv_blocking() {
        if !active.load(Ordering::Acquire) {
            break;
        }
        metrics.update_queue_len(rx.len());

        let number = frame.number;
        match panic::catch_unwind(AssertUnwindSafe(|| callback(frame))) {
            Ok(()) => {
                metrics.record_delivered();
                metrics::counter!(
                    "sensor_control_frames_delivered_total",
                    "stream" => stream.clone()
                )
                .increment(1);
            }
            Err(_) => {
                metrics.record_handler_panic();
                warn!(stream = %stream, frame = number, "frame handler panicked, frame skipped");
            }
        }
    }
}
