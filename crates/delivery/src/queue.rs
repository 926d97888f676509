//! Bounded frame queue with overflow policy

use std::sync::Arc;

use async_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use contracts::{frame_callback, DeliveryConfig, DeliveryPolicy, Frame, FrameCallback};
use tracing::trace;

use crate::config::DeliveryMetrics;
use crate::error::{DeliveryError, Result};

/// Result of offering a frame to the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Frame queued, nothing lost
    Queued,
    /// Frame queued, the oldest queued frame was evicted
    DroppedOldest,
    /// Queue full, the offered frame was discarded
    DroppedNewest,
    /// Queue closed, the offered frame was discarded
    Closed,
}

impl PushOutcome {
    /// Whether a frame was lost by this push
    pub fn is_drop(&self) -> bool {
        matches!(self, Self::DroppedOldest | Self::DroppedNewest)
    }
}

/// Bounded single-stream frame queue
///
/// The producer side never blocks except under `DeliveryPolicy::Block`.
pub struct FrameQueue {
    stream: String,
    config: DeliveryConfig,
    tx: Sender<Frame>,
    rx: Receiver<Frame>,
    metrics: Arc<DeliveryMetrics>,
}

impl FrameQueue {
    /// Create a queue for one stream
    ///
    /// A zero capacity is raised to one.
    pub fn new(stream: impl Into<String>, config: DeliveryConfig) -> Self {
        let capacity = config.queue_capacity.max(1);
        let (tx, rx) = bounded(capacity);
        Self {
            stream: stream.into(),
            config: DeliveryConfig::new(capacity, config.policy),
            tx,
            rx,
            metrics: Arc::new(DeliveryMetrics::new()),
        }
    }

    /// Offer a frame, applying the overflow policy when full
    pub fn push(&self, frame: Frame) -> PushOutcome {
        self.metrics.record_produced();

        let outcome = match self.config.policy {
            DeliveryPolicy::DropOldest => match self.tx.force_send(frame) {
                Ok(None) => PushOutcome::Queued,
                Ok(Some(evicted)) => {
                    trace!(stream = %self.stream, evicted = evicted.number, "frame dropped (oldest)");
                    PushOutcome::DroppedOldest
                }
                Err(_) => PushOutcome::Closed,
            },
            DeliveryPolicy::DropNewest => match self.tx.try_send(frame) {
                Ok(()) => PushOutcome::Queued,
                Err(TrySendError::Full(dropped)) => {
                    trace!(stream = %self.stream, dropped = dropped.number, "frame dropped (newest)");
                    PushOutcome::DroppedNewest
                }
                Err(TrySendError::Closed(_)) => PushOutcome::Closed,
            },
            DeliveryPolicy::Block => match self.tx.send_blocking(frame) {
                Ok(()) => PushOutcome::Queued,
                Err(_) => PushOutcome::Closed,
            },
        };

        if outcome.is_drop() {
            self.metrics.record_dropped();
            metrics::counter!(
                "sensor_control_frames_dropped_total",
                "stream" => self.stream.clone()
            )
            .increment(1);
        }
        self.metrics.update_queue_len(self.tx.len());
        outcome
    }

    /// Frame handler that feeds this queue
    ///
    /// Lets a caller register the queue itself with `Sensor::start` and poll
    /// frames from its own thread or task instead of handling them inline.
    pub fn handler(self: &Arc<Self>) -> FrameCallback {
        let queue = Arc::clone(self);
        frame_callback(move |frame| {
            queue.push(frame);
        })
    }

    /// Blocking receive
    ///
    /// Drains frames still queued after `close`, then fails.
    pub fn recv_blocking(&self) -> Result<Frame> {
        self.rx.recv_blocking().map_err(|_| self.closed_error())
    }

    /// Async receive
    pub async fn recv(&self) -> Result<Frame> {
        self.rx.recv().await.map_err(|_| self.closed_error())
    }

    /// Non-blocking receive, `None` when empty or closed
    pub fn try_recv(&self) -> Option<Frame> {
        match self.rx.try_recv() {
            Ok(frame) => Some(frame),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => None,
        }
    }

    /// Close the queue. Returns `true` if this call closed it.
    pub fn close(&self) -> bool {
        self.tx.close()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Frames currently queued
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.config.queue_capacity
    }

    pub fn policy(&self) -> DeliveryPolicy {
        self.config.policy
    }

    /// Stream label used in logs and metrics
    pub fn stream(&self) -> &str {
        &self.stream
    }

    /// Shared counters of this queue
    pub fn metrics(&self) -> Arc<DeliveryMetrics> {
        self.metrics.clone()
    }

    pub(crate) fn receiver(&self) -> Receiver<Frame> {
        self.rx.clone()
    }

    fn closed_error(&self) -> DeliveryError {
        DeliveryError::QueueClosed {
            stream: self.stream.clone(),
        }
    }
}
