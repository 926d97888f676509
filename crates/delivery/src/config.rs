//! Delivery metrics

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Per-queue delivery counters
#[derive(Debug, Default)]
pub struct DeliveryMetrics {
    /// Frames offered by the producer
    pub frames_produced: AtomicU64,

    /// Frames handed to the frame handler
    pub frames_delivered: AtomicU64,

    /// Frames discarded by the overflow policy
    pub frames_dropped: AtomicU64,

    /// Frames whose handler panicked
    pub handler_panics: AtomicU64,

    /// Queue length after the last push
    pub queue_len: AtomicUsize,
}

impl DeliveryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_produced(&self) {
        self.frames_produced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivered(&self) {
        self.frames_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_handler_panic(&self) {
        self.handler_panics.fetch_add(1, Ordering::Relaxed);
    }

    pub fn update_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_produced: self.frames_produced.load(Ordering::Relaxed),
            frames_delivered: self.frames_delivered.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            handler_panics: self.handler_panics.load(Ordering::Relaxed),
            queue_len: self.queue_len.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub frames_produced: u64,
    pub frames_delivered: u64,
    pub frames_dropped: u64,
    pub handler_panics: u64,
    pub queue_len: usize,
}

impl MetricsSnapshot {
    /// Sum of two snapshots
    pub fn merge(self, other: MetricsSnapshot) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_produced: self.frames_produced + other.frames_produced,
            frames_delivered: self.frames_delivered + other.frames_delivered,
            frames_dropped: self.frames_dropped + other.frames_dropped,
            handler_panics: self.handler_panics + other.handler_panics,
            queue_len: self.queue_len + other.queue_len,
        }
    }
}
