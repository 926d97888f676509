//! Streaming and control-plane metrics
//!
//! Thin helpers over the `metrics` facade plus an in-memory per-stream
//! aggregator for end-of-run summaries.

use std::collections::BTreeMap;

use contracts::{Frame, OptionKind, SdkError};
use metrics::{counter, gauge, histogram};

/// Record one frame seen by a handler
pub fn record_frame_received(frame: &Frame) {
    counter!(
        "sensor_control_frames_received_total",
        "stream" => frame.profile.stream_name().to_string()
    )
    .increment(1);
}

/// Record a failed SDK call
pub fn record_sdk_error(error: &SdkError) {
    counter!(
        "sensor_control_sdk_errors_total",
        "function" => error.failed_function().to_string(),
        "kind" => error.kind().as_str()
    )
    .increment(1);
}

/// Record an option write rejected during a reset
pub fn record_option_rejected(sensor: &str, option: OptionKind, error: &SdkError) {
    counter!(
        "sensor_control_option_writes_rejected_total",
        "sensor" => sensor.to_string(),
        "option" => option.label(),
        "reason" => error.kind().as_str()
    )
    .increment(1);
}

/// Record the outcome of a bulk option reset
pub fn record_option_reset(sensor: &str, applied: usize, rejected: usize) {
    gauge!(
        "sensor_control_options_applied",
        "sensor" => sensor.to_string()
    )
    .set(applied as f64);
    gauge!(
        "sensor_control_options_rejected",
        "sensor" => sensor.to_string()
    )
    .set(rejected as f64);
}

/// Record how long a sensor streamed
pub fn record_stream_duration(sensor: &str, seconds: f64) {
    histogram!(
        "sensor_control_stream_duration_seconds",
        "sensor" => sensor.to_string()
    )
    .record(seconds);
}

/// Per-stream frame accounting
#[derive(Debug, Clone, Default)]
pub struct StreamStats {
    /// Frames seen
    pub frames: u64,

    /// First and last sequence number seen
    pub first_number: Option<u64>,
    pub last_number: Option<u64>,

    /// Sequence numbers skipped between consecutive frames
    pub gaps: u64,

    /// Frames whose number did not increase
    pub out_of_order: u64,

    /// Bytes of payload seen
    pub bytes: u64,

    /// Inter-arrival time in device milliseconds
    pub interval_ms: RunningStats,

    last_timestamp_ms: Option<f64>,
}

impl StreamStats {
    pub fn update(&mut self, frame: &Frame) {
        self.frames += 1;
        self.bytes += frame.data_size() as u64;
        self.first_number.get_or_insert(frame.number);

        match self.last_number {
            Some(last) if frame.number <= last => self.out_of_order += 1,
            Some(last) => {
                self.gaps += frame.number - last - 1;
                self.last_number = Some(frame.number);
            }
            None => self.last_number = Some(frame.number),
        }

        if let Some(previous) = self.last_timestamp_ms {
            self.interval_ms.push(frame.timestamp_ms - previous);
        }
        self.last_timestamp_ms = Some(frame.timestamp_ms);
    }

    /// Effective rate derived from the mean inter-arrival time
    pub fn effective_fps(&self) -> Option<f64> {
        let mean = self.interval_ms.mean();
        (self.interval_ms.count() > 0 && mean > 0.0).then(|| 1000.0 / mean)
    }
}

/// Aggregates frames of every stream a handler receives
///
/// Not synchronized: wrap it in a `Mutex` when the handler is shared by
/// several delivery threads.
#[derive(Debug, Clone, Default)]
pub struct StreamStatsAggregator {
    streams: BTreeMap<String, StreamStats>,
}

impl StreamStatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, frame: &Frame) {
        self.streams
            .entry(frame.profile.stream_name().to_string())
            .or_default()
            .update(frame);
    }

    pub fn stream(&self, name: &str) -> Option<&StreamStats> {
        self.streams.get(name)
    }

    pub fn total_frames(&self) -> u64 {
        self.streams.values().map(|s| s.frames).sum()
    }

    pub fn summary(&self) -> StreamSummary {
        StreamSummary {
            streams: self
                .streams
                .iter()
                .map(|(name, stats)| StreamLine {
                    name: name.clone(),
                    frames: stats.frames,
                    first_number: stats.first_number,
                    last_number: stats.last_number,
                    gaps: stats.gaps,
                    effective_fps: stats.effective_fps(),
                    interval_ms: StatsSummary::from(&stats.interval_ms),
                })
                .collect(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Printable summary of a streaming run
#[derive(Debug, Clone, Default)]
pub struct StreamSummary {
    pub streams: Vec<StreamLine>,
}

#[derive(Debug, Clone)]
pub struct StreamLine {
    pub name: String,
    pub frames: u64,
    pub first_number: Option<u64>,
    pub last_number: Option<u64>,
    pub gaps: u64,
    pub effective_fps: Option<f64>,
    pub interval_ms: StatsSummary,
}

impl std::fmt::Display for StreamSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Stream Summary ===")?;
        if self.streams.is_empty() {
            return writeln!(f, "No frames received");
        }
        for line in &self.streams {
            write!(f, "{}: {} frames", line.name, line.frames)?;
            if let (Some(first), Some(last)) = (line.first_number, line.last_number) {
                write!(f, " (#{}..#{}, {} skipped)", first, last, line.gaps)?;
            }
            if let Some(fps) = line.effective_fps {
                write!(f, ", {:.1} fps", fps)?;
            }
            writeln!(f)?;
            writeln!(f, "  interval (ms): {}", line.interval_ms)?;
        }
        Ok(())
    }
}

/// Summary of a `RunningStats`
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online mean and variance (Welford)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (value - self.mean);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
