//! Frame - one unit of captured data delivered during streaming

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::{StreamKind, StreamProfile};

/// Captured frame
///
/// Cheap to clone: the profile is shared and the payload is reference counted.
#[derive(Clone)]
pub struct Frame {
    /// Per-stream sequence number, monotonically increasing
    pub number: u64,

    /// Hardware timestamp (milliseconds since the device clock started)
    pub timestamp_ms: f64,

    /// Originating stream profile
    pub profile: Arc<StreamProfile>,

    /// Raw payload (zero-copy)
    pub data: Bytes,
}

impl Frame {
    /// Per-stream frame number
    pub fn frame_number(&self) -> u64 {
        self.number
    }

    /// Originating profile
    pub fn profile(&self) -> &StreamProfile {
        &self.profile
    }

    /// Stream kind of the originating profile
    pub fn stream_type(&self) -> StreamKind {
        self.profile.stream_type()
    }

    /// Payload size in bytes
    pub fn data_size(&self) -> usize {
        self.data.len()
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("number", &self.number)
            .field("timestamp_ms", &self.timestamp_ms)
            .field("stream", &self.profile.stream_type())
            .field("profile", &self.profile.unique_id())
            .field("data_len", &self.data.len())
            .finish()
    }
}
