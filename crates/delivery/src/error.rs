//! Delivery error types

use thiserror::Error;

/// Delivery error
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Queue closed, no more frames accepted or delivered
    #[error("delivery queue closed for stream {stream}")]
    QueueClosed {
        /// Stream label
        stream: String,
    },

    /// Delivery thread could not be spawned
    #[error("failed to spawn delivery thread for stream {stream}: {source}")]
    SpawnFailed {
        /// Stream label
        stream: String,
        #[source]
        source: std::io::Error,
    },
}

/// Delivery Result type alias
pub type Result<T> = std::result::Result<T, DeliveryError>;
