//! Layered error definitions
//!
//! - `SdkError`: a failed call into the sensor runtime (structured: function / args / message)
//! - `ConfigError`: rig configuration parse / validation / io

use std::fmt;

use thiserror::Error;

/// Classification of a failed SDK call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Attribute or option not supported by the target
    CapabilityUnsupported,
    /// Option value outside its declared range
    OutOfRange,
    /// Operation not valid in the current lifecycle state
    InvalidState,
    /// `start` called on a sensor that is already streaming
    AlreadyStreaming,
    /// Another owner holds exclusive access to the sensor
    DeviceBusy,
    /// Profile does not belong to this sensor
    InvalidProfile,
}

impl ErrorKind {
    /// Stable snake_case name, used as a metrics label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CapabilityUnsupported => "capability_unsupported",
            Self::OutOfRange => "out_of_range",
            Self::InvalidState => "invalid_state",
            Self::AlreadyStreaming => "already_streaming",
            Self::DeviceBusy => "device_busy",
            Self::InvalidProfile => "invalid_profile",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured SDK failure
///
/// Carries the failing operation name, the arguments it was called with and a
/// human-readable message, so top-level code can print
/// `error calling <function>(<args>)` without knowing where it came from.
#[derive(Debug, Clone, Error)]
#[error("{function}({args}): {message}")]
pub struct SdkError {
    /// Error classification
    pub kind: ErrorKind,
    /// Failing operation name, e.g. `set_option`
    pub function: &'static str,
    /// Rendered call arguments
    pub args: String,
    /// Human-readable message
    pub message: String,
}

impl SdkError {
    /// Create a new SDK error
    pub fn new(
        kind: ErrorKind,
        function: &'static str,
        args: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            function,
            args: args.into(),
            message: message.into(),
        }
    }

    /// Create capability-unsupported error
    pub fn unsupported(
        function: &'static str,
        args: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::CapabilityUnsupported, function, args, message)
    }

    /// Create out-of-range error
    pub fn out_of_range(
        function: &'static str,
        args: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::OutOfRange, function, args, message)
    }

    /// Create invalid-state error
    pub fn invalid_state(
        function: &'static str,
        args: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::InvalidState, function, args, message)
    }

    /// Error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Name of the failing operation
    pub fn failed_function(&self) -> &str {
        self.function
    }

    /// Rendered arguments of the failing operation
    pub fn failed_args(&self) -> &str {
        &self.args
    }

    /// Whether this is the expected rejection of a write outside its lifecycle window
    pub fn is_invalid_state(&self) -> bool {
        self.kind == ErrorKind::InvalidState
    }
}

/// Result alias for SDK calls
pub type Result<T> = std::result::Result<T, SdkError>;

/// Rig configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration parse error
    #[error("config parse error: {message}")]
    Parse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    Validation { field: String, message: String },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Create configuration parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sdk_error_display() {
        let err = SdkError::out_of_range("set_option", "Exposure, 1e9", "value outside [1, 165000]");
        assert_eq!(
            err.to_string(),
            "set_option(Exposure, 1e9): value outside [1, 165000]"
        );
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        assert_eq!(err.failed_function(), "set_option");
        assert_eq!(err.failed_args(), "Exposure, 1e9");
    }

    #[test]
    fn test_config_validation_display() {
        let err = ConfigError::validation("devices[0].serial_number", "duplicate serial");
        assert_eq!(
            err.to_string(),
            "config validation error at 'devices[0].serial_number': duplicate serial"
        );
    }
}
