//! Error types for CLI operations.

use contracts::SdkError;
use thiserror::Error;

/// CLI-specific error types
///
/// SDK failures are not wrapped here: they travel as `SdkError` inside
/// `anyhow::Error` so `report` can find them in the chain.
#[derive(Error, Debug)]
pub enum CliError {
    /// Rig file not found
    #[error("Rig file not found: {path}")]
    RigNotFound { path: String },

    /// No sensor matched `--sensor`
    #[error("No sensor named '{name}'")]
    SensorNotFound { name: String },

    /// No sensor exposes the profile given with `--profile`
    #[error("No stream profile with unique id #{id}")]
    ProfileNotFound { id: u32 },

    /// Rig validation failed
    #[error("Rig validation failed: {message}")]
    Validation { message: String },
}

impl CliError {
    pub fn rig_not_found(path: impl Into<String>) -> Self {
        Self::RigNotFound { path: path.into() }
    }

    pub fn sensor_not_found(name: impl Into<String>) -> Self {
        Self::SensorNotFound { name: name.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// `error calling <function>(<args>):\n    <message>`
pub fn format_sdk_error(error: &SdkError) -> String {
    format!(
        "error calling {}({}):\n    {}",
        error.failed_function(),
        error.failed_args(),
        error.message
    )
}

/// Print a command failure to stderr
///
/// The first `SdkError` in the chain is printed in its structured form,
/// anything else with its context chain.
pub fn report(error: &anyhow::Error) {
    match error.chain().find_map(|e| e.downcast_ref::<SdkError>()) {
        Some(sdk) => eprintln!("{}", format_sdk_error(sdk)),
        None => eprintln!("{:#}", error),
    }
}
