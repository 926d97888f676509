//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::DeliveryPolicy;
use std::path::PathBuf;

/// Sensor Control - enumerate, configure and stream depth-camera sensors
#[derive(Parser, Debug)]
#[command(
    name = "sensor-control",
    author,
    version,
    about = "Enumerate, configure and stream depth-camera sensors",
    long_about = "Walks the device -> sensor -> option / stream profile hierarchy of a \n\
                  simulated depth-camera rig, resets sensor options to their defaults \n\
                  and opens stream profiles to receive frames."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "SENSOR_CONTROL_VERBOSE")]
    pub verbose: u8,

    /// Suppress all log output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "SENSOR_CONTROL_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Rig description file (TOML or JSON), built-in rig when omitted
    #[arg(long, global = true, env = "SENSOR_CONTROL_RIG")]
    pub rig: Option<PathBuf>,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", global = true, env = "SENSOR_CONTROL_METRICS_PORT")]
    pub metrics_port: u16,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List devices, sensors, options and stream profiles
    Enumerate(EnumerateArgs),

    /// Open a profile on each sensor and print received frames
    Stream(StreamArgs),

    /// Reset every sensor option to its default
    Reset(ResetArgs),

    /// Validate a rig description file
    Validate(ValidateArgs),
}

/// Arguments for the `enumerate` command
#[derive(Parser, Debug, Clone)]
pub struct EnumerateArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Include sensor options
    #[arg(long)]
    pub options: bool,

    /// Include stream profiles
    #[arg(long)]
    pub profiles: bool,
}

/// Arguments for the `stream` command
#[derive(Parser, Debug, Clone)]
pub struct StreamArgs {
    /// Seconds to stream each sensor
    #[arg(short, long, default_value = "5", env = "SENSOR_CONTROL_DURATION")]
    pub duration: u64,

    /// Only stream the sensor with this name
    #[arg(short, long)]
    pub sensor: Option<String>,

    /// Open the profile with this unique id instead of the first one
    #[arg(short, long)]
    pub profile: Option<u32>,

    /// Override the frame queue overflow policy
    #[arg(long, value_enum, env = "SENSOR_CONTROL_POLICY")]
    pub policy: Option<PolicyArg>,

    /// Override the per-stream frame queue capacity
    #[arg(long, env = "SENSOR_CONTROL_QUEUE_CAPACITY")]
    pub queue_capacity: Option<usize>,
}

/// Arguments for the `reset` command
#[derive(Parser, Debug, Clone)]
pub struct ResetArgs {
    /// Only reset the sensor with this name
    #[arg(short, long)]
    pub sensor: Option<String>,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Rig description file to validate
    pub path: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

/// Frame queue overflow policy
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyArg {
    /// Evict the oldest queued frame
    DropOldest,
    /// Discard the incoming frame
    DropNewest,
    /// Stall frame production until the handler catches up
    Block,
}

impl From<PolicyArg> for DeliveryPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::DropOldest => DeliveryPolicy::DropOldest,
            PolicyArg::DropNewest => DeliveryPolicy::DropNewest,
            PolicyArg::Block => DeliveryPolicy::Block,
        }
    }
}
