//! Option enumeration and bulk reset

use contracts::{OptionKind, OptionSnapshot, SdkError, Sensor};
use tracing::{debug, info, instrument, warn};

/// Every supported option of `sensor`, in `OptionKind` order
pub fn list_options(sensor: &dyn Sensor) -> Vec<OptionSnapshot> {
    OptionKind::ALL
        .iter()
        .filter(|&&kind| sensor.supports_option(kind))
        .filter_map(|&kind| {
            let range = sensor.option_range(kind)?;
            let value = match sensor.get_option(kind) {
                Ok(value) => value,
                Err(e) => {
                    debug!(option = %kind, error = %e, "supported option not readable");
                    return None;
                }
            };
            Some(OptionSnapshot {
                kind,
                description: sensor
                    .option_description(kind)
                    .unwrap_or_else(|| kind.label().to_string()),
                value,
                range,
                mutability: sensor.option_mutability(kind).unwrap_or_default(),
            })
        })
        .collect()
}

/// An option whose default could not be written
#[derive(Debug, Clone)]
pub struct RejectedOption {
    pub kind: OptionKind,
    pub default: f32,
    pub error: SdkError,
}

/// Outcome of `reset_to_defaults`
#[derive(Debug, Clone, Default)]
pub struct ResetReport {
    /// Options now at their default
    pub applied: Vec<OptionKind>,
    /// Options whose write was rejected, value unchanged
    pub rejected: Vec<RejectedOption>,
}

impl ResetReport {
    pub fn attempted(&self) -> usize {
        self.applied.len() + self.rejected.len()
    }

    /// Rejections other than "not writable in the current state"
    pub fn unexpected(&self) -> impl Iterator<Item = &RejectedOption> {
        self.rejected.iter().filter(|r| !r.error.is_invalid_state())
    }

    /// First unexpected rejection as an error
    pub fn check(&self) -> contracts::Result<()> {
        match self.unexpected().next() {
            Some(rejected) => Err(rejected.error.clone()),
            None => Ok(()),
        }
    }
}

/// Write every supported option's default
///
/// Never stops early: each rejection is recorded and the next option is tried.
#[instrument(name = "control_reset_to_defaults", skip(sensor), fields(sensor = %sensor.name()))]
pub fn reset_to_defaults(sensor: &dyn Sensor) -> ResetReport {
    let mut report = ResetReport::default();

    for kind in OptionKind::ALL {
        let Some(range) = sensor.option_range(kind) else {
            continue;
        };

        match sensor.set_option(kind, range.default) {
            Ok(()) => report.applied.push(kind),
            Err(error) => {
                if error.is_invalid_state() {
                    debug!(option = %kind, error = %error, "default not writable in current state");
                } else {
                    warn!(option = %kind, error = %error, "default rejected");
                }
                report.rejected.push(RejectedOption {
                    kind,
                    default: range.default,
                    error,
                });
            }
        }
    }

    info!(
        applied = report.applied.len(),
        rejected = report.rejected.len(),
        "options reset"
    );
    report
}
