//! Sensor options: ranged floating-point controls

use std::fmt;

use serde::{Deserialize, Serialize};

/// Option identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    BacklightCompensation,
    Brightness,
    Contrast,
    Exposure,
    Gain,
    Gamma,
    Hue,
    Saturation,
    Sharpness,
    WhiteBalance,
    EnableAutoExposure,
    EnableAutoWhiteBalance,
    VisualPreset,
    LaserPower,
    EmitterEnabled,
    EmitterOnOff,
    FramesQueueSize,
    PowerLineFrequency,
    GlobalTimeEnabled,
    EnableMotionCorrection,
}

impl OptionKind {
    /// Every option kind, in declaration order
    pub const ALL: [OptionKind; 20] = [
        OptionKind::BacklightCompensation,
        OptionKind::Brightness,
        OptionKind::Contrast,
        OptionKind::Exposure,
        OptionKind::Gain,
        OptionKind::Gamma,
        OptionKind::Hue,
        OptionKind::Saturation,
        OptionKind::Sharpness,
        OptionKind::WhiteBalance,
        OptionKind::EnableAutoExposure,
        OptionKind::EnableAutoWhiteBalance,
        OptionKind::VisualPreset,
        OptionKind::LaserPower,
        OptionKind::EmitterEnabled,
        OptionKind::EmitterOnOff,
        OptionKind::FramesQueueSize,
        OptionKind::PowerLineFrequency,
        OptionKind::GlobalTimeEnabled,
        OptionKind::EnableMotionCorrection,
    ];

    /// Human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            Self::BacklightCompensation => "Backlight Compensation",
            Self::Brightness => "Brightness",
            Self::Contrast => "Contrast",
            Self::Exposure => "Exposure",
            Self::Gain => "Gain",
            Self::Gamma => "Gamma",
            Self::Hue => "Hue",
            Self::Saturation => "Saturation",
            Self::Sharpness => "Sharpness",
            Self::WhiteBalance => "White Balance",
            Self::EnableAutoExposure => "Enable Auto Exposure",
            Self::EnableAutoWhiteBalance => "Enable Auto White Balance",
            Self::VisualPreset => "Visual Preset",
            Self::LaserPower => "Laser Power",
            Self::EmitterEnabled => "Emitter Enabled",
            Self::EmitterOnOff => "Emitter On Off",
            Self::FramesQueueSize => "Frames Queue Size",
            Self::PowerLineFrequency => "Power Line Frequency",
            Self::GlobalTimeEnabled => "Global Time Enabled",
            Self::EnableMotionCorrection => "Enable Motion Correction",
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Supported range of an option
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionRange {
    pub min: f32,
    pub max: f32,
    pub default: f32,
    /// Difference to the next value
    pub step: f32,
}

impl OptionRange {
    /// Whether `value` lies inside `[min, max]`. NaN is never contained.
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

impl fmt::Display for OptionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}] default {} step {}",
            self.min, self.max, self.default, self.step
        )
    }
}

/// Lifecycle window in which writes to an option are accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionMutability {
    /// Writable in every state
    #[default]
    Always,
    /// Writable only while the sensor is streaming
    StreamingOnly,
    /// Writable only while the sensor is not streaming
    IdleOnly,
}

/// Point-in-time view of one supported option
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionSnapshot {
    pub kind: OptionKind,
    pub description: String,
    pub value: f32,
    pub range: OptionRange,
    pub mutability: OptionMutability,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_contains() {
        let range = OptionRange {
            min: 0.0,
            max: 360.0,
            default: 150.0,
            step: 30.0,
        };
        assert!(range.contains(0.0));
        assert!(range.contains(360.0));
        assert!(range.contains(45.0));
        assert!(!range.contains(-0.5));
        assert!(!range.contains(360.5));
        assert!(!range.contains(f32::NAN));
    }

    #[test]
    fn test_all_kinds_unique() {
        let mut kinds = OptionKind::ALL.to_vec();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), OptionKind::ALL.len());
    }
}
