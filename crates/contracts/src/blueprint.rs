//! RigBlueprint - Config Loader output
//!
//! Describes a simulated sensor rig: devices, their sensors, each sensor's
//! options and stream profiles, plus the frame delivery policy.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    CameraInfo, MotionIntrinsics, OptionKind, OptionMutability, OptionRange, PixelFormat,
    ProfileKind, ProfileVariant, StreamKind, VideoExtent,
};

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete rig description
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RigBlueprint {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Default delivery policy for every sensor
    #[serde(default)]
    #[validate(nested)]
    pub delivery: DeliveryConfig,

    /// Attached devices
    #[serde(default)]
    #[validate(nested)]
    pub devices: Vec<DeviceConfig>,
}

impl RigBlueprint {
    /// Total sensor count across all devices
    pub fn sensor_count(&self) -> usize {
        self.devices.iter().map(|d| d.sensors.len()).sum()
    }

    /// Total profile count across all sensors
    pub fn profile_count(&self) -> usize {
        self.devices
            .iter()
            .flat_map(|d| d.sensors.iter())
            .map(|s| s.profiles.len())
            .sum()
    }
}

/// Overflow policy of a frame delivery queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPolicy {
    /// Evict the oldest queued frame
    #[default]
    DropOldest,
    /// Discard the incoming frame
    DropNewest,
    /// Stall the producer until the handler catches up
    Block,
}

/// Frame delivery queue configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct DeliveryConfig {
    /// Frames buffered per stream before the policy applies
    #[serde(default = "default_queue_capacity")]
    #[validate(range(min = 1, max = 4096))]
    pub queue_capacity: usize,

    /// Behavior when the queue is full
    #[serde(default)]
    pub policy: DeliveryPolicy,
}

fn default_queue_capacity() -> usize {
    16
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            policy: DeliveryPolicy::default(),
        }
    }
}

impl DeliveryConfig {
    pub fn new(queue_capacity: usize, policy: DeliveryPolicy) -> Self {
        Self {
            queue_capacity,
            policy,
        }
    }
}

/// Device definition
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeviceConfig {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub name: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1))]
    pub serial_number: Option<String>,

    #[serde(default)]
    pub firmware_version: Option<String>,

    #[serde(default)]
    pub physical_port: Option<String>,

    #[serde(default)]
    pub product_id: Option<String>,

    #[serde(default)]
    pub product_line: Option<String>,

    /// Sensors of this device
    #[serde(default)]
    #[validate(nested)]
    pub sensors: Vec<SensorConfig>,
}

impl DeviceConfig {
    /// Configured identity attribute
    pub fn info(&self, info: CameraInfo) -> Option<&str> {
        let value = match info {
            CameraInfo::Name => &self.name,
            CameraInfo::SerialNumber => &self.serial_number,
            CameraInfo::FirmwareVersion => &self.firmware_version,
            CameraInfo::PhysicalPort => &self.physical_port,
            CameraInfo::ProductId => &self.product_id,
            CameraInfo::ProductLine => &self.product_line,
        };
        value.as_deref()
    }
}

/// Sensor definition
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SensorConfig {
    /// Sensor name, unique within its device
    #[validate(length(min = 1))]
    pub name: String,

    /// Supported options
    #[serde(default)]
    pub options: Vec<OptionConfig>,

    /// Streamable profiles
    #[serde(default)]
    #[validate(nested)]
    pub profiles: Vec<ProfileConfig>,

    /// Per-sensor override of the rig delivery policy
    #[serde(default)]
    #[validate(nested)]
    pub delivery: Option<DeliveryConfig>,
}

/// Option definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionConfig {
    pub kind: OptionKind,

    /// Description, defaults to the option label
    #[serde(default)]
    pub description: Option<String>,

    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub step: f32,

    /// Initial value, defaults to `default`
    #[serde(default)]
    pub value: Option<f32>,

    #[serde(default)]
    pub mutability: OptionMutability,
}

impl OptionConfig {
    pub fn range(&self) -> OptionRange {
        OptionRange {
            min: self.min,
            max: self.max,
            default: self.default,
            step: self.step,
        }
    }

    pub fn initial_value(&self) -> f32 {
        self.value.unwrap_or(self.default)
    }

    pub fn description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| self.kind.label().to_string())
    }
}

/// Stream profile definition
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProfileConfig {
    pub stream: StreamKind,

    #[serde(default)]
    pub index: u32,

    /// Display name, defaults to `StreamKind::default_name(index)`
    #[serde(default)]
    pub name: Option<String>,

    #[validate(range(min = 1, max = 1000))]
    pub fps: u32,

    pub format: PixelFormat,

    #[serde(default)]
    pub kind: ProfileKind,

    /// Required for video profiles
    #[serde(default)]
    pub width: Option<u32>,

    /// Required for video profiles
    #[serde(default)]
    pub height: Option<u32>,

    /// Motion profiles only
    #[serde(default)]
    pub motion: Option<MotionIntrinsics>,
}

impl ProfileConfig {
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.stream.default_name(self.index))
    }

    /// Runtime variant, `None` for a video profile missing its geometry
    pub fn variant(&self) -> Option<ProfileVariant> {
        match self.kind {
            ProfileKind::Base => Some(ProfileVariant::Base),
            ProfileKind::Video => match (self.width, self.height) {
                (Some(width), Some(height)) => {
                    Some(ProfileVariant::Video(VideoExtent { width, height }))
                }
                _ => None,
            },
            ProfileKind::Motion => Some(ProfileVariant::Motion(self.motion.unwrap_or_default())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_profile(width: Option<u32>, height: Option<u32>) -> ProfileConfig {
        ProfileConfig {
            stream: StreamKind::Infrared,
            index: 1,
            name: None,
            fps: 30,
            format: PixelFormat::Y8,
            kind: ProfileKind::Video,
            width,
            height,
            motion: None,
        }
    }

    #[test]
    fn test_profile_variant() {
        let profile = video_profile(Some(640), Some(480));
        assert_eq!(
            profile.variant(),
            Some(ProfileVariant::Video(VideoExtent {
                width: 640,
                height: 480
            }))
        );
        assert_eq!(profile.display_name(), "Infrared 1");

        assert_eq!(video_profile(Some(640), None).variant(), None);
    }

    #[test]
    fn test_device_config_from_json() {
        let json = r#"{
            "name": "Depth Camera",
            "serial_number": "0001",
            "sensors": [{
                "name": "Stereo Module",
                "profiles": [{"stream": "depth", "fps": 30, "format": "z16",
                              "kind": "video", "width": 640, "height": 480}]
            }]
        }"#;
        let device: DeviceConfig = serde_json::from_str(json).unwrap();
        assert_eq!(device.info(CameraInfo::Name), Some("Depth Camera"));
        assert_eq!(device.info(CameraInfo::FirmwareVersion), None);
        assert_eq!(device.sensors[0].profiles[0].kind, ProfileKind::Video);
        assert!(device.validate().is_ok());
    }

    #[test]
    fn test_delivery_defaults() {
        let config = DeliveryConfig::default();
        assert_eq!(config.queue_capacity, 16);
        assert_eq!(config.policy, DeliveryPolicy::DropOldest);
    }

    #[test]
    fn test_option_config_initial_value() {
        let option = OptionConfig {
            kind: OptionKind::Gain,
            description: None,
            min: 16.0,
            max: 248.0,
            default: 16.0,
            step: 1.0,
            value: None,
            mutability: OptionMutability::Always,
        };
        assert_eq!(option.initial_value(), 16.0);
        assert_eq!(option.description(), "Gain");
        assert!(option.range().contains(100.0));
    }
}
