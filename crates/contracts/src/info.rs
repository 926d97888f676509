//! Identity attributes exposed by devices and sensors

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity attribute of a device or sensor
///
/// Every attribute is optional: a device that does not report one returns
/// `None` from `info`, never an empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraInfo {
    Name,
    SerialNumber,
    FirmwareVersion,
    PhysicalPort,
    ProductId,
    ProductLine,
}

impl CameraInfo {
    /// All attribute kinds, in display order
    pub const ALL: [CameraInfo; 6] = [
        CameraInfo::Name,
        CameraInfo::SerialNumber,
        CameraInfo::FirmwareVersion,
        CameraInfo::PhysicalPort,
        CameraInfo::ProductId,
        CameraInfo::ProductLine,
    ];

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::SerialNumber => "Serial Number",
            Self::FirmwareVersion => "Firmware Version",
            Self::PhysicalPort => "Physical Port",
            Self::ProductId => "Product Id",
            Self::ProductLine => "Product Line",
        }
    }
}

impl fmt::Display for CameraInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
