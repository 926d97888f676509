//! Serializable enumeration snapshot

use contracts::{CameraInfo, Context, Device, OptionSnapshot, Sensor, SensorState, StreamProfile};
use serde::Serialize;
use tracing::instrument;

use crate::options::list_options;

/// What to include beyond identity
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportScope {
    pub options: bool,
    pub profiles: bool,
}

impl ReportScope {
    pub fn full() -> Self {
        Self {
            options: true,
            profiles: true,
        }
    }
}

/// Identity attribute present on a device or sensor
#[derive(Debug, Clone, Serialize)]
pub struct InfoEntry {
    pub kind: CameraInfo,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SensorReport {
    pub name: String,
    pub state: SensorState,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionSnapshot>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub profiles: Vec<StreamProfile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceReport {
    /// Supported attributes only, absent ones are omitted
    pub info: Vec<InfoEntry>,
    pub sensors: Vec<SensorReport>,
}

impl DeviceReport {
    pub fn info(&self, kind: CameraInfo) -> Option<&str> {
        self.info
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| e.value.as_str())
    }
}

/// Point-in-time view of every device, sensor, option and profile
#[derive(Debug, Clone, Serialize)]
pub struct ContextReport {
    pub devices: Vec<DeviceReport>,
}

impl ContextReport {
    #[instrument(name = "control_capture_report", skip(context))]
    pub fn capture(context: &dyn Context, scope: ReportScope) -> Self {
        let devices = context
            .query_devices()
            .iter()
            .map(|device| capture_device(device.as_ref(), scope))
            .collect();
        Self { devices }
    }

    pub fn sensor_count(&self) -> usize {
        self.devices.iter().map(|d| d.sensors.len()).sum()
    }
}

fn capture_device(device: &dyn Device, scope: ReportScope) -> DeviceReport {
    let info = CameraInfo::ALL
        .iter()
        .filter_map(|&kind| device.info(kind).map(|value| InfoEntry { kind, value }))
        .collect();
    let sensors = device
        .query_sensors()
        .iter()
        .map(|sensor| capture_sensor(sensor.as_ref(), scope))
        .collect();
    DeviceReport { info, sensors }
}

fn capture_sensor(sensor: &dyn Sensor, scope: ReportScope) -> SensorReport {
    SensorReport {
        name: sensor.name(),
        state: sensor.state(),
        options: if scope.options {
            list_options(sensor)
        } else {
            Vec::new()
        },
        profiles: if scope.profiles {
            sensor.stream_profiles()
        } else {
            Vec::new()
        },
    }
}
