//! Simulated context and device

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use contracts::{CameraInfo, ConfigError, Context, Device, RigBlueprint, Sensor};
use tracing::{debug, instrument};

use crate::hardware::{DeviceKey, DeviceUnit, SensorKey, SimHardware};
use crate::lock;
use crate::sensor::SimSensor;

/// Entry point over a `SimHardware`
///
/// Sensor handles are cached per context, so repeated enumeration returns the
/// same handle for the same physical sensor. Dropping the context releases
/// every handle it owns.
pub struct SimContext {
    hardware: Arc<SimHardware>,
    handles: Mutex<HashMap<SensorKey, Arc<SimSensor>>>,
}

impl SimContext {
    pub fn new(hardware: Arc<SimHardware>) -> Self {
        Self {
            hardware,
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Context over fresh hardware built from `blueprint`
    pub fn from_blueprint(blueprint: &RigBlueprint) -> Result<Self, ConfigError> {
        Ok(Self::new(SimHardware::from_blueprint(blueprint)?))
    }

    pub fn hardware(&self) -> &Arc<SimHardware> {
        &self.hardware
    }

    /// Typed device snapshot
    #[instrument(name = "sim_query_devices", skip(self))]
    pub fn devices(&self) -> Vec<SimDevice> {
        let units = self.hardware.devices();

        let (devices, released) = {
            let mut handles = lock(&self.handles);

            // drop handles of detached sensors after the lock is released
            let stale: Vec<SensorKey> = handles
                .keys()
                .filter(|key| {
                    !units
                        .iter()
                        .any(|d| d.sensors.iter().any(|s| s.key == **key))
                })
                .copied()
                .collect();
            let released: Vec<Arc<SimSensor>> =
                stale.iter().filter_map(|key| handles.remove(key)).collect();

            let devices = units
                .into_iter()
                .map(|unit| {
                    let sensors = unit
                        .sensors
                        .iter()
                        .map(|s| {
                            handles
                                .entry(s.key)
                                .or_insert_with(|| {
                                    Arc::new(SimSensor::new(s.clone(), self.hardware.clone()))
                                })
                                .clone()
                        })
                        .collect();
                    SimDevice { unit, sensors }
                })
                .collect::<Vec<_>>();
            (devices, released)
        };

        debug!(devices = devices.len(), released = released.len(), "devices enumerated");
        drop(released);
        devices
    }
}

impl Context for SimContext {
    fn query_devices(&self) -> Vec<Arc<dyn Device>> {
        self.devices()
            .into_iter()
            .map(|d| Arc::new(d) as Arc<dyn Device>)
            .collect()
    }
}

/// Snapshot of one attached device
pub struct SimDevice {
    unit: Arc<DeviceUnit>,
    sensors: Vec<Arc<SimSensor>>,
}

impl SimDevice {
    pub fn key(&self) -> DeviceKey {
        self.unit.key
    }

    /// Typed sensor handles
    pub fn sensors(&self) -> &[Arc<SimSensor>] {
        &self.sensors
    }
}

impl Device for SimDevice {
    fn info(&self, info: CameraInfo) -> Option<String> {
        self.unit.identity.get(&info).cloned()
    }

    fn query_sensors(&self) -> Vec<Arc<dyn Sensor>> {
        self.sensors
            .iter()
            .map(|s| s.clone() as Arc<dyn Sensor>)
            .collect()
    }
}
