//! Shared simulated hardware registry
//!
//! Physical state that every context and sensor handle sees: attached
//! devices, option values, exclusive ownership and per-stream frame counters.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use contracts::{
    CameraInfo, ConfigError, DeliveryConfig, DeviceConfig, ProfileId, RigBlueprint, SensorConfig,
    StreamProfile,
};
use tracing::{info, instrument, warn};

use crate::lock;
use crate::options::OptionStore;

/// Handle to an attached device, stable until it is detached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceKey(pub u32);

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dev{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SensorKey(pub u32);

/// Identifier of one sensor handle, used as ownership token
pub(crate) type OwnerId = u64;

pub(crate) struct DeviceUnit {
    pub(crate) key: DeviceKey,
    pub(crate) identity: HashMap<CameraInfo, String>,
    pub(crate) sensors: Vec<Arc<SensorUnit>>,
}

/// One physical sensor
pub(crate) struct SensorUnit {
    pub(crate) key: SensorKey,
    pub(crate) name: String,
    pub(crate) device_identity: HashMap<CameraInfo, String>,
    pub(crate) profiles: Vec<Arc<StreamProfile>>,
    pub(crate) delivery: DeliveryConfig,
    pub(crate) options: Mutex<OptionStore>,
    pub(crate) streaming: AtomicBool,
    pub(crate) attached: AtomicBool,
    owner: Mutex<Option<OwnerId>>,
    counters: HashMap<ProfileId, AtomicU64>,
}

impl SensorUnit {
    /// Take exclusive ownership, returns the current owner on conflict
    pub(crate) fn acquire(&self, owner: OwnerId) -> Result<(), OwnerId> {
        let mut slot = lock(&self.owner);
        match *slot {
            Some(current) if current != owner => Err(current),
            _ => {
                *slot = Some(owner);
                Ok(())
            }
        }
    }

    pub(crate) fn release(&self, owner: OwnerId) {
        let mut slot = lock(&self.owner);
        if *slot == Some(owner) {
            *slot = None;
        }
    }

    pub(crate) fn owner(&self) -> Option<OwnerId> {
        *lock(&self.owner)
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    /// Next sequence number of a stream, starting at 1
    pub(crate) fn next_frame_number(&self, profile: ProfileId) -> u64 {
        self.counters
            .get(&profile)
            .map(|c| c.fetch_add(1, Ordering::Relaxed) + 1)
            .unwrap_or(0)
    }

    pub(crate) fn find_profile(&self, id: ProfileId) -> Option<&Arc<StreamProfile>> {
        self.profiles.iter().find(|p| p.unique_id() == id)
    }
}

/// Simulated hardware shared by every `SimContext`
///
/// Devices can be attached and detached at runtime; the next
/// `query_devices` snapshot of every context reflects the change.
pub struct SimHardware {
    devices: Mutex<Vec<Arc<DeviceUnit>>>,
    default_delivery: DeliveryConfig,
    next_device_key: AtomicU32,
    next_sensor_key: AtomicU32,
    next_profile_id: AtomicU32,
    next_owner_id: AtomicU64,
    epoch: Instant,
}

impl SimHardware {
    /// Empty hardware, sensors without a delivery override use `default_delivery`
    pub fn new(default_delivery: DeliveryConfig) -> Arc<Self> {
        Arc::new(Self {
            devices: Mutex::new(Vec::new()),
            default_delivery,
            next_device_key: AtomicU32::new(1),
            next_sensor_key: AtomicU32::new(1),
            next_profile_id: AtomicU32::new(1),
            next_owner_id: AtomicU64::new(1),
            epoch: Instant::now(),
        })
    }

    /// Hardware with every device of `blueprint` attached
    pub fn from_blueprint(blueprint: &RigBlueprint) -> Result<Arc<Self>, ConfigError> {
        let hardware = Self::new(blueprint.delivery);
        for device in &blueprint.devices {
            hardware.attach_device(device)?;
        }
        Ok(hardware)
    }

    /// Plug in a device
    #[instrument(
        name = "sim_attach_device",
        skip(self, config),
        fields(device = ?config.name, sensors = config.sensors.len())
    )]
    pub fn attach_device(&self, config: &DeviceConfig) -> Result<DeviceKey, ConfigError> {
        let identity: HashMap<CameraInfo, String> = CameraInfo::ALL
            .iter()
            .filter_map(|&kind| config.info(kind).map(|v| (kind, v.to_string())))
            .collect();

        let sensors = config
            .sensors
            .iter()
            .map(|sensor| self.build_sensor(sensor, &identity).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;

        let key = DeviceKey(self.next_device_key.fetch_add(1, Ordering::Relaxed));
        lock(&self.devices).push(Arc::new(DeviceUnit {
            key,
            identity,
            sensors,
        }));

        info!(key = %key, "device attached");
        Ok(key)
    }

    /// Unplug a device. Streams of its sensors stop producing frames.
    ///
    /// Returns `false` when the key is unknown.
    #[instrument(name = "sim_detach_device", skip(self), fields(key = %key))]
    pub fn detach_device(&self, key: DeviceKey) -> bool {
        let removed = {
            let mut devices = lock(&self.devices);
            let position = devices.iter().position(|d| d.key == key);
            position.map(|i| devices.remove(i))
        };

        match removed {
            Some(device) => {
                for sensor in &device.sensors {
                    sensor.attached.store(false, Ordering::Release);
                }
                info!("device detached");
                true
            }
            None => {
                warn!("detach of unknown device");
                false
            }
        }
    }

    /// Keys of attached devices, in attach order
    pub fn device_keys(&self) -> Vec<DeviceKey> {
        lock(&self.devices).iter().map(|d| d.key).collect()
    }

    pub fn device_count(&self) -> usize {
        lock(&self.devices).len()
    }

    pub fn default_delivery(&self) -> DeliveryConfig {
        self.default_delivery
    }

    pub(crate) fn devices(&self) -> Vec<Arc<DeviceUnit>> {
        lock(&self.devices).clone()
    }

    pub(crate) fn allocate_owner_id(&self) -> OwnerId {
        self.next_owner_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Milliseconds since the hardware clock started
    pub(crate) fn timestamp_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    fn build_sensor(
        &self,
        config: &SensorConfig,
        device_identity: &HashMap<CameraInfo, String>,
    ) -> Result<SensorUnit, ConfigError> {
        let mut profiles = Vec::with_capacity(config.profiles.len());
        for (i, profile) in config.profiles.iter().enumerate() {
            let variant = profile.variant().ok_or_else(|| {
                ConfigError::validation(
                    format!("{}.profiles[{i}]", config.name),
                    "video profile requires width and height",
                )
            })?;
            let id = ProfileId(self.next_profile_id.fetch_add(1, Ordering::Relaxed));
            profiles.push(Arc::new(StreamProfile::new(
                id,
                profile.stream,
                profile.index,
                profile.display_name(),
                profile.fps,
                profile.format,
                variant,
            )));
        }

        let counters = profiles
            .iter()
            .map(|p| (p.unique_id(), AtomicU64::new(0)))
            .collect();

        Ok(SensorUnit {
            key: SensorKey(self.next_sensor_key.fetch_add(1, Ordering::Relaxed)),
            name: config.name.clone(),
            device_identity: device_identity.clone(),
            profiles,
            delivery: config.delivery.unwrap_or(self.default_delivery),
            options: Mutex::new(OptionStore::from_configs(&config.options)),
            streaming: AtomicBool::new(false),
            attached: AtomicBool::new(true),
            owner: Mutex::new(None),
            counters,
        })
    }
}
