//! Built-in primary device.

use std::sync::Arc;

use super::{Device, DeviceInfo, DeviceKind, DynDevice, AUDIO_HARDWARE_MODULE_ID_PRIMARY};
use crate::error::Result;

/// The natively implemented primary audio device.
pub trait PrimaryDevice: Device {
    /// Capability query for the underlying core device.
    fn get_device(&self) -> Result<DynDevice>;

    /// View this primary device as a plain [`Device`].
    fn into_device(self: Arc<Self>) -> DynDevice;
}

/// Dynamic primary device type.
pub type DynPrimaryDevice = Arc<dyn PrimaryDevice>;

/// Constructs a fresh primary device for every open request.
pub trait PrimaryDeviceBuilder: Send + Sync {
    fn build(&self) -> DynPrimaryDevice;
}

impl<F> PrimaryDeviceBuilder for F
where
    F: Fn() -> DynPrimaryDevice + Send + Sync,
{
    fn build(&self) -> DynPrimaryDevice {
        self()
    }
}

/// Builds [`StandardPrimaryDevice`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPrimaryBuilder;

impl PrimaryDeviceBuilder for DefaultPrimaryBuilder {
    fn build(&self) -> DynPrimaryDevice {
        StandardPrimaryDevice::new()
    }
}

/// Core device owned by a primary device.
#[derive(Debug)]
pub struct CoreDevice {
    info: DeviceInfo,
}

impl CoreDevice {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            info: DeviceInfo::new(name, DeviceKind::Core),
        }
    }
}

impl Device for CoreDevice {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }
}

/// Default primary device: a primary wrapper around one core device.
#[derive(Debug)]
pub struct StandardPrimaryDevice {
    info: DeviceInfo,
    core: Arc<CoreDevice>,
}

impl StandardPrimaryDevice {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            info: DeviceInfo::new(AUDIO_HARDWARE_MODULE_ID_PRIMARY, DeviceKind::Primary),
            core: Arc::new(CoreDevice::new(AUDIO_HARDWARE_MODULE_ID_PRIMARY)),
        })
    }
}

impl Device for StandardPrimaryDevice {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }
}

impl PrimaryDevice for StandardPrimaryDevice {
    fn get_device(&self) -> Result<DynDevice> {
        Ok(self.core.clone())
    }

    fn into_device(self: Arc<Self>) -> DynDevice {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_yields_fresh_devices() {
        let builder = DefaultPrimaryBuilder;
        let a = builder.build();
        let b = builder.build();
        assert_ne!(a.info().id, b.info().id);
        assert_eq!(a.name(), AUDIO_HARDWARE_MODULE_ID_PRIMARY);
        assert_eq!(a.kind(), DeviceKind::Primary);
    }

    #[test]
    fn test_get_device_returns_same_core() {
        let primary = StandardPrimaryDevice::new();
        let first = primary.get_device().unwrap();
        let second = primary.get_device().unwrap();
        assert_eq!(first.kind(), DeviceKind::Core);
        assert_eq!(first.info().id, second.info().id);
    }

    #[test]
    fn test_closure_builder() {
        let builder = || -> DynPrimaryDevice { StandardPrimaryDevice::new() };
        let device = PrimaryDeviceBuilder::build(&builder);
        assert_eq!(device.into_device().kind(), DeviceKind::Primary);
    }
}
