//! Reference legacy module.
//!
//! Serves a fixed set of non-primary devices and implements both open entry
//! points. Install the built library as
//! `<lib-dir>/hw/android.hardware.audio.legacy@<version>-impl.<variant>.so`
//! to have the devices factory load it.

use audiohal_legacy_sdk::prelude::*;

/// Device names this module serves.
pub const SUPPORTED_DEVICES: [&str; 3] = ["usb", "a2dp", "r_submix"];

/// Legacy factory state for one instance.
pub struct StubModule {
    instance: String,
}

/// An opened stub device.
#[derive(Debug)]
pub struct StubDevice {
    pub name: String,
}

impl StubModule {
    pub fn instance(&self) -> &str {
        &self.instance
    }
}

impl LegacyModule for StubModule {
    type Device = StubDevice;

    const SUPPORTS_EXTENDED_OPEN: bool = true;

    fn create(instance: &str) -> Option<Self> {
        if instance.is_empty() {
            return None;
        }
        tracing::info!("Stub legacy module created for instance `{}`", instance);
        Some(Self {
            instance: instance.to_string(),
        })
    }

    fn open_device(&self, name: &str) -> Result<StubDevice, Status> {
        if SUPPORTED_DEVICES.contains(&name) {
            Ok(StubDevice {
                name: name.to_string(),
            })
        } else {
            Err(Status::InvalidArguments)
        }
    }

    fn open_device_7_1(&self, name: &str) -> Result<StubDevice, Status> {
        self.open_device(name)
    }
}

export_legacy_factory!(StubModule);
