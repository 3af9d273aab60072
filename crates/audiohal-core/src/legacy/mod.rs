//! Legacy devices factory: the delegate for every non-primary device.

pub mod abi;
pub mod native;

use std::sync::Arc;

use crate::device::{Device, DeviceInfo, DeviceKind, DeviceReply};
use crate::module::LoadedModule;
use crate::status::Status;

use abi::RawDevice;

pub use native::NativeLegacyFactory;

/// Device-factory capability set implemented by legacy modules.
pub trait LegacyDevicesFactory: Send + Sync {
    /// `openDevice`: the legacy implementation decides status and object.
    fn open_device(&self, name: &str) -> DeviceReply;

    /// Whether [`open_device_7_1`](Self::open_device_7_1) is implemented.
    fn supports_extended_open(&self) -> bool {
        false
    }

    /// `openDevice_7_1`.
    fn open_device_7_1(&self, _name: &str) -> DeviceReply {
        DeviceReply::error(Status::NotSupported)
    }
}

/// Device served by a legacy module.
#[derive(Debug)]
pub struct LegacyDevice {
    info: DeviceInfo,
    raw: RawDevice,
    /// Keeps the code behind `raw.release` mapped.
    _module: Arc<dyn LoadedModule>,
}

// SAFETY: the legacy ABI requires device contexts to be usable from any
// thread, and this wrapper never dereferences `raw.ctx` itself; it is only
// handed back to the module's `release` exactly once, from `drop`.
unsafe impl Send for LegacyDevice {}
unsafe impl Sync for LegacyDevice {}

impl LegacyDevice {
    /// Wrap a device returned by `module`. Takes over the obligation to
    /// release it.
    pub(crate) fn from_raw(name: &str, raw: RawDevice, module: Arc<dyn LoadedModule>) -> Self {
        Self {
            info: DeviceInfo::new(name, DeviceKind::Legacy),
            raw,
            _module: module,
        }
    }

    /// Opaque module-side handle.
    pub fn raw_handle(&self) -> *mut std::ffi::c_void {
        self.raw.ctx
    }
}

impl Device for LegacyDevice {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }
}

impl Drop for LegacyDevice {
    fn drop(&mut self) {
        if let Some(release) = self.raw.release.take() {
            // SAFETY: `ctx` came from this module's open call and has not
            // been released yet; `take` guarantees a single release.
            unsafe { release(self.raw.ctx) };
        }
    }
}
