//! C ABI shared with legacy modules.
//!
//! A legacy module exports [`FETCH_FACTORY_SYMBOL`] with the signature of
//! [`FetchFactoryFn`]. The returned [`RawLegacyFactory`] is owned by the
//! caller until it hands it back through `destroy`.

use std::ffi::{c_char, c_void};

/// Current legacy module ABI version.
/// Factories reporting any other version are rejected.
pub const LEGACY_ABI_VERSION: u32 = 1;

/// Name of the factory entry point exported by every legacy module.
pub const FETCH_FACTORY_SYMBOL: &str = "HIDL_FETCH_IDevicesFactory";

/// Entry point: build the legacy factory for the given instance name.
/// Returns null on failure.
pub type FetchFactoryFn = unsafe extern "C" fn(instance_name: *const c_char) -> *mut RawLegacyFactory;

/// Open a device by name, writing the device (if any) to `out` and
/// returning a status code.
pub type OpenDeviceFn =
    unsafe extern "C" fn(ctx: *mut c_void, name: *const c_char, out: *mut RawDevice) -> i32;

/// Release a factory previously returned by the entry point.
pub type DestroyFactoryFn = unsafe extern "C" fn(factory: *mut RawLegacyFactory);

/// Release a device.
pub type ReleaseDeviceFn = unsafe extern "C" fn(ctx: *mut c_void);

/// Legacy devices factory object.
#[repr(C)]
#[derive(Debug)]
pub struct RawLegacyFactory {
    /// ABI version - must match LEGACY_ABI_VERSION
    pub abi_version: u32,

    /// Module-private state passed back to every call
    pub ctx: *mut c_void,

    /// `openDevice`
    pub open_device: OpenDeviceFn,

    /// `openDevice_7_1`; null when the module predates it
    pub open_device_7_1: Option<OpenDeviceFn>,

    /// Frees this object and `ctx`
    pub destroy: DestroyFactoryFn,
}

/// Device handed back by a legacy open call.
#[repr(C)]
#[derive(Debug)]
pub struct RawDevice {
    /// Module-private device state; null means "no device"
    pub ctx: *mut c_void,

    /// Frees `ctx`
    pub release: Option<ReleaseDeviceFn>,
}

impl RawDevice {
    /// The value written to `out` before calling into a module.
    pub const fn empty() -> Self {
        Self {
            ctx: std::ptr::null_mut(),
            release: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ctx.is_null()
    }
}

impl Default for RawDevice {
    fn default() -> Self {
        Self::empty()
    }
}
