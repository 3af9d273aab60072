//! C ABI shims for [`LegacyModule`] implementations.
//!
//! Panics never cross the boundary: they are caught and reported as
//! `INVALID_STATE` (open calls) or a null factory (entry point).

use std::ffi::{c_char, c_void, CStr};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;

use crate::abi::{RawDevice, RawLegacyFactory, LEGACY_ABI_VERSION};
use crate::{LegacyModule, Status};

/// Box `module` behind a [`RawLegacyFactory`]. The host releases it through
/// the factory's `destroy` function.
pub fn into_raw_factory<M: LegacyModule>(module: M) -> *mut RawLegacyFactory {
    let ctx = Box::into_raw(Box::new(module)) as *mut c_void;

    let open_device_7_1 = if M::SUPPORTS_EXTENDED_OPEN {
        Some(open_device_7_1_shim::<M> as crate::abi::OpenDeviceFn)
    } else {
        None
    };

    Box::into_raw(Box::new(RawLegacyFactory {
        abi_version: LEGACY_ABI_VERSION,
        ctx,
        open_device: open_device_shim::<M>,
        open_device_7_1,
        destroy: destroy_shim::<M>,
    }))
}

/// Body of the exported factory entry point.
///
/// # Safety
/// `instance_name` must be null or point to a NUL-terminated string.
pub unsafe fn fetch_factory<M: LegacyModule>(instance_name: *const c_char) -> *mut RawLegacyFactory {
    if instance_name.is_null() {
        return ptr::null_mut();
    }
    let Ok(instance) = CStr::from_ptr(instance_name).to_str() else {
        return ptr::null_mut();
    };

    match catch_unwind(|| M::create(instance)) {
        Ok(Some(module)) => into_raw_factory(module),
        Ok(None) => {
            tracing::warn!("Legacy module declined instance `{}`", instance);
            ptr::null_mut()
        }
        Err(_) => {
            tracing::error!("Legacy module panicked creating instance `{}`", instance);
            ptr::null_mut()
        }
    }
}

unsafe fn open_with<M, F>(ctx: *mut c_void, name: *const c_char, out: *mut RawDevice, open: F) -> i32
where
    M: LegacyModule,
    F: FnOnce(&M, &str) -> Result<M::Device, Status>,
{
    if ctx.is_null() || name.is_null() || out.is_null() {
        return Status::InvalidArguments.code();
    }
    let module = &*(ctx as *const M);
    let Ok(name) = CStr::from_ptr(name).to_str() else {
        return Status::InvalidArguments.code();
    };

    match catch_unwind(AssertUnwindSafe(|| open(module, name))) {
        Ok(Ok(device)) => {
            *out = RawDevice {
                ctx: Box::into_raw(Box::new(device)) as *mut c_void,
                release: Some(release_shim::<M::Device>),
            };
            Status::Ok.code()
        }
        Ok(Err(status)) => status.code(),
        Err(_) => {
            tracing::error!("Legacy module panicked opening `{}`", name);
            Status::InvalidState.code()
        }
    }
}

unsafe extern "C" fn open_device_shim<M: LegacyModule>(
    ctx: *mut c_void,
    name: *const c_char,
    out: *mut RawDevice,
) -> i32 {
    open_with(ctx, name, out, |module: &M, name| module.open_device(name))
}

unsafe extern "C" fn open_device_7_1_shim<M: LegacyModule>(
    ctx: *mut c_void,
    name: *const c_char,
    out: *mut RawDevice,
) -> i32 {
    open_with(ctx, name, out, |module: &M, name| module.open_device_7_1(name))
}

unsafe extern "C" fn release_shim<D>(ctx: *mut c_void) {
    if !ctx.is_null() {
        drop(Box::from_raw(ctx as *mut D));
    }
}

unsafe extern "C" fn destroy_shim<M: LegacyModule>(factory: *mut RawLegacyFactory) {
    if factory.is_null() {
        return;
    }
    let factory = Box::from_raw(factory);
    if !factory.ctx.is_null() {
        drop(Box::from_raw(factory.ctx as *mut M));
    }
}
