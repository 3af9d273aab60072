//! Legacy factory living behind the C ABI of a loaded module.

use std::ffi::CString;
use std::ptr::NonNull;
use std::sync::Arc;

use super::abi::{OpenDeviceFn, RawDevice, RawLegacyFactory, FETCH_FACTORY_SYMBOL, LEGACY_ABI_VERSION};
use super::{LegacyDevice, LegacyDevicesFactory};
use crate::device::{DeviceReply, DynDevice};
use crate::error::{Error, Result};
use crate::module::LoadedModule;
use crate::status::Status;

/// Wrapper for a legacy factory object obtained from a loaded module.
pub struct NativeLegacyFactory {
    /// Owned; destroyed exactly once in `drop`
    raw: NonNull<RawLegacyFactory>,

    /// Module the factory's code lives in
    module: Arc<dyn LoadedModule>,
}

// SAFETY: the legacy ABI requires factory objects to be callable from any
// thread. The wrapper never mutates the object; only `drop` hands it back.
unsafe impl Send for NativeLegacyFactory {}
unsafe impl Sync for NativeLegacyFactory {}

impl NativeLegacyFactory {
    /// Resolve the entry point in `module` and build the factory for
    /// `instance`.
    pub fn fetch(module: Arc<dyn LoadedModule>, instance: &str) -> Result<Self> {
        let fetch = module.fetch_symbol(FETCH_FACTORY_SYMBOL)?;

        let c_instance = CString::new(instance)
            .map_err(|_| config_err!("instance name `{}` contains a NUL byte", instance))?;

        // SAFETY: `fetch` is the module's entry point and the module is kept
        // alive by `module`; the name is a valid C string for the call.
        let raw = unsafe { fetch(c_instance.as_ptr()) };

        let raw = NonNull::new(raw).ok_or_else(|| Error::NullFactory {
            instance: instance.to_string(),
        })?;

        // SAFETY: non-null pointer freshly returned by the entry point.
        unsafe { Self::from_raw(raw, module) }
    }

    /// Take ownership of a factory object.
    ///
    /// # Safety
    /// `raw` must point to a live factory produced by code inside `module`,
    /// not owned by anyone else.
    pub unsafe fn from_raw(raw: NonNull<RawLegacyFactory>, module: Arc<dyn LoadedModule>) -> Result<Self> {
        let found = raw.as_ref().abi_version;
        if found != LEGACY_ABI_VERSION {
            // The rest of the layout is unknown, so the object cannot be
            // destroyed safely; it is leaked.
            tracing::error!(
                "Legacy module {} reports ABI version {}, expected {}",
                module.path().display(),
                found,
                LEGACY_ABI_VERSION
            );
            return Err(Error::AbiMismatch {
                expected: LEGACY_ABI_VERSION,
                found,
            });
        }

        Ok(Self { raw, module })
    }

    /// The module this factory was obtained from.
    pub fn module(&self) -> &Arc<dyn LoadedModule> {
        &self.module
    }

    fn factory(&self) -> &RawLegacyFactory {
        // SAFETY: owned and alive until `drop`.
        unsafe { self.raw.as_ref() }
    }

    fn call(&self, func: OpenDeviceFn, name: &str) -> DeviceReply {
        let Ok(c_name) = CString::new(name) else {
            tracing::warn!("Device name {:?} cannot cross the legacy ABI", name);
            return DeviceReply::error(Status::InvalidArguments);
        };

        let mut out = RawDevice::empty();
        // SAFETY: `func` and `ctx` belong to the live factory; `out` is a
        // valid, initialized slot for the module to fill.
        let code = unsafe { func(self.factory().ctx, c_name.as_ptr(), &mut out) };

        let status = Status::from_code(code);
        if let Status::Unknown(code) = status {
            tracing::warn!("Legacy module returned unknown status {} for `{}`", code, name);
        }

        let device = if out.is_empty() {
            None
        } else {
            let device: DynDevice = Arc::new(LegacyDevice::from_raw(name, out, self.module.clone()));
            Some(device)
        };

        DeviceReply::new(status, device)
    }
}

impl LegacyDevicesFactory for NativeLegacyFactory {
    fn open_device(&self, name: &str) -> DeviceReply {
        self.call(self.factory().open_device, name)
    }

    fn supports_extended_open(&self) -> bool {
        self.factory().open_device_7_1.is_some()
    }

    fn open_device_7_1(&self, name: &str) -> DeviceReply {
        match self.factory().open_device_7_1 {
            Some(func) => self.call(func, name),
            None => DeviceReply::error(Status::NotSupported),
        }
    }
}

impl Drop for NativeLegacyFactory {
    fn drop(&mut self) {
        let destroy = self.factory().destroy;
        // SAFETY: the factory is owned by this wrapper and destroyed once.
        unsafe { destroy(self.raw.as_ptr()) };
        tracing::debug!("Destroyed legacy factory from {}", self.module.path().display());
    }
}

impl std::fmt::Debug for NativeLegacyFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeLegacyFactory")
            .field("module", &self.module.path())
            .field("extended", &self.supports_extended_open())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::{c_char, c_void, CStr};
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::device::{Device, DeviceKind};
    use crate::module::{ModuleProvider, StaticModuleProvider};

    struct FakeState {
        destroyed: Arc<AtomicUsize>,
        released: Arc<AtomicUsize>,
    }

    unsafe extern "C" fn fake_open(ctx: *mut c_void, name: *const c_char, out: *mut RawDevice) -> i32 {
        let state = &*(ctx as *const FakeState);
        match CStr::from_ptr(name).to_str().unwrap_or("") {
            "usb" => {
                *out = RawDevice {
                    ctx: Box::into_raw(Box::new(state.released.clone())) as *mut c_void,
                    release: Some(fake_release),
                };
                0
            }
            "odd" => -38,
            _ => 2,
        }
    }

    unsafe extern "C" fn fake_release(ctx: *mut c_void) {
        let released = Box::from_raw(ctx as *mut Arc<AtomicUsize>);
        released.fetch_add(1, Ordering::SeqCst);
    }

    unsafe extern "C" fn fake_destroy(factory: *mut RawLegacyFactory) {
        let factory = Box::from_raw(factory);
        let state = Box::from_raw(factory.ctx as *mut FakeState);
        state.destroyed.fetch_add(1, Ordering::SeqCst);
    }

    fn fake_factory(abi_version: u32, extended: bool) -> (NonNull<RawLegacyFactory>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let destroyed = Arc::new(AtomicUsize::new(0));
        let released = Arc::new(AtomicUsize::new(0));
        let state = Box::new(FakeState {
            destroyed: destroyed.clone(),
            released: released.clone(),
        });
        let raw = Box::new(RawLegacyFactory {
            abi_version,
            ctx: Box::into_raw(state) as *mut c_void,
            open_device: fake_open,
            open_device_7_1: if extended { Some(fake_open) } else { None },
            destroy: fake_destroy,
        });
        (NonNull::from(Box::leak(raw)), destroyed, released)
    }

    fn test_module() -> Arc<dyn LoadedModule> {
        StaticModuleProvider::new()
            .with_empty_module("hw/fake.so")
            .load(Path::new("hw/fake.so"))
            .unwrap()
    }

    #[test]
    fn test_open_and_release() {
        let (raw, destroyed, released) = fake_factory(LEGACY_ABI_VERSION, false);
        let factory = unsafe { NativeLegacyFactory::from_raw(raw, test_module()) }.unwrap();

        let reply = factory.open_device("usb");
        assert_eq!(reply.status, Status::Ok);
        let device = reply.device.unwrap();
        assert_eq!(device.kind(), DeviceKind::Legacy);
        assert_eq!(device.name(), "usb");

        drop(factory);
        assert_eq!(destroyed.load(Ordering::SeqCst), 1);
        // Devices outlive the factory that produced them.
        assert_eq!(released.load(Ordering::SeqCst), 0);
        drop(device);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_status_pass_through() {
        let (raw, _, _) = fake_factory(LEGACY_ABI_VERSION, false);
        let factory = unsafe { NativeLegacyFactory::from_raw(raw, test_module()) }.unwrap();

        let reply = factory.open_device("nonexistent");
        assert_eq!(reply.status, Status::InvalidArguments);
        assert!(reply.device.is_none());

        let reply = factory.open_device("odd");
        assert_eq!(reply.status, Status::Unknown(-38));
    }

    #[test]
    fn test_interior_nul_is_rejected_locally() {
        let (raw, _, _) = fake_factory(LEGACY_ABI_VERSION, false);
        let factory = unsafe { NativeLegacyFactory::from_raw(raw, test_module()) }.unwrap();

        let reply = factory.open_device("us\0b");
        assert_eq!(reply.status, Status::InvalidArguments);
        assert!(reply.device.is_none());
    }

    #[test]
    fn test_extended_open_availability() {
        let (raw, _, _) = fake_factory(LEGACY_ABI_VERSION, false);
        let factory = unsafe { NativeLegacyFactory::from_raw(raw, test_module()) }.unwrap();
        assert!(!factory.supports_extended_open());
        assert_eq!(factory.open_device_7_1("usb").status, Status::NotSupported);

        let (raw, _, _) = fake_factory(LEGACY_ABI_VERSION, true);
        let factory = unsafe { NativeLegacyFactory::from_raw(raw, test_module()) }.unwrap();
        assert!(factory.supports_extended_open());
        assert_eq!(factory.open_device_7_1("usb").status, Status::Ok);
    }

    #[test]
    fn test_abi_mismatch() {
        let (raw, destroyed, _) = fake_factory(LEGACY_ABI_VERSION + 1, false);
        let err = unsafe { NativeLegacyFactory::from_raw(raw, test_module()) }.unwrap_err();
        assert!(matches!(err, Error::AbiMismatch { found: 2, .. }));
        assert_eq!(destroyed.load(Ordering::SeqCst), 0);
    }
}
