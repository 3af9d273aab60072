//! Declarative macros for legacy module development.

/// Export the factory entry point of a legacy module.
///
/// Emits `HIDL_FETCH_IDevicesFactory`, the symbol the devices factory
/// resolves after loading the module. Invoke it once per module crate.
///
/// # Example
///
/// ```rust
/// use audiohal_legacy_sdk::prelude::*;
///
/// struct NullModule;
///
/// impl LegacyModule for NullModule {
///     type Device = ();
///
///     fn create(_instance: &str) -> Option<Self> {
///         Some(NullModule)
///     }
///
///     fn open_device(&self, _name: &str) -> Result<(), Status> {
///         Err(Status::NotSupported)
///     }
/// }
///
/// export_legacy_factory!(NullModule);
/// ```
#[macro_export]
macro_rules! export_legacy_factory {
    ($ty:ty) => {
        #[no_mangle]
        #[allow(non_snake_case)]
        pub unsafe extern "C" fn HIDL_FETCH_IDevicesFactory(
            instance_name: *const ::std::ffi::c_char,
        ) -> *mut $crate::abi::RawLegacyFactory {
            $crate::fetch_factory::<$ty>(instance_name)
        }
    };
}
