//! audiohal Legacy Module SDK
//!
//! Tools for writing legacy audio HAL modules in Rust. A module implements
//! [`LegacyModule`] and exports its factory entry point with
//! [`export_legacy_factory!`]; the SDK takes care of the C ABI.
//!
//! # Quick Start
//!
//! ```rust
//! use audiohal_legacy_sdk::prelude::*;
//!
//! struct UsbModule;
//!
//! struct UsbDevice {
//!     card: u32,
//! }
//!
//! impl LegacyModule for UsbModule {
//!     type Device = UsbDevice;
//!
//!     fn create(_instance: &str) -> Option<Self> {
//!         Some(UsbModule)
//!     }
//!
//!     fn open_device(&self, name: &str) -> Result<UsbDevice, Status> {
//!         match name {
//!             "usb" => Ok(UsbDevice { card: 1 }),
//!             _ => Err(Status::InvalidArguments),
//!         }
//!     }
//! }
//!
//! export_legacy_factory!(UsbModule);
//! ```
//!
//! # Logging
//!
//! The SDK and modules log through `tracing`. A module linked into the host
//! binary (for example through `StaticModuleProvider`) shares the host's
//! subscriber. A module built as a `cdylib` and loaded from disk carries its
//! own copy of `tracing` with no subscriber installed, so its events are
//! dropped unless the module installs a subscriber itself, typically in
//! [`LegacyModule::create`]. Failures the host must see are reported through
//! the returned [`Status`] and null factory pointers, never only through logs.

pub mod ffi;
#[macro_use]
pub mod macros;

pub use audiohal_core::legacy::abi;
pub use audiohal_core::Status;

pub use ffi::{fetch_factory, into_raw_factory};

/// A legacy devices factory implemented in Rust.
pub trait LegacyModule: Send + Sync + Sized + 'static {
    /// Per-device state handed to the host as an opaque handle.
    type Device: Send + 'static;

    /// Whether the module implements [`open_device_7_1`](Self::open_device_7_1).
    const SUPPORTS_EXTENDED_OPEN: bool = false;

    /// Build the factory for an instance name. `None` makes the entry point
    /// return null.
    fn create(instance: &str) -> Option<Self>;

    /// `openDevice`.
    fn open_device(&self, name: &str) -> Result<Self::Device, Status>;

    /// `openDevice_7_1`.
    fn open_device_7_1(&self, name: &str) -> Result<Self::Device, Status> {
        let _ = name;
        Err(Status::NotSupported)
    }
}

/// Prelude module with common imports
pub mod prelude {
    pub use crate::abi::{RawLegacyFactory, FETCH_FACTORY_SYMBOL, LEGACY_ABI_VERSION};
    pub use crate::export_legacy_factory;
    pub use crate::{LegacyModule, Status};
}
