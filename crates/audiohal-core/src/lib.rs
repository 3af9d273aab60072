//! Audio HAL devices factory.
//!
//! Brokers creation of audio device objects: the reserved `"primary"` device
//! is built in-process, every other device name is delegated to a legacy
//! implementation loaded from a versioned shared library.
//!
//! ```no_run
//! use audiohal_core::prelude::*;
//!
//! let config = FactoryConfig::from_env()?;
//! let factory = HalDevicesFactory::new(&config)?;
//! let reply = factory.open_device(AUDIO_HARDWARE_MODULE_ID_PRIMARY);
//! assert!(reply.is_ok());
//! # Ok::<(), audiohal_core::Error>(())
//! ```

#[macro_use]
pub mod error;

pub mod config;
pub mod device;
pub mod factory;
pub mod legacy;
pub mod module;
pub mod status;

pub use config::{FactoryConfig, InterfaceVersion};
pub use device::{Device, DeviceKind, DeviceReply, DynDevice, AUDIO_HARDWARE_MODULE_ID_PRIMARY};
pub use error::{Error, Result};
pub use factory::{DevicesFactory, ExtendedDevicesFactory, HalDevicesFactory};
pub use status::Status;

/// Re-exports commonly used types.
pub mod prelude {
    // Configuration
    pub use crate::config::{defaults, env_vars, paths, FactoryConfig, InterfaceVersion};

    // Error handling
    pub use crate::error::{Error, Result};

    // Devices
    pub use crate::device::{
        Device, DeviceInfo, DeviceKind, DeviceReply, DynDevice, DynPrimaryDevice, PrimaryDevice,
        PrimaryDeviceBuilder, AUDIO_HARDWARE_MODULE_ID_PRIMARY,
    };
    pub use crate::status::Status;

    // Factory
    pub use crate::factory::{
        DevicesFactory, Extended, ExtendedDevicesFactory, HalDevicesFactory,
        HalDevicesFactoryBuilder,
    };

    // Legacy modules
    pub use crate::legacy::abi::{FETCH_FACTORY_SYMBOL, LEGACY_ABI_VERSION};
    pub use crate::legacy::LegacyDevicesFactory;
    pub use crate::module::{DynamicModuleProvider, ModuleProvider, StaticModuleProvider};
}
