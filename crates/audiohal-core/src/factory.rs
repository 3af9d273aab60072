//! Devices factory: routes device-open requests.
//!
//! Requests for the reserved `"primary"` name are served by a locally built
//! primary device; every other name is forwarded verbatim to the legacy
//! factory obtained from the loaded module. Callers cannot tell which path
//! served them.
//!
//! # Interface revisions
//!
//! [`DevicesFactory`] holds the entry points every revision has. Revisions
//! from 7.1 on add [`ExtendedDevicesFactory`], reachable through
//! [`HalDevicesFactory::extended`]. The primary 7.1 calls are always served
//! locally; a legacy module without its own 7.1 entry point answers
//! delegated 7.1 requests with `NOT_SUPPORTED`.

use std::sync::Arc;

use crate::config::{FactoryConfig, InterfaceVersion};
use crate::device::{
    DefaultPrimaryBuilder, DeviceReply, PrimaryDeviceBuilder, AUDIO_HARDWARE_MODULE_ID_PRIMARY,
};
use crate::error::Result;
use crate::legacy::{LegacyDevicesFactory, NativeLegacyFactory};
use crate::module::{DynamicModuleProvider, ModuleProvider};
use crate::status::Status;

/// Entry points present in every interface revision.
pub trait DevicesFactory: Send + Sync {
    /// `openDevice`.
    fn open_device(&self, name: &str) -> DeviceReply;

    /// `openPrimaryDevice`.
    fn open_primary_device(&self) -> DeviceReply;
}

/// Entry points added in interface revision 7.1.
pub trait ExtendedDevicesFactory: DevicesFactory {
    /// `openDevice_7_1`.
    fn open_device_7_1(&self, name: &str) -> DeviceReply;

    /// `openPrimaryDevice_7_1`.
    fn open_primary_device_7_1(&self) -> DeviceReply;
}

/// The devices factory.
pub struct HalDevicesFactory {
    version: InterfaceVersion,
    primary: Arc<dyn PrimaryDeviceBuilder>,
    legacy: Arc<dyn LegacyDevicesFactory>,
}

impl HalDevicesFactory {
    /// Load the legacy module named by `config` from the filesystem.
    pub fn new(config: &FactoryConfig) -> Result<Self> {
        Self::builder(config.clone()).build()
    }

    /// Like [`new`](Self::new), but a construction failure terminates the
    /// process after logging it.
    pub fn load_or_abort(config: &FactoryConfig) -> Self {
        Self::builder(config.clone()).build_or_abort()
    }

    pub fn builder(config: FactoryConfig) -> HalDevicesFactoryBuilder {
        HalDevicesFactoryBuilder::new(config)
    }

    /// Assemble a factory around an already constructed legacy delegate.
    pub fn from_parts(
        version: InterfaceVersion,
        legacy: Arc<dyn LegacyDevicesFactory>,
        primary: Arc<dyn PrimaryDeviceBuilder>,
    ) -> Self {
        Self {
            version,
            primary,
            legacy,
        }
    }

    /// Interface revision this factory serves.
    pub fn version(&self) -> InterfaceVersion {
        self.version
    }

    /// The 7.1 entry points, if the configured revision has them.
    pub fn extended(&self) -> Option<Extended<'_>> {
        if self.version.has_extended_open() {
            Some(Extended { factory: self })
        } else {
            None
        }
    }

    fn primary_reply(&self) -> DeviceReply {
        DeviceReply::ok(self.primary.build().into_device())
    }
}

impl DevicesFactory for HalDevicesFactory {
    fn open_device(&self, name: &str) -> DeviceReply {
        if name == AUDIO_HARDWARE_MODULE_ID_PRIMARY {
            tracing::debug!("Opening built-in primary device");
            self.primary_reply()
        } else {
            tracing::debug!("Delegating `{}` to legacy factory", name);
            self.legacy.open_device(name)
        }
    }

    fn open_primary_device(&self) -> DeviceReply {
        self.primary_reply()
    }
}

impl std::fmt::Debug for HalDevicesFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HalDevicesFactory")
            .field("version", &self.version)
            .field("extended", &self.extended().is_some())
            .finish()
    }
}

/// 7.1 view of a [`HalDevicesFactory`].
#[derive(Clone, Copy)]
pub struct Extended<'a> {
    factory: &'a HalDevicesFactory,
}

impl DevicesFactory for Extended<'_> {
    fn open_device(&self, name: &str) -> DeviceReply {
        self.factory.open_device(name)
    }

    fn open_primary_device(&self) -> DeviceReply {
        self.factory.open_primary_device()
    }
}

impl ExtendedDevicesFactory for Extended<'_> {
    fn open_device_7_1(&self, name: &str) -> DeviceReply {
        if name != AUDIO_HARDWARE_MODULE_ID_PRIMARY {
            tracing::debug!("Delegating `{}` to legacy factory (7.1)", name);
            return self.factory.legacy.open_device_7_1(name);
        }

        let primary = self.factory.primary.build();
        match primary.get_device() {
            Ok(device) => DeviceReply::ok(device),
            Err(e) => {
                tracing::warn!("Primary device capability query failed: {}", e);
                DeviceReply::error(Status::NotInitialized)
            }
        }
    }

    fn open_primary_device_7_1(&self) -> DeviceReply {
        self.factory.primary_reply()
    }
}

/// Builder for [`HalDevicesFactory`].
pub struct HalDevicesFactoryBuilder {
    config: FactoryConfig,
    provider: Arc<dyn ModuleProvider>,
    primary: Arc<dyn PrimaryDeviceBuilder>,
}

impl HalDevicesFactoryBuilder {
    pub fn new(config: FactoryConfig) -> Self {
        Self {
            config,
            provider: Arc::new(DynamicModuleProvider::new()),
            primary: Arc::new(DefaultPrimaryBuilder),
        }
    }

    /// Load modules through `provider` instead of the filesystem.
    pub fn module_provider(mut self, provider: impl ModuleProvider + 'static) -> Self {
        self.provider = Arc::new(provider);
        self
    }

    /// Build primary devices with `builder`.
    pub fn primary_builder(mut self, builder: impl PrimaryDeviceBuilder + 'static) -> Self {
        self.primary = Arc::new(builder);
        self
    }

    /// Load the legacy module, resolve its entry point and fetch the legacy
    /// factory. Every step must succeed.
    pub fn build(self) -> Result<HalDevicesFactory> {
        self.config.validate()?;

        let path = self.config.module_path();
        let module = self.provider.load(&path)?;
        let legacy = NativeLegacyFactory::fetch(module, &self.config.instance_name)?;

        tracing::info!(
            "Devices factory ready: version {}, legacy module {}, extended open {}",
            self.config.hal_version,
            path.display(),
            legacy.supports_extended_open()
        );

        Ok(HalDevicesFactory::from_parts(
            self.config.hal_version,
            Arc::new(legacy),
            self.primary,
        ))
    }

    /// [`build`](Self::build), terminating the process on failure.
    pub fn build_or_abort(self) -> HalDevicesFactory {
        match self.build() {
            Ok(factory) => factory,
            Err(e) => {
                tracing::error!("Cannot construct devices factory: {}", e);
                eprintln!("FATAL: cannot construct devices factory: {}", e);
                std::process::abort()
            }
        }
    }
}
