//! Legacy Module Tests
//!
//! Hosts a module written with the SDK inside the devices factory, the same
//! way a module loaded from disk would be hosted.

use std::sync::atomic::{AtomicUsize, Ordering};

use audiohal_core::prelude::{
    Device, DeviceKind, DevicesFactory, ExtendedDevicesFactory, FactoryConfig, HalDevicesFactory,
    StaticModuleProvider, AUDIO_HARDWARE_MODULE_ID_PRIMARY,
};
use audiohal_legacy_sdk::prelude::*;

static OPEN_CARDS: AtomicUsize = AtomicUsize::new(0);
static TRACKED_CARDS: AtomicUsize = AtomicUsize::new(0);

struct TestModule {
    instance: String,
}

struct Card {
    tracked: bool,
}

impl Card {
    fn open(tracked: bool) -> Self {
        OPEN_CARDS.fetch_add(1, Ordering::SeqCst);
        if tracked {
            TRACKED_CARDS.fetch_add(1, Ordering::SeqCst);
        }
        Self { tracked }
    }
}

impl Drop for Card {
    fn drop(&mut self) {
        OPEN_CARDS.fetch_sub(1, Ordering::SeqCst);
        if self.tracked {
            TRACKED_CARDS.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl LegacyModule for TestModule {
    type Device = Card;

    const SUPPORTS_EXTENDED_OPEN: bool = true;

    fn create(instance: &str) -> Option<Self> {
        Some(Self {
            instance: instance.to_string(),
        })
    }

    fn open_device(&self, name: &str) -> Result<Card, Status> {
        assert_eq!(self.instance, "default");
        match name {
            "usb" => Ok(Card::open(false)),
            "tracked" => Ok(Card::open(true)),
            "r_submix" => Err(Status::NotSupported),
            _ => Err(Status::InvalidArguments),
        }
    }

    fn open_device_7_1(&self, name: &str) -> Result<Card, Status> {
        self.open_device(name)
    }
}

export_legacy_factory!(TestModule);

fn factory() -> HalDevicesFactory {
    let config = FactoryConfig::default().with_lib_dir("/sdk-test/vendor/lib64");
    let provider = StaticModuleProvider::new().with_symbol(
        config.module_path(),
        FETCH_FACTORY_SYMBOL,
        HIDL_FETCH_IDevicesFactory,
    );
    HalDevicesFactory::builder(config)
        .module_provider(provider)
        .build()
        .expect("SDK module should load")
}

#[test]
fn test_sdk_module_serves_devices() {
    let factory = factory();

    let reply = factory.open_device("usb");
    assert_eq!(reply.status, Status::Ok);
    let usb = reply.device.unwrap();
    assert_eq!(usb.kind(), DeviceKind::Legacy);
    assert!(OPEN_CARDS.load(Ordering::SeqCst) >= 1);

    let reply = factory.open_device("r_submix");
    assert_eq!(reply.status, Status::NotSupported);
    assert!(reply.device.is_none());

    let reply = factory.open_device("nonexistent");
    assert_eq!(reply.status, Status::InvalidArguments);

    // Primary stays in-process.
    let reply = factory.open_device(AUDIO_HARDWARE_MODULE_ID_PRIMARY);
    assert_eq!(reply.device.unwrap().kind(), DeviceKind::Primary);
}

#[test]
fn test_sdk_module_extended_open() {
    let factory = factory();
    let extended = factory.extended().expect("module exports openDevice_7_1");

    let reply = extended.open_device_7_1("usb");
    assert_eq!(reply.status, Status::Ok);
    assert_eq!(reply.device.unwrap().name(), "usb");
}

#[test]
fn test_device_state_released_on_drop() {
    let factory = factory();
    let device = factory.open_device("tracked").device.unwrap();
    assert_eq!(TRACKED_CARDS.load(Ordering::SeqCst), 1);

    // The device keeps working state after the factory is gone.
    drop(factory);
    assert_eq!(TRACKED_CARDS.load(Ordering::SeqCst), 1);

    drop(device);
    assert_eq!(TRACKED_CARDS.load(Ordering::SeqCst), 0);
}
