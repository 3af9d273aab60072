//! Device objects handed out by the factory.
//!
//! Devices are shared with callers through `Arc`; the factory keeps no
//! reference to anything it returns.

pub mod primary;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::status::Status;

pub use primary::{
    CoreDevice, DefaultPrimaryBuilder, DynPrimaryDevice, PrimaryDevice, PrimaryDeviceBuilder,
    StandardPrimaryDevice,
};

/// Reserved name of the built-in primary audio device module.
pub const AUDIO_HARDWARE_MODULE_ID_PRIMARY: &str = "primary";

/// Which implementation produced a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// Built-in primary device.
    Primary,
    /// Core device capability exposed by a primary device.
    Core,
    /// Device served by the legacy module.
    Legacy,
}

/// Identity of a device instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// Unique per constructed instance.
    pub id: Uuid,
    /// Name the device was opened with.
    pub name: String,
    pub kind: DeviceKind,
    pub created_at: DateTime<Utc>,
}

impl DeviceInfo {
    pub fn new(name: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            created_at: Utc::now(),
        }
    }
}

/// An opened audio device.
pub trait Device: Send + Sync + fmt::Debug {
    fn info(&self) -> &DeviceInfo;

    fn name(&self) -> &str {
        &self.info().name
    }

    fn kind(&self) -> DeviceKind {
        self.info().kind
    }
}

/// Dynamic device type.
pub type DynDevice = Arc<dyn Device>;

/// Status plus, on success, the opened device.
#[derive(Debug, Clone)]
pub struct DeviceReply {
    pub status: Status,
    pub device: Option<DynDevice>,
}

impl DeviceReply {
    pub fn new(status: Status, device: Option<DynDevice>) -> Self {
        Self { status, device }
    }

    /// `Ok` with a device.
    pub fn ok(device: DynDevice) -> Self {
        Self::new(Status::Ok, Some(device))
    }

    /// A status with no device.
    pub fn error(status: Status) -> Self {
        Self::new(status, None)
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    /// Split into the `(status, device)` pair the transport returns.
    pub fn into_parts(self) -> (Status, Option<DynDevice>) {
        (self.status, self.device)
    }
}
