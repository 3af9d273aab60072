//! Legacy module loading.
//!
//! A [`ModuleProvider`] turns a module path into a [`LoadedModule`], which in
//! turn resolves the factory entry point. The module stays mapped for as long
//! as any `Arc<dyn LoadedModule>` is alive; dropping the last one unloads it.

pub mod dynamic;
pub mod static_provider;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::legacy::abi::FetchFactoryFn;

pub use dynamic::{DynamicModule, DynamicModuleProvider};
pub use static_provider::{StaticModule, StaticModuleProvider};

/// Loads legacy modules.
pub trait ModuleProvider: Send + Sync {
    /// Load the module at `path` into the process.
    fn load(&self, path: &Path) -> Result<Arc<dyn LoadedModule>>;
}

/// A module loaded into the process.
pub trait LoadedModule: Send + Sync + fmt::Debug {
    /// Path the module was loaded from.
    fn path(&self) -> &Path;

    /// Resolve a factory entry point exported under `symbol`.
    ///
    /// The returned function pointer is only valid while this module is
    /// loaded; callers must keep the `Arc` alive alongside it.
    fn fetch_symbol(&self, symbol: &str) -> Result<FetchFactoryFn>;
}
