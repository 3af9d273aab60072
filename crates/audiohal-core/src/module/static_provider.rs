//! Modules linked into the current binary.
//!
//! Serves entry points that were compiled in rather than loaded from disk,
//! keyed by the same module path a [`DynamicModuleProvider`] would open.
//!
//! [`DynamicModuleProvider`]: super::DynamicModuleProvider

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{LoadedModule, ModuleProvider};
use crate::error::{Error, Result};
use crate::legacy::abi::FetchFactoryFn;

/// A compiled-in module: a table of exported entry points.
#[derive(Debug, Clone)]
pub struct StaticModule {
    path: PathBuf,
    symbols: HashMap<String, FetchFactoryFn>,
}

impl LoadedModule for StaticModule {
    fn path(&self) -> &Path {
        &self.path
    }

    fn fetch_symbol(&self, symbol: &str) -> Result<FetchFactoryFn> {
        self.symbols
            .get(symbol)
            .copied()
            .ok_or_else(|| Error::symbol_not_found(&self.path, symbol, "symbol not exported"))
    }
}

/// Provider for compiled-in modules.
#[derive(Debug, Default, Clone)]
pub struct StaticModuleProvider {
    modules: HashMap<PathBuf, StaticModule>,
}

impl StaticModuleProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Export `func` as `symbol` from the module at `path`.
    pub fn with_symbol(
        mut self,
        path: impl Into<PathBuf>,
        symbol: impl Into<String>,
        func: FetchFactoryFn,
    ) -> Self {
        let path = path.into();
        self.modules
            .entry(path.clone())
            .or_insert_with(|| StaticModule {
                path,
                symbols: HashMap::new(),
            })
            .symbols
            .insert(symbol.into(), func);
        self
    }

    /// Register a module at `path` that exports nothing.
    pub fn with_empty_module(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.modules.entry(path.clone()).or_insert_with(|| StaticModule {
            path,
            symbols: HashMap::new(),
        });
        self
    }
}

impl ModuleProvider for StaticModuleProvider {
    fn load(&self, path: &Path) -> Result<Arc<dyn LoadedModule>> {
        let module = self
            .modules
            .get(path)
            .cloned()
            .ok_or_else(|| Error::module_load(path, "module not linked into this binary"))?;

        tracing::info!("Using compiled-in legacy module: {}", path.display());
        Ok(Arc::new(module))
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::c_char;

    use super::*;
    use crate::legacy::abi::{RawLegacyFactory, FETCH_FACTORY_SYMBOL};

    unsafe extern "C" fn fetch_nothing(_instance: *const c_char) -> *mut RawLegacyFactory {
        std::ptr::null_mut()
    }

    #[test]
    fn test_unknown_path() {
        let provider = StaticModuleProvider::new();
        let err = provider.load(Path::new("vendor/lib64/hw/x.so")).unwrap_err();
        assert!(matches!(err, Error::ModuleLoad { .. }));
    }

    #[test]
    fn test_symbol_lookup() {
        let provider = StaticModuleProvider::new()
            .with_symbol("hw/a.so", FETCH_FACTORY_SYMBOL, fetch_nothing)
            .with_empty_module("hw/b.so");

        let a = provider.load(Path::new("hw/a.so")).unwrap();
        assert_eq!(a.path(), Path::new("hw/a.so"));
        assert!(a.fetch_symbol(FETCH_FACTORY_SYMBOL).is_ok());

        let b = provider.load(Path::new("hw/b.so")).unwrap();
        let err = b.fetch_symbol(FETCH_FACTORY_SYMBOL).unwrap_err();
        assert!(matches!(err, Error::SymbolNotFound { .. }));
    }
}
