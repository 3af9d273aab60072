//! Shared-library modules loaded with `libloading`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::{Library, Symbol};

use super::{LoadedModule, ModuleProvider};
use crate::error::{Error, Result};
use crate::legacy::abi::FetchFactoryFn;

/// A shared library mapped into the process.
#[derive(Debug)]
pub struct DynamicModule {
    /// Kept alive until the last reference is dropped.
    library: Library,
    path: PathBuf,
}

impl DynamicModule {
    /// Load the library at `path`, resolving all of its symbols eagerly.
    ///
    /// An unresolved import fails here rather than on the first call into
    /// the module.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let library = load_now(path).map_err(|e| Error::module_load(path, e))?;

        tracing::info!("Loaded legacy module: {}", path.display());

        Ok(Self {
            library,
            path: path.to_path_buf(),
        })
    }
}

#[cfg(unix)]
fn load_now(path: &Path) -> std::result::Result<Library, libloading::Error> {
    use libloading::os::unix::{Library as UnixLibrary, RTLD_LOCAL, RTLD_NOW};

    // SAFETY: running a legacy module's initializers is the point of
    // loading it; the module path is fixed by configuration.
    let library = unsafe { UnixLibrary::open(Some(path), RTLD_NOW | RTLD_LOCAL) }?;
    Ok(library.into())
}

#[cfg(not(unix))]
fn load_now(path: &Path) -> std::result::Result<Library, libloading::Error> {
    // SAFETY: as above. Windows resolves imports at load time.
    unsafe { Library::new(path) }
}

impl LoadedModule for DynamicModule {
    fn path(&self) -> &Path {
        &self.path
    }

    fn fetch_symbol(&self, symbol: &str) -> Result<FetchFactoryFn> {
        // SAFETY: the entry point contract fixes the signature of this symbol
        // to `FetchFactoryFn`.
        let func: Symbol<FetchFactoryFn> = unsafe { self.library.get(symbol.as_bytes()) }
            .map_err(|e| Error::symbol_not_found(&self.path, symbol, e))?;

        tracing::debug!("Resolved `{}` in {}", symbol, self.path.display());
        Ok(*func)
    }
}

/// Loads modules from the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct DynamicModuleProvider;

impl DynamicModuleProvider {
    pub fn new() -> Self {
        Self
    }
}

impl ModuleProvider for DynamicModuleProvider {
    fn load(&self, path: &Path) -> Result<Arc<dyn LoadedModule>> {
        Ok(Arc::new(DynamicModule::open(path)?))
    }
}
