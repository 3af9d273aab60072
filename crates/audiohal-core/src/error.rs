//! Unified error handling for the audio HAL factory.
//!
//! Construction of the devices factory can fail in a handful of ways, all of
//! which leave the process without a usable legacy backend. Request-time
//! failures are not errors in this sense: they travel back to the caller as a
//! [`Status`](crate::status::Status) inside a reply.

use std::path::PathBuf;

/// Unified error type for the audio HAL factory.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The legacy module could not be loaded into the process.
    #[error("Failed to load legacy module {}: {message}", path.display())]
    ModuleLoad { path: PathBuf, message: String },

    /// The legacy module does not export the requested entry point.
    #[error("Symbol `{symbol}` not found in {}: {message}", path.display())]
    SymbolNotFound {
        path: PathBuf,
        symbol: String,
        message: String,
    },

    /// The entry point ran but did not hand back a factory object.
    #[error("Legacy factory entry point returned null for instance `{instance}`")]
    NullFactory { instance: String },

    /// The legacy factory object was built against a different ABI.
    #[error("Legacy module ABI version mismatch: expected {expected}, found {found}")]
    AbiMismatch { expected: u32, found: u32 },

    /// Device-related errors (capability queries, device construction).
    #[error("Device error: {0}")]
    Device(String),

    /// Serialization/deserialization errors.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for convenience.
pub type Result<T> = std::result::Result<T, Error>;

/// Convenience macros for creating errors.
#[macro_export]
macro_rules! config_err {
    ($msg:expr) => {
        $crate::error::Error::Config($msg.into())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::Error::Config(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! device_err {
    ($msg:expr) => {
        $crate::error::Error::Device($msg.into())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::Error::Device(format!($fmt, $($arg)*))
    };
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

// Convenience constructors for common errors
impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn device(msg: impl Into<String>) -> Self {
        Self::Device(msg.into())
    }

    pub fn module_load(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::ModuleLoad {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn symbol_not_found(
        path: impl Into<PathBuf>,
        symbol: impl Into<String>,
        message: impl ToString,
    ) -> Self {
        Self::SymbolNotFound {
            path: path.into(),
            symbol: symbol.into(),
            message: message.to_string(),
        }
    }

    /// Whether this error means the factory cannot exist at all.
    ///
    /// A factory that cannot reach its legacy backend must not run in a
    /// degraded state, so the production entry point aborts on these.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ModuleLoad { .. }
                | Error::SymbolNotFound { .. }
                | Error::NullFactory { .. }
                | Error::AbiMismatch { .. }
        )
    }
}
