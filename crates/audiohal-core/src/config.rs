//! Factory configuration.
//!
//! Defaults live in the constant modules below so the CLI, tests and any
//! embedding service agree on the module path contract. A [`FactoryConfig`]
//! starts from those defaults and can be overridden from a TOML file and from
//! environment variables.

use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Revision of the devices factory interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InterfaceVersion {
    pub major: u8,
    pub minor: u8,
}

impl InterfaceVersion {
    pub const V6_0: Self = Self::new(6, 0);
    pub const V7_0: Self = Self::new(7, 0);
    pub const V7_1: Self = Self::new(7, 1);

    /// Revisions this crate knows how to serve.
    pub const KNOWN: [Self; 3] = [Self::V6_0, Self::V7_0, Self::V7_1];

    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// Whether this revision defines `openDevice_7_1` / `openPrimaryDevice_7_1`.
    pub fn has_extended_open(self) -> bool {
        self >= Self::V7_1
    }
}

impl Default for InterfaceVersion {
    fn default() -> Self {
        defaults::HAL_VERSION
    }
}

impl Display for InterfaceVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for InterfaceVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (major, minor) = s
            .trim()
            .split_once('.')
            .ok_or_else(|| config_err!("interface version must look like MAJOR.MINOR, got `{}`", s))?;
        let major = major
            .parse()
            .map_err(|_| config_err!("invalid major version in `{}`", s))?;
        let minor = minor
            .parse()
            .map_err(|_| config_err!("invalid minor version in `{}`", s))?;
        let version = Self::new(major, minor);

        if !Self::KNOWN.contains(&version) {
            return Err(config_err!("unsupported interface version {}", version));
        }
        Ok(version)
    }
}

impl TryFrom<String> for InterfaceVersion {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<InterfaceVersion> for String {
    fn from(v: InterfaceVersion) -> Self {
        v.to_string()
    }
}

/// Module path constants.
pub mod paths {
    /// Library directory on 64-bit targets.
    pub const LIB_DIR_64: &str = "vendor/lib64";
    /// Library directory on 32-bit targets.
    pub const LIB_DIR_32: &str = "vendor/lib";
    /// Subdirectory holding HAL modules.
    pub const HW_SUBDIR: &str = "hw";
    /// Filename prefix; the interface version follows the `@`.
    pub const MODULE_PREFIX: &str = "android.hardware.audio.legacy@";
    /// Filename infix between the version and the variant.
    pub const MODULE_INFIX: &str = "-impl";
    /// Shared library suffix.
    pub const MODULE_SUFFIX: &str = "so";

    /// Library directory for the target being built.
    pub fn default_lib_dir() -> &'static str {
        if cfg!(target_pointer_width = "64") {
            LIB_DIR_64
        } else {
            LIB_DIR_32
        }
    }
}

/// Default values.
pub mod defaults {
    use super::InterfaceVersion;

    /// Interface revision this build serves unless configured otherwise.
    pub const HAL_VERSION: InterfaceVersion = InterfaceVersion::V7_1;
    /// Legacy module variant (board/vendor tag in the filename).
    pub const VARIANT: &str = "rpi";
    /// Instance name passed to the legacy entry point.
    pub const INSTANCE_NAME: &str = "default";
}

/// Environment variable names.
pub mod env_vars {
    pub const LIB_DIR: &str = "AUDIOHAL_LIB_DIR";
    pub const HAL_VERSION: &str = "AUDIOHAL_HAL_VERSION";
    pub const MODULE_VARIANT: &str = "AUDIOHAL_MODULE_VARIANT";
    pub const INSTANCE: &str = "AUDIOHAL_INSTANCE";
}

/// Configuration for constructing a devices factory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Directory containing the `hw/` module directory.
    pub lib_dir: PathBuf,
    /// Interface revision; also selects the legacy module filename.
    pub hal_version: InterfaceVersion,
    /// Legacy module variant.
    pub variant: String,
    /// Instance name handed to the legacy entry point.
    pub instance_name: String,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            lib_dir: PathBuf::from(paths::default_lib_dir()),
            hal_version: defaults::HAL_VERSION,
            variant: defaults::VARIANT.to_string(),
            instance_name: defaults::INSTANCE_NAME.to_string(),
        }
    }
}

impl FactoryConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| config_err!("cannot read {}: {}", path.display(), e))?;
        Self::from_toml_str(&contents)
    }

    /// Override fields from the `AUDIOHAL_*` environment variables.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(dir) = std::env::var(env_vars::LIB_DIR) {
            self.lib_dir = PathBuf::from(dir);
        }
        if let Ok(version) = std::env::var(env_vars::HAL_VERSION) {
            self.hal_version = version.parse()?;
        }
        if let Ok(variant) = std::env::var(env_vars::MODULE_VARIANT) {
            self.variant = variant;
        }
        if let Ok(instance) = std::env::var(env_vars::INSTANCE) {
            self.instance_name = instance;
        }
        self.validate()
    }

    pub fn with_lib_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.lib_dir = dir.into();
        self
    }

    pub fn with_hal_version(mut self, version: InterfaceVersion) -> Self {
        self.hal_version = version;
        self
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = variant.into();
        self
    }

    pub fn with_instance_name(mut self, instance: impl Into<String>) -> Self {
        self.instance_name = instance.into();
        self
    }

    /// Check values that end up in a filename or cross the C boundary.
    pub fn validate(&self) -> Result<()> {
        if self.variant.is_empty() {
            return Err(config_err!("module variant must not be empty"));
        }
        if self.variant.contains(['/', '\\']) {
            return Err(config_err!("module variant `{}` contains a path separator", self.variant));
        }
        if self.instance_name.is_empty() || self.instance_name.contains('\0') {
            return Err(config_err!("invalid instance name `{}`", self.instance_name));
        }
        Ok(())
    }

    /// Legacy module filename, e.g. `android.hardware.audio.legacy@7.1-impl.rpi.so`.
    pub fn module_file_name(&self) -> String {
        format!(
            "{}{}{}.{}.{}",
            paths::MODULE_PREFIX,
            self.hal_version,
            paths::MODULE_INFIX,
            self.variant,
            paths::MODULE_SUFFIX
        )
    }

    /// Full path of the legacy module: `<lib_dir>/hw/<file name>`.
    pub fn module_path(&self) -> PathBuf {
        self.lib_dir
            .join(paths::HW_SUBDIR)
            .join(self.module_file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_module_path() {
        let config = FactoryConfig::default();

        #[cfg(target_pointer_width = "64")]
        assert_eq!(
            config.module_path(),
            PathBuf::from("vendor/lib64/hw/android.hardware.audio.legacy@7.1-impl.rpi.so")
        );

        #[cfg(target_pointer_width = "32")]
        assert_eq!(
            config.module_path(),
            PathBuf::from("vendor/lib/hw/android.hardware.audio.legacy@7.1-impl.rpi.so")
        );
    }

    #[test]
    fn test_version_selects_file_name() {
        let config = FactoryConfig::default()
            .with_hal_version(InterfaceVersion::V7_0)
            .with_variant("generic");
        assert_eq!(
            config.module_file_name(),
            "android.hardware.audio.legacy@7.0-impl.generic.so"
        );
    }

    #[test]
    fn test_parse_interface_version() {
        assert_eq!("7.1".parse::<InterfaceVersion>().unwrap(), InterfaceVersion::V7_1);
        assert_eq!(" 6.0 ".parse::<InterfaceVersion>().unwrap(), InterfaceVersion::V6_0);
        assert!("7".parse::<InterfaceVersion>().is_err());
        assert!("seven.one".parse::<InterfaceVersion>().is_err());
        assert!("9.9".parse::<InterfaceVersion>().is_err());
    }

    #[test]
    fn test_extended_open_gate() {
        assert!(!InterfaceVersion::V6_0.has_extended_open());
        assert!(!InterfaceVersion::V7_0.has_extended_open());
        assert!(InterfaceVersion::V7_1.has_extended_open());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = FactoryConfig::from_toml_str(
            r#"
            hal_version = "7.0"
            variant = "generic"
            "#,
        )
        .unwrap();

        assert_eq!(config.hal_version, InterfaceVersion::V7_0);
        assert_eq!(config.variant, "generic");
        assert_eq!(config.instance_name, defaults::INSTANCE_NAME);
        assert_eq!(config.lib_dir, PathBuf::from(paths::default_lib_dir()));
    }

    #[test]
    fn test_from_toml_rejects_unknown_version() {
        let err = FactoryConfig::from_toml_str(r#"hal_version = "5.0""#).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_validate_rejects_path_in_variant() {
        let config = FactoryConfig::default().with_variant("../evil");
        assert!(config.validate().is_err());

        let config = FactoryConfig::default().with_instance_name("");
        assert!(config.validate().is_err());
    }
}
