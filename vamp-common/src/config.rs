//! Configuration loading
//!
//! Bootstrap configuration for the playback engine, loaded from a TOML
//! file. Missing file or missing fields fall back to built-in defaults
//! defined in code, not external files.
//!
//! Resolution order:
//! 1. Explicit path handed in by the caller
//! 2. `<config dir>/vamp/config.toml` (user config directory)
//! 3. Built-in defaults

use crate::error::{Error, Result};
use crate::time::Seconds;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Engine bootstrap configuration
///
/// These settings cannot change during a run; the command loop constructs
/// the platform once from the loaded values.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Fixed seek size for forward/backward, in virtual time units
    #[serde(default = "default_seek_step")]
    pub seek_step: Seconds,

    /// Duration of the synthetic ad-break interstitial
    #[serde(default = "default_ad_break_duration")]
    pub ad_break_duration: Seconds,
}

fn default_seek_step() -> Seconds {
    90
}

fn default_ad_break_duration() -> Seconds {
    10
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seek_step: default_seek_step(),
            ad_break_duration: default_ad_break_duration(),
        }
    }
}

impl EngineConfig {
    /// Load configuration, falling back to built-in defaults
    ///
    /// An explicit path that does not exist or fails to parse is an error;
    /// an absent default-location file is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        if let Some(path) = default_config_path() {
            if path.exists() {
                return Self::from_file(&path);
            }
            debug!("No config file at {:?}, using built-in defaults", path);
        }

        Ok(Self::default())
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {:?}: {}", path, e)))?;
        info!("Loaded engine config from {:?}", path);
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.seek_step == 0 {
            return Err(Error::Config("seek_step must be non-zero".to_string()));
        }
        if self.ad_break_duration == 0 {
            return Err(Error::Config(
                "ad_break_duration must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default configuration file path for the platform
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("vamp").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.seek_step, 90);
        assert_eq!(config.ad_break_duration, 10);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seek_step = 30").unwrap();

        let config = EngineConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.seek_step, 30);
        // Unspecified field keeps its built-in default
        assert_eq!(config.ad_break_duration, 10);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = EngineConfig::load(Some(Path::new("/nonexistent/vamp.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seek_step = 0").unwrap();

        let result = EngineConfig::load(Some(file.path()));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_garbage_toml_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seek_step = \"ninety\"").unwrap();

        let result = EngineConfig::load(Some(file.path()));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
