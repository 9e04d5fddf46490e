//! Command configuration loaded from `settle.toml`
//!
//! ```toml
//! [debounce]
//! delay_ms = 500
//!
//! [forward]
//! on_close = "flush"
//!
//! [search]
//! delay_ms = 300
//! page_size = 25
//! ```
//!
//! Every section and key is optional. Command-line flags override file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use settle_core::DebounceConfig;
use settle_forward::{ClosePolicy, DispatchConfig};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "settle.toml";

/// Settings for all commands
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub debounce: DebounceConfig,

    #[serde(default)]
    pub forward: ForwardConfig,

    #[serde(default)]
    pub search: DispatchConfig,
}

/// `[forward]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardConfig {
    /// What happens to a pending line at end of input (default: flush)
    #[serde(default)]
    pub on_close: ClosePolicy,
}

impl Settings {
    /// Load settings
    ///
    /// An explicit path must exist. Without one, `settle.toml` in the working
    /// directory is used if present, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path: PathBuf = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                default
            }
        };

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let settings = Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Parse and validate settings from TOML
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let settings: Self = toml::from_str(contents).context("Failed to parse TOML")?;
        settings.debounce.validate()?;
        settings.search.validate()?;
        Ok(settings)
    }

    /// Debounce config with an optional `--delay-ms` override applied
    pub fn debounce_with(&self, delay_ms: Option<u64>) -> Result<DebounceConfig> {
        let mut config = self.debounce.clone();
        if let Some(delay_ms) = delay_ms {
            config.delay_ms = delay_ms;
        }
        config.validate()?;
        Ok(config)
    }

    /// Search config with optional `--delay-ms` / `--page-size` overrides applied
    pub fn search_with(&self, delay_ms: Option<u64>, page_size: Option<u32>) -> Result<DispatchConfig> {
        let mut config = self.search.clone();
        if let Some(delay_ms) = delay_ms {
            config.delay_ms = delay_ms;
        }
        if let Some(page_size) = page_size {
            config.page_size = page_size;
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_empty_file_uses_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.debounce.delay_ms, 500);
        assert_eq!(settings.forward.on_close, ClosePolicy::Flush);
        assert_eq!(settings.search.page_size, 10);
    }

    #[test]
    fn test_full_file() {
        let settings = Settings::from_toml_str(
            "[debounce]\ndelay_ms = 250\n\n[forward]\non_close = \"discard\"\n\n[search]\ndelay_ms = 300\npage_size = 25\n",
        )
        .unwrap();

        assert_eq!(settings.debounce.delay_ms, 250);
        assert_eq!(settings.forward.on_close, ClosePolicy::Discard);
        assert_eq!(settings.search.delay_ms, 300);
        assert_eq!(settings.search.page_size, 25);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Settings::from_toml_str("[search]\npage_size = 1000\n").is_err());
        assert!(Settings::from_toml_str("[forward]\non_close = \"later\"\n").is_err());
        assert!(Settings::from_toml_str("[debounce]\ndelay_ms = 99999999999\n").is_err());
    }

    #[test]
    fn test_flag_overrides() {
        let settings = Settings::default();
        assert_eq!(settings.debounce_with(Some(50)).unwrap().delay_ms, 50);
        assert_eq!(settings.debounce_with(None).unwrap().delay_ms, 500);

        let search = settings.search_with(None, Some(50)).unwrap();
        assert_eq!(search.page_size, 50);
        assert_eq!(search.delay_ms, 500);
        assert!(settings.search_with(None, Some(0)).is_err());
    }

    #[test]
    fn test_load_explicit_path() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("custom.toml");
        fs::write(&path, "[debounce]\ndelay_ms = 75\n")?;

        let settings = Settings::load(Some(&path))?;
        assert_eq!(settings.debounce.delay_ms, 75);

        assert!(Settings::load(Some(&temp_dir.path().join("missing.toml"))).is_err());
        Ok(())
    }
}
