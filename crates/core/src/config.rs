//! Debounce configuration

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Quiet period used when none is configured
pub const DEFAULT_DELAY_MS: u64 = 500;

/// Upper bound accepted for `delay_ms` (one hour)
pub const MAX_DELAY_MS: u64 = 60 * 60 * 1000;

/// Debounce configuration
///
/// ```toml
/// [debounce]
/// delay_ms = 300
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebounceConfig {
    /// Quiet period in milliseconds (default: 500)
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY_MS,
        }
    }
}

impl DebounceConfig {
    /// Create a config with the given delay in milliseconds
    pub fn with_delay_ms(delay_ms: u64) -> Self {
        Self { delay_ms }
    }

    /// Quiet period as a `Duration`
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Check that values are within their valid ranges
    pub fn validate(&self) -> Result<()> {
        if self.delay_ms > MAX_DELAY_MS {
            return Err(Error::Config(format!(
                "delay_ms must be between 0 and {} (got {})",
                MAX_DELAY_MS, self.delay_ms
            )));
        }
        Ok(())
    }

    /// Parse and validate a TOML document containing only debounce keys
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

fn default_delay_ms() -> u64 {
    DEFAULT_DELAY_MS
}
