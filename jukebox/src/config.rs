use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(1000);
pub const DEFAULT_ASSETS_DIR: &str = "assets";

/// Configuration for the playback service and the screens bound to it
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// How often the service samples the engine and pushes progress
    pub sample_interval: Duration,

    /// How often a visible playback screen polls position while playing
    pub refresh_interval: Duration,

    /// Directory holding the bundled audio files
    pub assets_dir: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            assets_dir: PathBuf::from(DEFAULT_ASSETS_DIR),
        }
    }
}

impl ServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = interval;
        self
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn with_assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = dir.into();
        self
    }

    /// Validate the timing configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_interval.is_zero() {
            return Err(ConfigError::InvalidInterval {
                name: "sample",
                value: self.sample_interval,
            });
        }

        if self.refresh_interval.is_zero() {
            return Err(ConfigError::InvalidInterval {
                name: "refresh",
                value: self.refresh_interval,
            });
        }

        Ok(())
    }

    /// Validate that the assets directory exists
    ///
    /// Only engines that read bundled files need this.
    pub fn validate_assets(&self) -> Result<(), ConfigError> {
        if self.assets_dir.is_dir() {
            Ok(())
        } else {
            Err(ConfigError::MissingAssets(self.assets_dir.clone()))
        }
    }
}
