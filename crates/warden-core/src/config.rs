use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{WardenError, WardenResult};

/// Configuration for the status monitor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Milliseconds between polling ticks
    pub poll_interval_ms: u64,
    /// Milliseconds to wait for a service to leave a pending state before
    /// the outcome counts as a startup failure
    pub startup_timeout_ms: u64,
}

impl MonitorConfig {
    /// Polling interval as a `Duration`
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Startup timeout as a `Duration`
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 5_000,
            startup_timeout_ms: 30_000,
        }
    }
}

/// Configuration for a Warden installation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WardenConfig {
    /// Path of the JSON record store
    pub store_path: PathBuf,
    /// Path of the service-wrapper executable the gateway invokes
    pub wrapper_path: PathBuf,
    /// Directory the generated wrapper configuration artifacts land in
    pub artifact_dir: PathBuf,
    /// Monitor settings
    #[serde(default)]
    pub monitor: MonitorConfig,
}

impl WardenConfig {
    /// Create a configuration rooted at the given data directory
    pub fn new(data_dir: PathBuf, wrapper_path: PathBuf) -> Self {
        Self {
            store_path: data_dir.join("services.json"),
            wrapper_path,
            artifact_dir: data_dir.join("artifacts"),
            monitor: MonitorConfig::default(),
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> WardenResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> WardenResult<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> WardenResult<()> {
        if !self.wrapper_path.is_absolute() {
            return Err(WardenError::config(format!(
                "wrapper path must be absolute: {}",
                self.wrapper_path.display()
            )));
        }
        if self.monitor.poll_interval_ms == 0 {
            return Err(WardenError::config("poll interval must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_monitor_interval() {
        let config = MonitorConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let config = WardenConfig::new(dir.path().to_path_buf(), PathBuf::from("/usr/bin/winsw"));
        let path = dir.path().join("warden.toml");
        config.save(&path).unwrap();

        let loaded = WardenConfig::from_file(&path).unwrap();
        assert_eq!(loaded.wrapper_path, config.wrapper_path);
        assert_eq!(loaded.monitor.poll_interval_ms, 5_000);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = WardenConfig::new(PathBuf::from("/var/lib/warden"), PathBuf::from("/usr/bin/winsw"));
        config.monitor.poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }
}
