//! Listener configuration.
//!
//! Values are layered, later sources winning:
//!
//! 1. built-in defaults (`127.0.0.1:20777`, 64 buffered samples)
//! 2. a YAML file named by `RALLYWIRE_CONFIG`
//! 3. the `RALLYWIRE_UDP` and `RALLYWIRE_CAPACITY` environment variables
//!
//! ```rust
//! use rallywire::ListenerConfig;
//!
//! let config = ListenerConfig::from_yaml_str("addr: 0.0.0.0:20778\n").unwrap();
//! assert_eq!(config.addr, "0.0.0.0:20778");
//! assert_eq!(config.channel_capacity, 64);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::distributor::Distributor;
use crate::{Result, TelemetryError};

/// Default address the simulator sends telemetry to.
pub const DEFAULT_ADDR: &str = "127.0.0.1:20777";

/// Environment variable naming a YAML configuration file.
pub const CONFIG_PATH_ENV: &str = "RALLYWIRE_CONFIG";

/// Environment variable overriding the listen address.
pub const ADDR_ENV: &str = "RALLYWIRE_UDP";

/// Environment variable overriding the per-subscriber buffer.
pub const CAPACITY_ENV: &str = "RALLYWIRE_CAPACITY";

/// Settings for [`TelemetryListener`](crate::TelemetryListener).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListenerConfig {
    /// Local `host:port` to bind the UDP socket to
    pub addr: String,
    /// Samples buffered per subscriber before the oldest are dropped,
    /// rounded up to a power of two
    pub channel_capacity: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self { addr: DEFAULT_ADDR.to_string(), channel_capacity: Distributor::DEFAULT_CAPACITY }
    }
}

impl ListenerConfig {
    /// Configuration listening on `addr` with default buffering.
    pub fn with_addr(addr: impl Into<String>) -> Self {
        Self { addr: addr.into(), ..Self::default() }
    }

    /// Load from the process environment.
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the process environment.
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base = match lookup(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = base.with_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML document. Missing keys take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml)
            .map_err(|e| TelemetryError::config("YAML configuration", e.to_string()))
    }

    /// Read and parse a YAML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Reading listener configuration");

        let contents =
            std::fs::read_to_string(path).map_err(|e| TelemetryError::config_file(path, e))?;
        serde_yaml_ng::from_str(&contents).map_err(|e| TelemetryError::config_file(path, e))
    }

    /// Apply environment overrides on top of this configuration.
    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(addr) = lookup(ADDR_ENV) {
            self.addr = addr;
        }

        if let Some(capacity) = lookup(CAPACITY_ENV) {
            self.channel_capacity = capacity.trim().parse().map_err(|_| {
                TelemetryError::config(CAPACITY_ENV, format!("'{}' is not a number", capacity))
            })?;
        }

        Ok(self)
    }

    /// Check values before use.
    pub fn validate(&self) -> Result<()> {
        if self.addr.trim().is_empty() {
            return Err(TelemetryError::config("addr", "listen address is empty"));
        }

        if self.channel_capacity == 0 {
            return Err(TelemetryError::config("channel_capacity", "must be at least 1"));
        }

        if self.channel_capacity > Distributor::MAX_CAPACITY {
            return Err(TelemetryError::config(
                "channel_capacity",
                format!(
                    "{} exceeds the maximum of {}",
                    self.channel_capacity,
                    Distributor::MAX_CAPACITY
                ),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_simulator_defaults() {
        let config = ListenerConfig::load_with(env(&[])).unwrap();
        assert_eq!(config.addr, "127.0.0.1:20777");
        assert_eq!(config.channel_capacity, 64);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = ListenerConfig::load_with(env(&[
            (ADDR_ENV, "localhost:30000"),
            (CAPACITY_ENV, " 8 "),
        ]))
        .unwrap();

        assert_eq!(config.addr, "localhost:30000");
        assert_eq!(config.channel_capacity, 8);
    }

    #[test]
    fn non_numeric_capacity_is_rejected() {
        let error = ListenerConfig::load_with(env(&[(CAPACITY_ENV, "lots")])).unwrap_err();
        assert!(matches!(error, TelemetryError::Config { .. }));
        assert!(error.to_string().contains("lots"));
    }

    #[test]
    fn file_then_environment() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "addr: 0.0.0.0:20778").unwrap();
        writeln!(file, "channel_capacity: 16").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let from_file =
            ListenerConfig::load_with(env(&[(CONFIG_PATH_ENV, path.as_str())])).unwrap();
        assert_eq!(
            from_file,
            ListenerConfig { addr: "0.0.0.0:20778".into(), channel_capacity: 16 }
        );

        let overridden = ListenerConfig::load_with(env(&[
            (CONFIG_PATH_ENV, path.as_str()),
            (ADDR_ENV, "127.0.0.1:9999"),
        ]))
        .unwrap();
        assert_eq!(overridden.addr, "127.0.0.1:9999");
        assert_eq!(overridden.channel_capacity, 16);
    }

    #[test]
    fn missing_file_reports_path() {
        let error = ListenerConfig::from_file("/definitely/not/here.yaml").unwrap_err();
        match error {
            TelemetryError::ConfigFile { path, .. } => {
                assert_eq!(path, Path::new("/definitely/not/here.yaml"));
            }
            other => panic!("Expected ConfigFile error, got {other:?}"),
        }
    }

    #[test]
    fn oversized_capacity_is_rejected() {
        let max = usize::MAX.to_string();
        let error = ListenerConfig::load_with(env(&[
            (ADDR_ENV, "127.0.0.1:0"),
            (CAPACITY_ENV, max.as_str()),
        ]))
        .unwrap_err();
        assert!(matches!(error, TelemetryError::Config { .. }));
        assert!(error.to_string().contains("channel_capacity"));

        let at_limit =
            ListenerConfig { channel_capacity: Distributor::MAX_CAPACITY, ..Default::default() };
        assert!(at_limit.validate().is_ok());

        let over = ListenerConfig { channel_capacity: 1_000_000_000, ..Default::default() };
        assert!(over.validate().is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(ListenerConfig::from_yaml_str("port: 20777\n").is_err());
    }

    #[test]
    fn validation() {
        assert!(ListenerConfig::with_addr("  ").validate().is_err());
        assert!(
            ListenerConfig { channel_capacity: 0, ..ListenerConfig::default() }.validate().is_err()
        );
        assert!(ListenerConfig::default().validate().is_ok());
    }
}
