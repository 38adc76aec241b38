use crate::error::{Error, Result};
use serde::Deserialize;
use std::time::Duration;

/// Default pause between two status polls.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Default number of rows requested per fetch.
pub const DEFAULT_BATCH_SIZE: i64 = 10_000;

/// Polling and paging options for a rowset.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pause between status polls while waiting for completion.
    #[serde(rename = "poll_interval_secs", deserialize_with = "deserialize_secs")]
    pub poll_interval: Duration,

    /// Maximum rows requested by one fetch.
    pub batch_size: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl Config {
    /// Create a new Config builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that both tunables are positive.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(Error::Config("poll interval must be positive".into()));
        }
        if self.batch_size <= 0 {
            return Err(Error::Config(format!(
                "batch size must be positive, got {}",
                self.batch_size
            )));
        }
        Ok(())
    }
}

fn deserialize_secs<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_secs)
}

/// Builder for Config.
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the poll interval.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Set the poll interval in whole seconds.
    pub fn poll_interval_secs(mut self, secs: u64) -> Self {
        self.config.poll_interval = Duration::from_secs(secs);
        self
    }

    /// Set the fetch batch size.
    pub fn batch_size(mut self, rows: i64) -> Self {
        self.config.batch_size = rows;
        self
    }

    /// Build the Config.
    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.batch_size, 10_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = Config::builder().poll_interval_secs(2).batch_size(50).build();
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.batch_size, 50);
    }

    #[test]
    fn test_validate_rejects_zero() {
        let config = Config::builder().poll_interval(Duration::ZERO).build();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = Config::builder().batch_size(0).build();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: Config = serde_json::from_str(r#"{"poll_interval_secs": 1}"#).unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
    }
}
