//! Service configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use star_registry_core::StarPayload;

use crate::error::{Error, Result};

/// Default story of the genesis star.
pub const GENESIS_STORY: &str =
    "star-registry genesis record: Found with www.google.com/sky (Fireball Galaxy)";

/// Longest window a request may be granted: one year.
pub const MAX_WINDOW_SECS: u64 = 365 * 24 * 60 * 60;

/// Configuration for the identity validation registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Window granted to a fresh request, in seconds.
    pub short_window_secs: u64,
    /// Window granted after a signature verifies, in seconds.
    pub long_window_secs: u64,
    /// Last component of the challenge message.
    pub challenge_suffix: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            short_window_secs: 300,
            long_window_secs: 1800,
            challenge_suffix: "starRegistry".to_string(),
        }
    }
}

impl RegistryConfig {
    pub fn short_window(&self) -> Duration {
        Duration::from_secs(self.short_window_secs)
    }

    pub fn long_window(&self) -> Duration {
        Duration::from_secs(self.long_window_secs)
    }
}

/// The fixed payload of the genesis record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisConfig {
    pub owner: String,
    pub star: StarPayload,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            owner: "0".to_string(),
            star: StarPayload::new("9h 56m 1.0s", "69 deg 29m 24.9s", GENESIS_STORY),
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub registry: RegistryConfig,
    pub genesis: GenesisConfig,
}

impl Config {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config =
            serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the windows and the challenge suffix.
    pub fn validate(&self) -> Result<()> {
        let registry = &self.registry;
        if registry.short_window_secs == 0 {
            return Err(Error::InvalidConfig(
                "short_window_secs must be positive".into(),
            ));
        }
        if registry.long_window_secs <= registry.short_window_secs {
            return Err(Error::InvalidConfig(format!(
                "long_window_secs ({}) must exceed short_window_secs ({})",
                registry.long_window_secs, registry.short_window_secs
            )));
        }
        if registry.long_window_secs > MAX_WINDOW_SECS {
            return Err(Error::InvalidConfig(format!(
                "long_window_secs ({}) must not exceed {}",
                registry.long_window_secs, MAX_WINDOW_SECS
            )));
        }
        if registry.challenge_suffix.is_empty() {
            return Err(Error::InvalidConfig("challenge_suffix must not be empty".into()));
        }
        Ok(())
    }
}
