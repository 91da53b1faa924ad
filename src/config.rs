//! Engine configuration
//!
//! This module defines the engine's tunable settings, including environment
//! variable loading and validation.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Tunable engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Idle time after which a half-played match is reaped, in seconds
    pub session_idle_timeout_seconds: u64,
    /// Interval between reaper sweeps, in seconds
    pub reaper_interval_seconds: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            session_idle_timeout_seconds: 1800, // 30 minutes
            reaper_interval_seconds: 60,        // 1 minute
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(timeout) = env::var("DUEL_SESSION_IDLE_TIMEOUT_SECONDS") {
            config.session_idle_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("DUEL_SESSION_IDLE_TIMEOUT_SECONDS must be an integer"))?;
        }
        if let Ok(interval) = env::var("DUEL_REAPER_INTERVAL_SECONDS") {
            config.reaper_interval_seconds = interval
                .parse()
                .map_err(|_| anyhow!("DUEL_REAPER_INTERVAL_SECONDS must be an integer"))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.session_idle_timeout_seconds == 0 {
            return Err(anyhow!("session_idle_timeout_seconds must be greater than 0"));
        }
        if self.reaper_interval_seconds == 0 {
            return Err(anyhow!("reaper_interval_seconds must be greater than 0"));
        }
        Ok(())
    }

    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_timeout_seconds)
    }

    pub fn reaper_interval(&self) -> Duration {
        Duration::from_secs(self.reaper_interval_seconds)
    }
}
