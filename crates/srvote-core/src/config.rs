//! Configuration for srvote.
//!
//! Configuration can be loaded from:
//! - Environment variables (prefixed with `SRVOTE_`)
//! - JSON documents
//! - Programmatic defaults and the builder
//!
//! # Example
//!
//! ```rust
//! use srvote_core::config::VoteConfig;
//! use std::time::Duration;
//!
//! let config = VoteConfig::builder()
//!     .submitted_reset_delay(Duration::from_secs(5))
//!     .step_divisor(20)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.timing.submitted_reset_delay_ms, 5_000);
//! ```

use crate::{Result, VoteError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Complete srvote configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoteConfig {
    /// Post-submission timers.
    pub timing: TimingConfig,

    /// Allocation behaviour.
    pub allocation: AllocationConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl VoteConfig {
    pub fn builder() -> VoteConfigBuilder {
        VoteConfigBuilder::default()
    }

    /// Load configuration from environment variables.
    ///
    /// - `SRVOTE_BALANCE_REFRESH_DELAY_MS`
    /// - `SRVOTE_SUBMITTED_RESET_DELAY_MS`
    /// - `SRVOTE_STEP_DIVISOR`
    /// - `SRVOTE_LOG_LEVEL`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("SRVOTE_BALANCE_REFRESH_DELAY_MS") {
            config.timing.balance_refresh_delay_ms = v.parse().map_err(|e| {
                VoteError::ConfigError(format!("Invalid SRVOTE_BALANCE_REFRESH_DELAY_MS: {}", e))
            })?;
        }

        if let Ok(v) = std::env::var("SRVOTE_SUBMITTED_RESET_DELAY_MS") {
            config.timing.submitted_reset_delay_ms = v.parse().map_err(|e| {
                VoteError::ConfigError(format!("Invalid SRVOTE_SUBMITTED_RESET_DELAY_MS: {}", e))
            })?;
        }

        if let Ok(v) = std::env::var("SRVOTE_STEP_DIVISOR") {
            config.allocation.step_divisor = v.parse().map_err(|e| {
                VoteError::ConfigError(format!("Invalid SRVOTE_STEP_DIVISOR: {}", e))
            })?;
        }

        if let Ok(level) = std::env::var("SRVOTE_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document. Missing sections take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| VoteError::ConfigError(format!("Invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timing.balance_refresh_delay_ms == 0 {
            return Err(VoteError::ConfigError(
                "balance_refresh_delay_ms must be greater than 0".into(),
            ));
        }
        if self.timing.submitted_reset_delay_ms == 0 {
            return Err(VoteError::ConfigError(
                "submitted_reset_delay_ms must be greater than 0".into(),
            ));
        }
        if self.allocation.step_divisor == 0 || self.allocation.step_divisor > 1000 {
            return Err(VoteError::ConfigError(
                "step_divisor must be between 1 and 1000".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay before asking the wallet to reload after a successful submission.
    pub balance_refresh_delay_ms: u64,

    /// How long the submitted state lasts before returning to browsing.
    pub submitted_reset_delay_ms: u64,
}

impl TimingConfig {
    pub fn balance_refresh_delay(&self) -> Duration {
        Duration::from_millis(self.balance_refresh_delay_ms)
    }

    pub fn submitted_reset_delay(&self) -> Duration {
        Duration::from_millis(self.submitted_reset_delay_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            balance_refresh_delay_ms: 1_200,
            submitted_reset_delay_ms: 5_000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    /// The +/- step is `ceil(balance / step_divisor)`.
    pub step_divisor: u64,
}

impl AllocationConfig {
    pub fn step_size(&self, balance: u64) -> u64 {
        balance.div_ceil(self.step_divisor.max(1))
    }
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self { step_divisor: 20 }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,

    /// JSON output format.
    pub json_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json_output: false,
        }
    }
}

#[derive(Default)]
pub struct VoteConfigBuilder {
    config: VoteConfig,
}

impl VoteConfigBuilder {
    pub fn balance_refresh_delay(mut self, delay: Duration) -> Self {
        self.config.timing.balance_refresh_delay_ms =
            u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn submitted_reset_delay(mut self, delay: Duration) -> Self {
        self.config.timing.submitted_reset_delay_ms =
            u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn step_divisor(mut self, divisor: u64) -> Self {
        self.config.allocation.step_divisor = divisor;
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn json_logs(mut self, enabled: bool) -> Self {
        self.config.logging.json_output = enabled;
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<VoteConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
