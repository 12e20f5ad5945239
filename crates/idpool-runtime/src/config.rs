//! Pool configuration
//!
//! Compile-time defaults with runtime environment overrides.
//!
//! ```rust,ignore
//! use idpool_runtime::config::PoolConfig;
//!
//! // Defaults with env overrides
//! let config = PoolConfig::from_env();
//!
//! // Or fully explicit
//! let config = PoolConfig::new()
//!     .input_path("ids.txt")
//!     .log_path("/var/tmp/lookups.log");
//! ```
//!
//! The worker count is not configurable; see
//! [`idpool_core::constants::WORKER_COUNT`].

use std::path::PathBuf;
use std::time::Duration;

use idpool_core::env::{env_get, env_get_str};

/// Library defaults
pub mod defaults {
    pub use idpool_core::constants::{DEFAULT_INPUT_PATH as INPUT_PATH, DEFAULT_LOG_PATH as LOG_PATH};

    /// Simulated lookup latency, microseconds
    pub const LOOKUP_DELAY_US: u64 = 0;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Identifier list to load
    pub input_path: PathBuf,
    /// Log target, truncated at the start of every run
    pub log_path: PathBuf,
    /// Latency added to every mock lookup
    pub lookup_delay: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl PoolConfig {
    /// Create config from defaults with environment overrides.
    ///
    /// Environment variables (all optional):
    /// - `IDP_INPUT_PATH` - Identifier list path
    /// - `IDP_LOG_PATH` - Log target path
    /// - `IDP_LOOKUP_DELAY_US` - Mock lookup latency in microseconds
    pub fn from_env() -> Self {
        Self {
            input_path: env_get_str("IDP_INPUT_PATH", defaults::INPUT_PATH).into(),
            log_path: env_get_str("IDP_LOG_PATH", defaults::LOG_PATH).into(),
            lookup_delay: Duration::from_micros(env_get(
                "IDP_LOOKUP_DELAY_US",
                defaults::LOOKUP_DELAY_US,
            )),
        }
    }

    /// Create config with explicit defaults (no env override)
    pub fn new() -> Self {
        Self {
            input_path: defaults::INPUT_PATH.into(),
            log_path: defaults::LOG_PATH.into(),
            lookup_delay: Duration::from_micros(defaults::LOOKUP_DELAY_US),
        }
    }

    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = path.into();
        self
    }

    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = path.into();
        self
    }

    pub fn lookup_delay(mut self, d: Duration) -> Self {
        self.lookup_delay = d;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.input_path.as_os_str().is_empty() {
            return Err("input_path must not be empty");
        }
        if self.log_path.as_os_str().is_empty() {
            return Err("log_path must not be empty");
        }
        if self.input_path == self.log_path {
            return Err("input_path and log_path must differ");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_defaults() {
        let c = PoolConfig::new();
        assert_eq!(c.input_path, PathBuf::from("ids.txt"));
        assert_eq!(c.log_path, PathBuf::from("logs.txt"));
        assert_eq!(c.lookup_delay, Duration::ZERO);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let c = PoolConfig::new()
            .input_path("/tmp/in.txt")
            .log_path("/tmp/out.log")
            .lookup_delay(Duration::from_micros(250));
        assert_eq!(c.input_path, PathBuf::from("/tmp/in.txt"));
        assert_eq!(c.log_path, PathBuf::from("/tmp/out.log"));
        assert_eq!(c.lookup_delay, Duration::from_micros(250));
    }

    #[test]
    fn test_validate_rejects() {
        assert!(PoolConfig::new().input_path("").validate().is_err());
        assert!(PoolConfig::new().log_path("").validate().is_err());
        assert!(PoolConfig::new().input_path("same").log_path("same").validate().is_err());
    }
}
