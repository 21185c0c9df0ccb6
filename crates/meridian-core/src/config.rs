//! Service configuration.
//!
//! Options are plain values passed to the components that need them; nothing
//! here is process-global. The query engine's default evaluation interval in
//! particular is handed to the [`ReadHandler`](crate::query::ReadHandler)
//! instead of being installed once at startup.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{CoreError, ValidationError};

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub query: QueryEngineOptions,
    pub write: WriteOptions,
}

impl ServiceConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CoreError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.query.validate()?;
        self.write.validate()
    }
}

/// Options threaded into whatever constructs the query engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryEngineOptions {
    /// Step used when a request does not supply one; also the subquery
    /// evaluation interval.
    pub default_evaluation_interval_ms: u64,
    pub default_timeout_ms: u64,
}

impl Default for QueryEngineOptions {
    fn default() -> Self {
        Self {
            default_evaluation_interval_ms: 60_000,
            default_timeout_ms: 30_000,
        }
    }
}

impl QueryEngineOptions {
    pub fn default_evaluation_interval(&self) -> Duration {
        Duration::from_millis(self.default_evaluation_interval_ms)
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn with_default_evaluation_interval(mut self, interval: Duration) -> Self {
        self.default_evaluation_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.default_evaluation_interval_ms == 0 {
            return Err(ValidationError::ZeroValue {
                field: "query.default_evaluation_interval_ms",
            });
        }
        if self.default_timeout_ms == 0 {
            return Err(ValidationError::ZeroValue {
                field: "query.default_timeout_ms",
            });
        }
        Ok(())
    }
}

/// Limits applied to batch writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    pub max_batch_size: usize,
    pub max_concurrency: usize,
    /// Admitted batches per second; `0` disables admission control.
    pub rate_limit_per_sec: u32,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            max_batch_size: 8_192,
            max_concurrency: 16,
            rate_limit_per_sec: 0,
        }
    }
}

impl WriteOptions {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_batch_size == 0 {
            return Err(ValidationError::ZeroValue {
                field: "write.max_batch_size",
            });
        }
        if self.max_concurrency == 0 {
            return Err(ValidationError::ZeroValue {
                field: "write.max_concurrency",
            });
        }
        Ok(())
    }
}
