//! Write operations and the storage seam they are applied through.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{UtcDateTime, ValidationError};

pub const MAX_SERIES_LEN: usize = 512;

/// A single datapoint write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteOp {
    pub series: String,
    pub timestamp: UtcDateTime,
    pub value: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl WriteOp {
    pub fn new(series: impl Into<String>, timestamp: UtcDateTime, value: f64) -> Self {
        Self {
            series: series.into(),
            timestamp,
            value,
            tags: BTreeMap::new(),
        }
    }

    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(name.into(), value.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.series.trim().is_empty() {
            return Err(ValidationError::EmptySeries);
        }
        if self.series.len() > MAX_SERIES_LEN {
            return Err(ValidationError::SeriesTooLong {
                len: self.series.len(),
                max: MAX_SERIES_LEN,
            });
        }
        if !self.value.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "value" });
        }
        if self.tags.keys().any(|name| name.trim().is_empty()) {
            return Err(ValidationError::EmptyTagName);
        }
        Ok(())
    }
}

/// Ordered batch of writes as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteBatch {
    pub writes: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new(writes: Vec<WriteOp>) -> Self {
        Self { writes }
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

/// Failure of a single write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("write rejected: {0}")]
    Rejected(String),
    #[error("storage failure: {0}")]
    Storage(String),
}

impl WriteError {
    /// Validation-class failures are the caller's fault.
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Invalid(_) | Self::Rejected(_))
    }
}

pub type WriteFuture<'a> = Pin<Box<dyn Future<Output = Result<(), WriteError>> + Send + 'a>>;

/// Storage engine contract for applying writes.
///
/// Implementations must be `Send + Sync`; items of one batch may be written
/// concurrently.
pub trait WriteSink: Send + Sync {
    fn write<'a>(&'a self, op: WriteOp) -> WriteFuture<'a>;
}

/// In-memory sink keyed by series.
///
/// Points older than `retention` relative to the newest point already stored
/// for the same series are rejected.
#[derive(Debug)]
pub struct MemorySink {
    retention: Duration,
    series: Mutex<HashMap<String, StoredSeries>>,
}

#[derive(Debug, Default)]
struct StoredSeries {
    newest: Option<UtcDateTime>,
    points: Vec<(UtcDateTime, f64)>,
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new(Duration::from_secs(2 * 60 * 60))
    }
}

impl MemorySink {
    pub fn new(retention: Duration) -> Self {
        Self {
            retention,
            series: Mutex::new(HashMap::new()),
        }
    }

    pub fn point_count(&self, series: &str) -> usize {
        self.series
            .lock()
            .map(|stored| stored.get(series).map_or(0, |entry| entry.points.len()))
            .unwrap_or(0)
    }

    fn apply(&self, op: WriteOp) -> Result<(), WriteError> {
        op.validate()?;

        let mut stored = self
            .series
            .lock()
            .map_err(|_| WriteError::Storage(String::from("series index lock poisoned")))?;
        let entry = stored.entry(op.series.clone()).or_default();

        if let Some(newest) = entry.newest {
            let retention_ms = i64::try_from(self.retention.as_millis()).unwrap_or(i64::MAX);
            let horizon = newest.unix_millis().saturating_sub(retention_ms);
            if op.timestamp.unix_millis() < horizon {
                return Err(WriteError::Rejected(format!(
                    "datapoint for '{}' at {} is outside the retention window",
                    op.series, op.timestamp
                )));
            }
        }

        entry.newest = Some(entry.newest.map_or(op.timestamp, |newest| newest.max(op.timestamp)));
        entry.points.push((op.timestamp, op.value));
        Ok(())
    }
}

impl WriteSink for MemorySink {
    fn write<'a>(&'a self, op: WriteOp) -> WriteFuture<'a> {
        Box::pin(async move { self.apply(op) })
    }
}
