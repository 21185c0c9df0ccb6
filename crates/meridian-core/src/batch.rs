//! Batch write execution with per-item failure correlation.
//!
//! A batch either fails as a whole (malformed envelope, oversized, or not
//! admitted) with a single [`ClassifiedError`], or it runs every item and
//! reports one [`BatchItemOutcome`] per failed item, keyed by the item's
//! position in the submitted batch. Items without an outcome succeeded.

use std::collections::HashMap;
use std::fmt::Display;
use std::num::NonZeroU32;
use std::sync::Arc;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::WriteOptions;
use crate::rpc_error::ClassifiedError;
use crate::write::{WriteBatch, WriteError, WriteOp, WriteSink};

/// Failure of one item, in its wire shape `{"index": ..., "err": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItemOutcome {
    pub index: usize,
    #[serde(rename = "err")]
    pub error: ClassifiedError,
}

impl BatchItemOutcome {
    pub fn internal(index: usize, err: impl Display) -> Self {
        Self {
            index,
            error: ClassifiedError::new_internal(err),
        }
    }

    pub fn bad_request(index: usize, err: impl Display) -> Self {
        Self {
            index,
            error: ClassifiedError::new_bad_request(err),
        }
    }
}

/// Result of a batch that was accepted for processing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub submitted: usize,
    pub succeeded: usize,
    /// Failed items, ascending by index.
    #[serde(rename = "errors")]
    pub outcomes: Vec<BatchItemOutcome>,
}

impl BatchReport {
    pub fn failed_indices(&self) -> Vec<usize> {
        self.outcomes.iter().map(|outcome| outcome.index).collect()
    }

    pub fn is_complete_success(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Decodes a JSON batch envelope (`{"writes": [...]}`).
pub fn decode_batch(payload: &[u8]) -> Result<WriteBatch, ClassifiedError> {
    serde_json::from_slice(payload)
        .map_err(|err| ClassifiedError::new_bad_request(format!("malformed write batch: {err}")))
}

/// Maps a write failure onto the error classification.
///
/// Validation-class failures become bad requests; anything else is internal.
pub fn classify_write_error(err: &WriteError) -> ClassifiedError {
    if err.is_validation() {
        ClassifiedError::new_bad_request(err)
    } else {
        ClassifiedError::new_internal(err)
    }
}

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Runs batches against a [`WriteSink`].
pub struct BatchAggregator {
    sink: Arc<dyn WriteSink>,
    options: WriteOptions,
    admission: Option<DirectRateLimiter>,
}

impl BatchAggregator {
    pub fn new(sink: Arc<dyn WriteSink>, options: WriteOptions) -> Self {
        let admission = NonZeroU32::new(options.rate_limit_per_sec)
            .map(|limit| RateLimiter::direct(Quota::per_second(limit)));
        Self {
            sink,
            options,
            admission,
        }
    }

    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    /// Decodes and executes a raw batch payload.
    pub async fn execute_raw(&self, payload: &[u8]) -> Result<BatchReport, ClassifiedError> {
        let batch = decode_batch(payload)?;
        self.execute(batch).await
    }

    pub async fn execute(&self, batch: WriteBatch) -> Result<BatchReport, ClassifiedError> {
        let submitted = batch.len();
        if submitted > self.options.max_batch_size {
            return Err(ClassifiedError::new_bad_request(format!(
                "write batch of {submitted} items exceeds max {}",
                self.options.max_batch_size
            )));
        }

        if let Some(limiter) = &self.admission {
            if limiter.check().is_err() {
                return Err(ClassifiedError::new_resource_exhausted(format!(
                    "write admission limit of {} batches/s exceeded",
                    self.options.rate_limit_per_sec
                )));
            }
        }

        let permits = Arc::new(Semaphore::new(self.options.max_concurrency.max(1)));
        // Dropping the set aborts items still in flight.
        let mut tasks = JoinSet::new();
        let mut positions = HashMap::with_capacity(submitted);
        for (index, op) in batch.writes.into_iter().enumerate() {
            let sink = Arc::clone(&self.sink);
            let permits = Arc::clone(&permits);
            let handle = tasks.spawn(write_item(sink, permits, op));
            positions.insert(handle.id(), index);
        }

        // Slot i belongs to item i only.
        let mut slots: Vec<Option<ClassifiedError>> = vec![None; submitted];
        while let Some(joined) = tasks.join_next_with_id().await {
            let (id, failure) = match joined {
                Ok((id, Ok(()))) => (id, None),
                Ok((id, Err(err))) => (id, Some(classify_write_error(&err))),
                Err(join_err) => (join_err.id(), Some(ClassifiedError::new_internal(&join_err))),
            };
            let Some(&index) = positions.get(&id) else {
                continue;
            };
            if let Some(error) = &failure {
                warn!(
                    index,
                    kind = %error.kind(),
                    reason = error.message(),
                    "write batch item failed"
                );
            }
            slots[index] = failure;
        }

        let outcomes = slots
            .into_iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.map(|error| BatchItemOutcome { index, error }))
            .collect::<Vec<_>>();

        debug!(submitted, failed = outcomes.len(), "write batch complete");

        Ok(BatchReport {
            submitted,
            succeeded: submitted - outcomes.len(),
            outcomes,
        })
    }
}

/// Validates `op`, then writes it once a concurrency permit is free.
async fn write_item(
    sink: Arc<dyn WriteSink>,
    permits: Arc<Semaphore>,
    op: WriteOp,
) -> Result<(), WriteError> {
    op.validate()?;
    let _permit = permits
        .acquire_owned()
        .await
        .map_err(|err| WriteError::Storage(err.to_string()))?;
    sink.write(op).await
}
