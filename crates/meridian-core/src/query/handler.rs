use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use super::inspect::{inspect_expr, parse_query};
use super::metadata::ResultMetadata;
use super::request::ReadRequest;
use crate::config::QueryEngineOptions;
use crate::rpc_error::ClassifiedError;

/// Query engine contract: runs a request and returns the annotations of its
/// result.
pub trait QueryExecutor: Send + Sync {
    fn execute(&self, request: &ReadRequest) -> Result<ResultMetadata, ClassifiedError>;
}

/// Executor whose storage always reports the same data resolutions.
#[derive(Debug, Clone, Default)]
pub struct FixedResolutionExecutor {
    resolutions: Vec<Duration>,
}

impl FixedResolutionExecutor {
    pub fn new(resolutions: Vec<Duration>) -> Self {
        Self { resolutions }
    }
}

impl QueryExecutor for FixedResolutionExecutor {
    fn execute(&self, _request: &ReadRequest) -> Result<ResultMetadata, ClassifiedError> {
        Ok(ResultMetadata::new().with_resolutions(self.resolutions.iter().copied()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadResponse {
    pub request: ReadRequest,
    pub metadata: ResultMetadata,
}

/// Read path: parse request, execute, then annotate the result with range
/// coverage warnings.
#[derive(Clone)]
pub struct ReadHandler {
    executor: Arc<dyn QueryExecutor>,
    options: QueryEngineOptions,
}

impl ReadHandler {
    pub fn new(executor: Arc<dyn QueryExecutor>, options: QueryEngineOptions) -> Self {
        Self { executor, options }
    }

    pub fn options(&self) -> &QueryEngineOptions {
        &self.options
    }

    pub fn handle(&self, params: &HashMap<String, String>) -> Result<ReadResponse, ClassifiedError> {
        let request = ReadRequest::from_params(params, &self.options)?;
        self.handle_request(request)
    }

    /// Parses the query, executes it, then reports its ranges to the
    /// returned metadata. A query that does not parse never reaches the
    /// executor.
    pub fn handle_request(&self, request: ReadRequest) -> Result<ReadResponse, ClassifiedError> {
        let expr = parse_query(&request.query)?;
        let mut metadata = self.executor.execute(&request)?;
        let ranges = inspect_expr(&expr, &mut metadata);

        debug!(
            query = request.query.as_str(),
            ranges,
            warnings = metadata.warnings.len(),
            "read request complete"
        );

        Ok(ReadResponse { request, metadata })
    }
}
