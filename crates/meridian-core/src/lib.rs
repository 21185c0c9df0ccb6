//! Core contracts for meridian.
//!
//! This crate contains:
//! - Classified RPC errors and their wire shape
//! - Batch write execution with per-item failure correlation
//! - Query range inspection and result metadata
//! - Service configuration and the response envelope

pub mod batch;
pub mod config;
pub mod duration;
pub mod envelope;
pub mod error;
pub mod query;
pub mod rpc_error;
pub mod timestamp;
pub mod write;

pub use batch::{classify_write_error, decode_batch, BatchAggregator, BatchItemOutcome, BatchReport};
pub use config::{QueryEngineOptions, ServiceConfig, WriteOptions};
pub use duration::{format_duration, parse_duration};
pub use envelope::{Envelope, EnvelopeMeta, SCHEMA_VERSION};
pub use error::{CoreError, ValidationError};
pub use query::{
    apply_range_warnings, inspect_ranges, FixedResolutionExecutor, QueryExecutor,
    QueryParseError, RangeObserver, ReadHandler, ReadRequest, ReadResponse, ResultMetadata,
    Warning,
};
pub use rpc_error::{
    is_bad_request, is_internal, is_resource_exhausted, ClassifiedError, ErrorCode, ErrorKind,
    RetryGuidance,
};
pub use timestamp::UtcDateTime;
pub use write::{MemorySink, WriteBatch, WriteError, WriteOp, WriteSink};
