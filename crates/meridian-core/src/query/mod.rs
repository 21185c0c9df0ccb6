//! Read path: request parsing, execution seam and range coverage annotation.

pub mod handler;
pub mod inspect;
pub mod metadata;
pub mod request;

pub use handler::{FixedResolutionExecutor, QueryExecutor, ReadHandler, ReadResponse};
pub use inspect::{apply_range_warnings, inspect_expr, inspect_ranges, parse_query, QueryParseError};
pub use metadata::{RangeObserver, ResultMetadata, Warning, RESOLUTION_WARNING};
pub use request::ReadRequest;
