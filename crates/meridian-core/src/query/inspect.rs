//! Range coverage inspection.
//!
//! Parses a PromQL query and reports the look-back window of every range
//! selector (`metric[5m]`) to a [`RangeObserver`], wherever the selector is
//! nested: inside function calls, aggregations, binary operations or
//! subqueries.
//!
//! Parsing failures are returned to the caller. Walking an already parsed
//! tree never fails; the visitor's error type is uninhabited, so a node
//! cannot abort the walk.

use std::convert::Infallible;
use std::time::Duration;

use promql_parser::parser::{self, Expr};
use promql_parser::util::{walk_expr, ExprVisitor};
use thiserror::Error;
use tracing::debug;

use super::metadata::RangeObserver;
use crate::rpc_error::ClassifiedError;

/// The query text could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to parse query '{query}': {reason}")]
pub struct QueryParseError {
    pub query: String,
    pub reason: String,
}

impl From<QueryParseError> for ClassifiedError {
    fn from(err: QueryParseError) -> Self {
        ClassifiedError::new_bad_request(err)
    }
}

pub fn parse_query(query: &str) -> Result<Expr, QueryParseError> {
    parser::parse(query).map_err(|reason| QueryParseError {
        query: query.to_owned(),
        reason,
    })
}

/// Reports the range of every range selector in `query` to `observer`.
pub fn apply_range_warnings<O>(query: &str, observer: &mut O) -> Result<(), QueryParseError>
where
    O: RangeObserver + ?Sized,
{
    let expr = parse_query(query)?;
    let reported = inspect_expr(&expr, observer);
    debug!(query, ranges = reported, "applied range warnings");
    Ok(())
}

/// Collects the ranges of every range selector in `query`.
pub fn inspect_ranges(query: &str) -> Result<Vec<Duration>, QueryParseError> {
    let mut ranges = Vec::new();
    apply_range_warnings(query, &mut ranges)?;
    Ok(ranges)
}

/// Walks a parsed tree, returning how many ranges were reported.
pub fn inspect_expr<O>(expr: &Expr, observer: &mut O) -> usize
where
    O: RangeObserver + ?Sized,
{
    let mut visitor = RangeVisitor {
        observer,
        reported: 0,
    };
    match walk_expr(&mut visitor, expr) {
        Ok(_) => {}
        Err(never) => match never {},
    }
    visitor.reported
}

struct RangeVisitor<'a, O: ?Sized> {
    observer: &'a mut O,
    reported: usize,
}

impl<O> ExprVisitor for RangeVisitor<'_, O>
where
    O: RangeObserver + ?Sized,
{
    type Error = Infallible;

    fn pre_visit(&mut self, expr: &Expr) -> Result<bool, Self::Error> {
        if let Expr::MatrixSelector(selector) = expr {
            self.observer.verify_temporal_range(selector.range);
            self.reported += 1;
        }
        Ok(true)
    }
}

impl RangeObserver for Vec<Duration> {
    fn verify_temporal_range(&mut self, range: Duration) {
        self.push(range);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ResultMetadata;

    #[test]
    fn reports_range_inside_function_call() {
        let ranges = inspect_ranges("sum_over_time(metric[10m])").expect("must parse");
        assert_eq!(ranges, vec![Duration::from_secs(600)]);
    }

    #[test]
    fn instant_selector_reports_nothing() {
        let ranges = inspect_ranges("metric").expect("must parse");
        assert!(ranges.is_empty());
    }

    #[test]
    fn reports_every_nested_range() {
        let mut ranges = inspect_ranges(
            "sum by (job) (rate(http_requests_total[5m])) / on(job) max_over_time(up[1h])",
        )
        .expect("must parse");
        ranges.sort();

        assert_eq!(
            ranges,
            vec![Duration::from_secs(300), Duration::from_secs(3_600)]
        );
    }

    #[test]
    fn parse_failure_reports_nothing() {
        let mut meta = ResultMetadata::new();

        let err = apply_range_warnings("sum(rate(metric[5m]", &mut meta).expect_err("must fail");

        assert_eq!(err.query, "sum(rate(metric[5m]");
        assert!(meta.observed_ranges.is_empty());
    }

    #[test]
    fn parse_failure_classifies_as_bad_request() {
        let err = parse_query("metric{").expect_err("must fail");
        let classified = ClassifiedError::from(err);

        assert!(classified.is_bad_request());
        assert!(!classified.is_resource_exhausted());
    }
}
