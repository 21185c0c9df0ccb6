use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;

use crate::config::QueryEngineOptions;
use crate::duration::{format_duration, parse_duration};
use crate::rpc_error::ClassifiedError;
use crate::{UtcDateTime, ValidationError};

/// Parsed read request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadRequest {
    pub query: String,
    pub start: UtcDateTime,
    pub end: UtcDateTime,
    #[serde(serialize_with = "serialize_duration")]
    pub step: Duration,
    #[serde(serialize_with = "serialize_duration")]
    pub timeout: Duration,
    pub instant: bool,
}

impl ReadRequest {
    /// Parses range query parameters (`query`, `start`, `end`, `step`,
    /// `timeout`). A missing step falls back to the configured default
    /// evaluation interval.
    pub fn from_params(
        params: &HashMap<String, String>,
        options: &QueryEngineOptions,
    ) -> Result<Self, ClassifiedError> {
        Self::parse_range(params, options).map_err(ClassifiedError::new_bad_request)
    }

    /// Instant query evaluated at a single point in time.
    pub fn instant(
        query: impl Into<String>,
        time: UtcDateTime,
        options: &QueryEngineOptions,
    ) -> Result<Self, ClassifiedError> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(ClassifiedError::new_bad_request(
                ValidationError::MissingParameter { name: "query" },
            ));
        }

        Ok(Self {
            query,
            start: time,
            end: time,
            step: options.default_evaluation_interval(),
            timeout: options.default_timeout(),
            instant: true,
        })
    }

    fn parse_range(
        params: &HashMap<String, String>,
        options: &QueryEngineOptions,
    ) -> Result<Self, ValidationError> {
        let query = required(params, "query")?.to_owned();
        let start = UtcDateTime::parse(required(params, "start")?)?;
        let end = UtcDateTime::parse(required(params, "end")?)?;
        if end < start {
            return Err(ValidationError::InvalidTimeRange);
        }

        let step = match optional(params, "step") {
            Some(raw) => parse_duration(raw)?,
            None => options.default_evaluation_interval(),
        };
        if step.is_zero() {
            return Err(ValidationError::ZeroValue { field: "step" });
        }

        let timeout = match optional(params, "timeout") {
            Some(raw) => parse_duration(raw)?,
            None => options.default_timeout(),
        };
        if timeout.is_zero() {
            return Err(ValidationError::ZeroValue { field: "timeout" });
        }

        Ok(Self {
            query,
            start,
            end,
            step,
            timeout,
            instant: false,
        })
    }
}

fn optional<'a>(params: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn required<'a>(
    params: &'a HashMap<String, String>,
    name: &'static str,
) -> Result<&'a str, ValidationError> {
    optional(params, name).ok_or(ValidationError::MissingParameter { name })
}

fn serialize_duration<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&format_duration(*value))
}
