use thiserror::Error;

/// Validation and contract errors exposed by `meridian-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("series id cannot be empty")]
    EmptySeries,
    #[error("series id length {len} exceeds max {max}")]
    SeriesTooLong { len: usize, max: usize },
    #[error("tag name cannot be empty")]
    EmptyTagName,
    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },

    #[error("timestamp must be RFC3339 UTC (suffix Z) or unix seconds: '{value}'")]
    InvalidTimestamp { value: String },
    #[error("invalid duration '{value}', expected e.g. 30s, 5m, 1h30m or float seconds")]
    InvalidDuration { value: String },

    #[error("missing required parameter '{name}'")]
    MissingParameter { name: &'static str },
    #[error("end time must not be before start time")]
    InvalidTimeRange,
    #[error("field '{field}' must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("schema_version must match vMAJOR.MINOR.PATCH: '{value}'")]
    InvalidSchemaVersion { value: String },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
