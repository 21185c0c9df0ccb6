//! Classified errors exchanged across the RPC boundary.
//!
//! Every failure that leaves a node is reduced to a two-dimensional
//! descriptor: an [`ErrorKind`] that tells the caller whether the request
//! itself is at fault, and an orthogonal [`ErrorCode`] that carries finer
//! detail older callers may ignore.
//!
//! | Kind | Code | Retry guidance |
//! |------|------|----------------|
//! | `INTERNAL_ERROR` | `NONE` | retry |
//! | `BAD_REQUEST` | `NONE` | fix the request first |
//! | `BAD_REQUEST` | `RESOURCE_EXHAUSTED` | back off, then retry |
//!
//! Resource exhaustion is reported with kind `BAD_REQUEST` so that callers
//! which only know the two kinds keep treating it as non-retryable input;
//! the overload signal lives only in `code`.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error category a caller uses to decide whether to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    #[serde(rename = "INTERNAL_ERROR")]
    Internal,
    #[serde(rename = "BAD_REQUEST")]
    BadRequest,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Internal => "INTERNAL_ERROR",
            Self::BadRequest => "BAD_REQUEST",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason detail, independent of [`ErrorKind`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    #[default]
    None,
    ResourceExhausted,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::ResourceExhausted => "RESOURCE_EXHAUSTED",
        }
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a caller should do after receiving a [`ClassifiedError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryGuidance {
    Retry,
    FixRequest,
    BackOff,
}

/// Immutable error descriptor in its wire shape:
/// `{"type": ..., "code": ..., "message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ClassifiedError {
    #[serde(rename = "type")]
    kind: ErrorKind,
    #[serde(default)]
    code: ErrorCode,
    message: String,
}

impl ClassifiedError {
    fn new(kind: ErrorKind, code: ErrorCode, err: impl Display) -> Self {
        Self {
            kind,
            code,
            message: err.to_string(),
        }
    }

    /// Server-side or unexpected failure.
    pub fn new_internal(err: impl Display) -> Self {
        Self::new(ErrorKind::Internal, ErrorCode::None, err)
    }

    /// The request is invalid and must be fixed before retrying.
    pub fn new_bad_request(err: impl Display) -> Self {
        Self::new(ErrorKind::BadRequest, ErrorCode::None, err)
    }

    /// The server is overloaded.
    pub fn new_resource_exhausted(err: impl Display) -> Self {
        // Kind stays BAD_REQUEST for callers that predate the code field.
        Self::new(ErrorKind::BadRequest, ErrorCode::ResourceExhausted, err)
    }

    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_internal(&self) -> bool {
        is_internal(Some(self))
    }

    pub fn is_bad_request(&self) -> bool {
        is_bad_request(Some(self))
    }

    pub fn is_resource_exhausted(&self) -> bool {
        is_resource_exhausted(Some(self))
    }

    pub fn retry_guidance(&self) -> RetryGuidance {
        if self.is_resource_exhausted() {
            return RetryGuidance::BackOff;
        }

        match self.kind {
            ErrorKind::Internal => RetryGuidance::Retry,
            ErrorKind::BadRequest => RetryGuidance::FixRequest,
        }
    }
}

/// Returns whether the error is an internal error.
pub fn is_internal(err: Option<&ClassifiedError>) -> bool {
    err.is_some_and(|err| err.kind == ErrorKind::Internal)
}

/// Returns whether the error is a bad request error.
///
/// Resource exhausted errors also satisfy this predicate.
pub fn is_bad_request(err: Option<&ClassifiedError>) -> bool {
    err.is_some_and(|err| err.kind == ErrorKind::BadRequest)
}

/// Returns whether the error carries the resource exhausted code.
pub fn is_resource_exhausted(err: Option<&ClassifiedError>) -> bool {
    err.is_some_and(|err| err.code == ErrorCode::ResourceExhausted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_error_is_not_bad_request() {
        let err = ClassifiedError::new_internal("disk on fire");

        assert!(err.is_internal());
        assert!(!err.is_bad_request());
        assert!(!err.is_resource_exhausted());
        assert_eq!(err.message(), "disk on fire");
        assert_eq!(err.retry_guidance(), RetryGuidance::Retry);
    }

    #[test]
    fn resource_exhausted_is_also_bad_request() {
        let err = ClassifiedError::new_resource_exhausted("too many in-flight writes");

        assert!(err.is_bad_request());
        assert!(err.is_resource_exhausted());
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(err.retry_guidance(), RetryGuidance::BackOff);
    }

    #[test]
    fn absent_error_matches_nothing() {
        assert!(!is_internal(None));
        assert!(!is_bad_request(None));
        assert!(!is_resource_exhausted(None));
    }

    #[test]
    fn renders_message_from_source_error() {
        let source = std::io::Error::new(std::io::ErrorKind::Other, "broken pipe");
        let err = ClassifiedError::new_bad_request(&source);

        assert_eq!(err.message(), "broken pipe");
        assert_eq!(err.to_string(), "BAD_REQUEST: broken pipe");
    }

    #[test]
    fn serializes_to_wire_shape() {
        let err = ClassifiedError::new_resource_exhausted("slow down");
        let value = serde_json::to_value(&err).expect("must serialize");

        assert_eq!(
            value,
            serde_json::json!({
                "type": "BAD_REQUEST",
                "code": "RESOURCE_EXHAUSTED",
                "message": "slow down",
            })
        );
    }

    #[test]
    fn missing_code_decodes_as_none() {
        let err: ClassifiedError =
            serde_json::from_str(r#"{"type":"INTERNAL_ERROR","message":"boom"}"#)
                .expect("older payloads omit code");

        assert_eq!(err.code(), ErrorCode::None);
        assert!(err.is_internal());
    }
}
