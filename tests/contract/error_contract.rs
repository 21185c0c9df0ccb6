//! Contract tests for classified errors crossing the RPC boundary.
//!
//! These tests pin the wire shape and the predicate semantics older and newer
//! callers both rely on.

use meridian_core::{
    is_bad_request, is_internal, is_resource_exhausted, ClassifiedError, ErrorCode, ErrorKind,
    RetryGuidance,
};

type Constructor = fn(&str) -> ClassifiedError;

fn internal(message: &str) -> ClassifiedError {
    ClassifiedError::new_internal(message)
}

fn bad_request(message: &str) -> ClassifiedError {
    ClassifiedError::new_bad_request(message)
}

fn resource_exhausted(message: &str) -> ClassifiedError {
    ClassifiedError::new_resource_exhausted(message)
}

fn constructors() -> [(&'static str, Constructor); 3] {
    [
        ("internal", internal as Constructor),
        ("bad_request", bad_request as Constructor),
        ("resource_exhausted", resource_exhausted as Constructor),
    ]
}

// =============================================================================
// Contract: predicates
// =============================================================================

#[test]
fn internal_errors_are_never_bad_requests() {
    for message in ["", "boom", "shard 12 unavailable"] {
        let err = ClassifiedError::new_internal(message);

        assert!(is_internal(Some(&err)));
        assert!(!is_bad_request(Some(&err)));
        assert!(!is_resource_exhausted(Some(&err)));
    }
}

#[test]
fn bad_requests_are_not_resource_exhausted() {
    let err = ClassifiedError::new_bad_request("series id cannot be empty");

    assert!(is_bad_request(Some(&err)));
    assert!(!is_internal(Some(&err)));
    assert!(!is_resource_exhausted(Some(&err)));
}

#[test]
fn resource_exhausted_satisfies_both_bad_request_and_overload() {
    let err = ClassifiedError::new_resource_exhausted("query limit exceeded");

    assert!(is_bad_request(Some(&err)));
    assert!(is_resource_exhausted(Some(&err)));
    assert!(!is_internal(Some(&err)));
}

#[test]
fn absent_errors_match_no_predicate() {
    assert!(!is_internal(None));
    assert!(!is_bad_request(None));
    assert!(!is_resource_exhausted(None));
}

// =============================================================================
// Contract: construction
// =============================================================================

#[test]
fn constructors_are_deterministic() {
    for (name, construct) in constructors() {
        assert_eq!(construct("same input"), construct("same input"), "{name}");
        assert_eq!(construct("same input").message(), "same input", "{name}");
    }
}

#[test]
fn kind_and_code_pairs_match_retry_table() {
    let cases = [
        (
            ClassifiedError::new_internal("x"),
            ErrorKind::Internal,
            ErrorCode::None,
            RetryGuidance::Retry,
        ),
        (
            ClassifiedError::new_bad_request("x"),
            ErrorKind::BadRequest,
            ErrorCode::None,
            RetryGuidance::FixRequest,
        ),
        (
            ClassifiedError::new_resource_exhausted("x"),
            ErrorKind::BadRequest,
            ErrorCode::ResourceExhausted,
            RetryGuidance::BackOff,
        ),
    ];

    for (err, kind, code, guidance) in cases {
        assert_eq!(err.kind(), kind);
        assert_eq!(err.code(), code);
        assert_eq!(err.retry_guidance(), guidance);
    }
}

// =============================================================================
// Contract: wire shape
// =============================================================================

#[test]
fn wire_shape_uses_protocol_enum_names() {
    let value = serde_json::to_value(ClassifiedError::new_internal("disk full"))
        .expect("must serialize");

    assert_eq!(value["type"], "INTERNAL_ERROR");
    assert_eq!(value["code"], "NONE");
    assert_eq!(value["message"], "disk full");
}

#[test]
fn caller_ignoring_code_sees_bad_request_for_overload() {
    // An older caller only reads `type` and `message`.
    #[derive(serde::Deserialize)]
    struct LegacyError {
        #[serde(rename = "type")]
        kind: String,
    }

    let payload = serde_json::to_string(&ClassifiedError::new_resource_exhausted("slow down"))
        .expect("must serialize");
    let legacy: LegacyError = serde_json::from_str(&payload).expect("legacy decode");

    assert_eq!(legacy.kind, "BAD_REQUEST");
}

#[test]
fn unknown_kind_is_rejected_on_decode() {
    let result = serde_json::from_str::<ClassifiedError>(
        r#"{"type":"TIMEOUT","code":"NONE","message":"x"}"#,
    );

    assert!(result.is_err());
}
