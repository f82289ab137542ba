use tubepilot_gateway::{FailureKind, GatewayError};

#[test]
fn every_non_success_status_maps_to_one_kind() {
    let kind = |status| GatewayError::from_status(status, "").kind;
    assert_eq!(kind(401), FailureKind::Unauthorized);
    assert_eq!(kind(429), FailureKind::QuotaExceeded);
    assert_eq!(kind(400), FailureKind::Validation);
    assert_eq!(kind(404), FailureKind::Validation);
    assert_eq!(kind(500), FailureKind::Server);
    assert_eq!(kind(502), FailureKind::Server);
    assert_eq!(kind(304), FailureKind::Server);
}

#[test]
fn quota_wording_in_a_4xx_body_wins_over_validation() {
    let err = GatewayError::from_status(403, "The request cannot be completed: Quota Exceeded");
    assert_eq!(err.kind, FailureKind::QuotaExceeded);

    let err = GatewayError::from_status(403, "forbidden");
    assert_eq!(err.kind, FailureKind::Validation);
}

#[test]
fn message_prefers_structured_detail() {
    let err = GatewayError::from_status(400, r#"{"message":"url is required"}"#);
    assert_eq!(err.message, "url is required");
    assert_eq!(err.to_string(), "validation error: url is required");

    let err = GatewayError::from_status(500, "");
    assert_eq!(err.message, "Internal Server Error");
}

#[test]
fn only_transient_failures_are_retryable() {
    assert!(GatewayError::new(FailureKind::Network, "down").is_retryable());
    assert!(GatewayError::from_status(503, "").is_retryable());
    assert!(!GatewayError::from_status(401, "").is_retryable());
    assert!(!GatewayError::from_status(422, "").is_retryable());
}
