use std::fmt;

use thiserror::Error;
use tubepilot_core::ValidationError;

/// Failure classes surfaced by every gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Transport failure or timeout.
    Network,
    /// 401 from the service.
    Unauthorized,
    /// 429, or a 4xx the service attributes to quota.
    QuotaExceeded,
    /// Any other 4xx, or a payload rejected before sending.
    Validation,
    /// 5xx, unexpected statuses, and undecodable success bodies.
    Server,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Unauthorized => write!(f, "unauthorized"),
            FailureKind::QuotaExceeded => write!(f, "quota exceeded"),
            FailureKind::Validation => write!(f, "validation error"),
            FailureKind::Server => write!(f, "server error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct GatewayError {
    pub kind: FailureKind,
    pub status: Option<u16>,
    pub message: String,
}

impl GatewayError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
        }
    }

    /// Maps a non-2xx status and its body to exactly one failure kind.
    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = match status {
            401 => FailureKind::Unauthorized,
            429 => FailureKind::QuotaExceeded,
            400..=499 if mentions_quota(body) => FailureKind::QuotaExceeded,
            400..=499 => FailureKind::Validation,
            _ => FailureKind::Server,
        };
        Self {
            kind,
            status: Some(status),
            message: describe_body(status, body),
        }
    }

    /// Transient failures worth another attempt under a caller's retry policy.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, FailureKind::Network | FailureKind::Server)
    }
}

impl From<ValidationError> for GatewayError {
    fn from(err: ValidationError) -> Self {
        Self::new(FailureKind::Validation, err.to_string())
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        return GatewayError::new(FailureKind::Network, format!("request timed out: {err}"));
    }
    GatewayError::new(FailureKind::Network, err.to_string())
}

fn mentions_quota(body: &str) -> bool {
    let lowered = body.to_ascii_lowercase();
    lowered.contains("quotaexceeded") || lowered.contains("quota exceeded")
}

const MAX_MESSAGE_CHARS: usize = 200;

fn describe_body(status: u16, body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "message", "error"] {
            if let Some(serde_json::Value::String(text)) = map.get(key) {
                return text.clone();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .map(str::to_string)
            .unwrap_or_else(|| format!("status {status}"));
    }
    trimmed.chars().take(MAX_MESSAGE_CHARS).collect()
}
