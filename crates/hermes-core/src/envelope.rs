//! Uniform execution envelope
//!
//! Every dispatch outcome, success or not, is reported in the same shape:
//! a `success` flag, either `data` or `error`, and an `execution` timing
//! block that always names the agent type. Callers branch on the flag and
//! nothing else.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timing and identity block present on every envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionInfo {
    /// When execution started
    pub started_at: DateTime<Utc>,
    /// When execution finished (or was abandoned)
    pub finished_at: DateTime<Utc>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
    /// Agent type, `"unknown"` when it could not be determined
    pub agent_type: String,
}

impl ExecutionInfo {
    /// Build an info block spanning `started_at` to now
    #[must_use]
    pub fn since(started_at: DateTime<Utc>, agent_type: impl Into<String>) -> Self {
        let finished_at = Utc::now();
        let duration_ms = (finished_at - started_at).num_milliseconds().max(0) as u64;
        Self {
            started_at,
            finished_at,
            duration_ms,
            agent_type: agent_type.into(),
        }
    }
}

/// Structured error payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable error code (`REQUEST_TIMEOUT`, `VALIDATION_ERROR`, ...)
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Optional structured details (e.g. field issues)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Create an error body
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Attach structured details
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<&crate::error::Error> for ErrorBody {
    fn from(err: &crate::error::Error) -> Self {
        let body = Self::new(err.code(), err.to_string());
        match err {
            crate::error::Error::Validation { issues } | crate::error::Error::Config { issues } => {
                body.with_details(serde_json::json!({ "issues": issues }))
            }
            _ => body,
        }
    }
}

/// Uniform result envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Whether the operation succeeded
    pub success: bool,
    /// Payload, present exactly when `success` is true
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error, present exactly when `success` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    /// Timing block, always present
    pub execution: ExecutionInfo,
}

impl<T> Envelope<T> {
    /// Wrap a successful payload
    #[must_use]
    pub fn success(data: T, execution: ExecutionInfo) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            execution,
        }
    }

    /// Wrap a failure
    #[must_use]
    pub fn failure(error: ErrorBody, execution: ExecutionInfo) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            execution,
        }
    }
}
