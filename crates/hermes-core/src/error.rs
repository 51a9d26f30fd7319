//! Error types for hermes-core
//!
//! One variant per failure kind in the routing/execution taxonomy. Every
//! public operation in this crate fails with one of these; raw provider or
//! tool errors never escape unconverted.

use thiserror::Error;

/// A single invalid field in caller-supplied input
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldIssue {
    /// Field name as supplied by the caller
    pub field: String,
    /// What is wrong with it
    pub message: String,
}

impl FieldIssue {
    /// Create a new field issue
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or out-of-range caller input; lists every invalid field
    #[error("validation failed: {}", format_issues(.issues))]
    Validation {
        /// Every violated field, not just the first
        issues: Vec<FieldIssue>,
    },

    /// AI classifier transport/parse failure; recovered by heuristic fallback
    #[error("classification failed: {0}")]
    Classification(String),

    /// Agent handler failure during dispatch
    #[error("execution failed ({code}): {message}")]
    Execution {
        /// Stable error code preserved for caller diagnostics
        code: String,
        /// Human-readable message
        message: String,
        /// Whether one sequential retry is worthwhile
        retryable: bool,
    },

    /// Deadline exceeded during agent execution
    #[error("timeout after {0}ms")]
    Timeout(u64),

    /// Malformed override input to the configuration builder
    #[error("invalid configuration: {}", format_issues(.issues))]
    Config {
        /// Every invalid override key, not just the first
        issues: Vec<FieldIssue>,
    },
}

fn format_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{}: {}", i.field, i.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Build an execution error with a stable code
    #[must_use]
    pub fn execution(
        code: impl Into<String>,
        message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        Self::Execution {
            code: code.into(),
            message: message.into(),
            retryable,
        }
    }

    /// Stable wire code for this error
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Classification(_) => "CLASSIFICATION_FAILED",
            Self::Execution { code, .. } => code,
            Self::Timeout(_) => "REQUEST_TIMEOUT",
            Self::Config { .. } => "CONFIGURATION_ERROR",
        }
    }

    /// Whether the dispatcher may retry the operation once
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Execution { retryable: true, .. })
    }
}

impl From<hermes_tools::Error> for Error {
    fn from(err: hermes_tools::Error) -> Self {
        use hermes_tools::Error as ToolError;
        match err {
            ToolError::NotFound(kind) => {
                Self::execution("AGENT_NOT_FOUND", format!("tool not found: {kind}"), false)
            }
            ToolError::InvalidInput(msg) => Self::execution("VALIDATION_ERROR", msg, false),
            ToolError::Network(msg) => Self::execution("EXECUTION_FAILED", msg, true),
            ToolError::Timeout(ms) => {
                Self::execution("EXECUTION_FAILED", format!("tool timeout after {ms}ms"), true)
            }
            ToolError::Execution(msg) => Self::execution("EXECUTION_FAILED", msg, false),
        }
    }
}

impl From<hermes_llm::Error> for Error {
    fn from(err: hermes_llm::Error) -> Self {
        use hermes_llm::Error as LlmError;
        let retryable = err.is_retryable();
        let code = match err {
            LlmError::NotConfigured(_) => "MODEL_NOT_CONFIGURED",
            _ => "EXECUTION_FAILED",
        };
        Self::execution(code, err.to_string(), retryable)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let err = Error::Validation {
            issues: vec![FieldIssue::new("message", "too long")],
        };
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(Error::Timeout(100).code(), "REQUEST_TIMEOUT");
        assert_eq!(
            Error::execution("RATE_LIMITED", "slow down", true).code(),
            "RATE_LIMITED"
        );
    }

    #[test]
    fn test_validation_lists_every_field() {
        let err = Error::Validation {
            issues: vec![
                FieldIssue::new("message", "must not be empty"),
                FieldIssue::new("history", "at most 10 turns"),
            ],
        };
        let text = err.to_string();
        assert!(text.contains("message"));
        assert!(text.contains("history"));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(Error::execution("EXECUTION_FAILED", "503", true).is_retryable());
        assert!(!Error::execution("VALIDATION_ERROR", "bad", false).is_retryable());
        assert!(!Error::Timeout(100).is_retryable());
    }

    #[test]
    fn test_tool_error_conversion() {
        let err: Error = hermes_tools::Error::Network("dns".to_string()).into();
        assert!(err.is_retryable());
        let err: Error = hermes_tools::Error::InvalidInput("bad".to_string()).into();
        assert!(!err.is_retryable());
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
