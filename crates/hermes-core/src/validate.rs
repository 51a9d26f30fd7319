//! Request-boundary validation
//!
//! The HTTP route layer parses the wire request and hands the raw shapes
//! here. Validation collects every violated field before failing, so the
//! caller can report the complete list in one round trip.

use crate::agent::AgentType;
use crate::dispatch::{AgentSuccess, ExecutionOutcome, ModelDescriptor};
use crate::envelope::{Envelope, ErrorBody, ExecutionInfo};
use crate::error::{Error, FieldIssue, Result};
use crate::intent::IntentContext;
use chrono::Utc;
use serde::Deserialize;

/// Maximum message length for intent analysis
pub const MAX_MESSAGE_LEN: usize = 5_000;

/// Maximum query length for agent execution
pub const MAX_QUERY_LEN: usize = 10_000;

/// Maximum prior turns accepted from the caller
pub const MAX_HISTORY_TURNS: usize = 10;

/// Raw intent analysis request from the route layer
#[derive(Debug, Clone, Deserialize)]
pub struct IntentRequest {
    /// Message to classify
    pub message: String,
    /// Prior turns, most recent last
    #[serde(default)]
    pub conversation_history: Vec<String>,
    /// BCP-47 locale tag
    #[serde(default)]
    pub locale: Option<String>,
    /// Caller user agent, carried for diagnostics
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl IntentRequest {
    /// Validate and convert into an [`IntentContext`].
    ///
    /// # Errors
    /// Returns `Error::Validation` listing every violated field.
    pub fn into_context(self) -> Result<IntentContext> {
        let mut issues = Vec::new();

        if self.message.is_empty() {
            issues.push(FieldIssue::new("message", "must not be empty"));
        } else if self.message.len() > MAX_MESSAGE_LEN {
            issues.push(FieldIssue::new(
                "message",
                format!("must be at most {MAX_MESSAGE_LEN} characters"),
            ));
        }
        if self.conversation_history.len() > MAX_HISTORY_TURNS {
            issues.push(FieldIssue::new(
                "conversation_history",
                format!("at most {MAX_HISTORY_TURNS} prior turns"),
            ));
        }

        if !issues.is_empty() {
            return Err(Error::Validation { issues });
        }

        let mut ctx = IntentContext::new(self.message).with_history(self.conversation_history);
        if let Some(locale) = self.locale {
            ctx = ctx.with_locale(locale);
        }
        Ok(ctx)
    }
}

/// Raw agent execution request from the route layer
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionRequest {
    /// Agent type name (snake_case)
    pub agent_type: String,
    /// Query for the agent
    pub query: String,
    /// Prior turns, most recent last
    #[serde(default)]
    pub conversation_history: Vec<String>,
    /// Model descriptor
    #[serde(default)]
    pub model: Option<ModelDescriptor>,
    /// Type-specific config overrides
    #[serde(default)]
    pub config: Option<serde_json::Map<String, serde_json::Value>>,
    /// Timeout override in milliseconds
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl ExecutionRequest {
    /// Validate the request and resolve its agent type.
    ///
    /// # Errors
    /// Returns `Error::Validation` listing every violated field,
    /// including an unparseable `agent_type`.
    pub fn validate(&self) -> Result<AgentType> {
        let mut issues = Vec::new();

        let agent_type = match self.agent_type.parse::<AgentType>() {
            Ok(agent_type) => Some(agent_type),
            Err(e) => {
                issues.push(FieldIssue::new("agent_type", e));
                None
            }
        };

        if self.query.is_empty() {
            issues.push(FieldIssue::new("query", "must not be empty"));
        } else if self.query.len() > MAX_QUERY_LEN {
            issues.push(FieldIssue::new(
                "query",
                format!("must be at most {MAX_QUERY_LEN} characters"),
            ));
        }
        if self.conversation_history.len() > MAX_HISTORY_TURNS {
            issues.push(FieldIssue::new(
                "conversation_history",
                format!("at most {MAX_HISTORY_TURNS} prior turns"),
            ));
        }
        if self.timeout_ms == Some(0) {
            issues.push(FieldIssue::new("timeout_ms", "must be positive"));
        }

        match agent_type {
            Some(agent_type) if issues.is_empty() => Ok(agent_type),
            _ => Err(Error::Validation { issues }),
        }
    }
}

/// Wrap a pre-execution rejection in the uniform envelope.
///
/// `agent_type` is `"unknown"` when the type could not be determined
/// before the error occurred.
#[must_use]
pub fn rejection(err: &Error, agent_type: Option<AgentType>) -> ExecutionOutcome {
    let name = agent_type.map_or("unknown", AgentType::as_str);
    Envelope::<AgentSuccess>::failure(ErrorBody::from(err), ExecutionInfo::since(Utc::now(), name))
}
