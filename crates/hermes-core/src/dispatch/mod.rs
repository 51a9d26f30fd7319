//! Agent execution dispatcher
//!
//! Runs the handler for an agent type under a hard deadline and reports
//! every outcome in the uniform [`Envelope`] shape. Handlers are looked
//! up in a [`HandlerTable`] keyed by agent type, so new agents plug in
//! without touching dispatch logic.

use crate::agent::AgentType;
use crate::config::AgentConfig;
use crate::envelope::{Envelope, ErrorBody, ExecutionInfo};
use crate::error::{Error, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Agent handler implementations
pub mod handlers;

/// Lifecycle of one execution. Terminal states are exclusive and final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionPhase {
    /// Created, not yet running
    Pending,
    /// Handler in flight
    Running,
    /// Finished with a payload
    Succeeded,
    /// Finished with an error
    Failed,
    /// Deadline expired before the handler finished
    TimedOut,
}

impl ExecutionPhase {
    /// Whether this phase is terminal
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::TimedOut)
    }

    /// Whether a transition to `next` is legal
    #[must_use]
    pub fn can_transition(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running)
                | (Self::Running, Self::Succeeded)
                | (Self::Running, Self::Failed)
                | (Self::Running, Self::TimedOut)
        )
    }
}

/// Model descriptor passed by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Model id
    pub id: String,
    /// Context-length limit in tokens
    pub token_limit: u32,
}

/// Runtime input to the dispatcher. Owned by the caller; read-only
/// during execution.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    /// The query the agent should answer
    pub query: String,
    /// Full message list (may be empty for API-only usage)
    pub messages: Vec<hermes_llm::Message>,
    /// Bounded prior-turn history, most recent last
    pub history: Vec<String>,
    /// Authenticated user id
    pub user: Option<String>,
    /// Model descriptor
    pub model: Option<ModelDescriptor>,
    /// BCP-47 locale tag
    pub locale: String,
    /// Correlation id for tracing
    pub correlation_id: String,
}

impl ExecutionContext {
    /// Create a context for a query
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            locale: "en-US".to_string(),
            ..Default::default()
        }
    }

    /// Set the history
    #[must_use]
    pub fn with_history(mut self, history: Vec<String>) -> Self {
        self.history = history;
        self
    }

    /// Set the user id
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Set the model descriptor
    #[must_use]
    pub fn with_model(mut self, model: ModelDescriptor) -> Self {
        self.model = Some(model);
        self
    }

    /// Set the locale
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Set the correlation id
    #[must_use]
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = id.into();
        self
    }
}

/// What a handler returns on success
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentReply {
    /// Primary content
    pub content: String,
    /// Optional structured payload (citations, tool traces)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured: Option<Value>,
    /// Handler confidence in [0, 1], when meaningful
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    /// Handler-specific metadata
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl AgentReply {
    /// Create a reply with content
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Attach a structured payload
    #[must_use]
    pub fn with_structured(mut self, structured: Value) -> Self {
        self.structured = Some(structured);
        self
    }

    /// Set the confidence, clamped to [0, 1]
    #[must_use]
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 1.0));
        self
    }

    /// Add a metadata entry
    #[must_use]
    pub fn with_metadata_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Successful execution payload inside the envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSuccess {
    /// Primary content
    pub content: String,
    /// Agent type that produced it
    pub agent_type: AgentType,
    /// Config id of this execution
    pub agent_id: String,
    /// Optional structured payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured: Option<Value>,
    /// Handler confidence in [0, 1], when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    /// Handler wall-clock time in milliseconds
    pub processing_time_ms: u64,
    /// Handler-specific metadata
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

/// Trait for agent implementations
#[async_trait::async_trait]
pub trait AgentHandler: Send + Sync {
    /// The agent type this handler serves
    fn agent_type(&self) -> AgentType;

    /// Do the agent's work
    async fn handle(&self, ctx: &ExecutionContext, config: &AgentConfig) -> Result<AgentReply>;
}

/// Table mapping agent types to handler implementations.
///
/// Registering a second handler for a type overwrites the first, same as
/// the tool registry.
#[derive(Default)]
pub struct HandlerTable {
    handlers: HashMap<AgentType, Arc<dyn AgentHandler>>,
}

impl HandlerTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its agent type
    pub fn register(&mut self, handler: Arc<dyn AgentHandler>) {
        let agent_type = handler.agent_type();
        debug!(agent = %agent_type, "Registering agent handler");
        self.handlers.insert(agent_type, handler);
    }

    /// Get the handler for an agent type
    #[must_use]
    pub fn get(&self, agent_type: AgentType) -> Option<Arc<dyn AgentHandler>> {
        self.handlers.get(&agent_type).cloned()
    }

    /// Whether a handler is registered for the type
    #[must_use]
    pub fn has(&self, agent_type: AgentType) -> bool {
        self.handlers.contains_key(&agent_type)
    }

    /// Registered agent types
    #[must_use]
    pub fn agent_types(&self) -> Vec<AgentType> {
        self.handlers.keys().copied().collect()
    }
}

/// Outcome type returned by the dispatcher
pub type ExecutionOutcome = Envelope<AgentSuccess>;

/// Agent execution dispatcher
pub struct Dispatcher {
    handlers: Arc<HandlerTable>,
}

impl Dispatcher {
    /// Create a dispatcher over a handler table
    #[must_use]
    pub fn new(handlers: Arc<HandlerTable>) -> Self {
        Self { handlers }
    }

    /// Execute an agent under a hard deadline.
    ///
    /// The deadline is `timeout_override` when given, otherwise the
    /// config's timeout. On expiry the in-flight handler future is
    /// dropped and the outcome is a `REQUEST_TIMEOUT` failure; a late
    /// underlying response is discarded. A retryable handler error is
    /// retried once, sequentially, within the same deadline.
    #[instrument(skip(self, ctx, config), fields(agent = %agent_type, id = %config.id))]
    pub async fn execute(
        &self,
        agent_type: AgentType,
        ctx: &ExecutionContext,
        config: &AgentConfig,
        timeout_override: Option<Duration>,
    ) -> ExecutionOutcome {
        let started_at = Utc::now();
        let mut phase = ExecutionPhase::Pending;

        let Some(handler) = self.handlers.get(agent_type) else {
            let err = Error::execution(
                "AGENT_NOT_FOUND",
                format!("no handler registered for {agent_type}"),
                false,
            );
            return Envelope::failure(
                ErrorBody::from(&err),
                ExecutionInfo::since(started_at, agent_type.as_str()),
            );
        };

        debug_assert!(phase.can_transition(ExecutionPhase::Running));
        phase = ExecutionPhase::Running;

        let deadline = timeout_override.unwrap_or(Duration::from_millis(config.timeout_ms));

        match tokio::time::timeout(deadline, run_with_retry(&*handler, ctx, config)).await {
            Ok(Ok(reply)) => {
                debug_assert!(phase.can_transition(ExecutionPhase::Succeeded));
                let execution = ExecutionInfo::since(started_at, agent_type.as_str());
                debug!(duration_ms = execution.duration_ms, "Agent execution succeeded");
                Envelope::success(
                    AgentSuccess {
                        content: reply.content,
                        agent_type,
                        agent_id: config.id.clone(),
                        structured: reply.structured,
                        confidence: reply.confidence,
                        processing_time_ms: execution.duration_ms,
                        metadata: reply.metadata,
                    },
                    execution,
                )
            }
            Ok(Err(err)) => {
                debug_assert!(phase.can_transition(ExecutionPhase::Failed));
                warn!(error = %err, "Agent execution failed");
                Envelope::failure(
                    ErrorBody::from(&err),
                    ExecutionInfo::since(started_at, agent_type.as_str()),
                )
            }
            Err(_) => {
                debug_assert!(phase.can_transition(ExecutionPhase::TimedOut));
                let err = Error::Timeout(deadline.as_millis() as u64);
                warn!(timeout_ms = %deadline.as_millis(), "Agent execution timed out");
                Envelope::failure(
                    ErrorBody::from(&err),
                    ExecutionInfo::since(started_at, agent_type.as_str()),
                )
            }
        }
    }
}

/// One attempt, plus one sequential retry for retryable errors.
async fn run_with_retry(
    handler: &dyn AgentHandler,
    ctx: &ExecutionContext,
    config: &AgentConfig,
) -> Result<AgentReply> {
    match handler.handle(ctx, config).await {
        Ok(reply) => Ok(reply),
        Err(err) if err.is_retryable() => {
            debug!(error = %err, "Retrying agent handler once");
            handler.handle(ctx, config).await
        }
        Err(err) => Err(err),
    }
}
