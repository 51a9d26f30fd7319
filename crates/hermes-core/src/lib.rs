//! hermes-core - Agent routing and execution engine
//!
//! Given a user query plus conversation context, decide which specialized
//! agent should handle it, execute that agent under a hard deadline, and
//! report the outcome in a uniform envelope.
//!
//! The pieces, leaf-first:
//!
//! - [`agent`]: the closed [`AgentType`](agent::AgentType) set and the
//!   fixed type-to-environment mapping
//! - [`intent`]: AI + heuristic classification behind the
//!   [`IntentService`](intent::IntentService), with caching and metrics
//! - [`config`]: per-request [`AgentConfig`](config::AgentConfig)
//!   assembly with strongly typed per-agent parameters
//! - [`dispatch`]: the [`Dispatcher`](dispatch::Dispatcher), handler
//!   table, and per-type handlers
//! - [`envelope`]: the `{success, data | error, execution}` shape every
//!   outcome is reported in
//! - [`validate`]: request-boundary validation for the route layer
//!
//! Services are constructed explicitly and shared via `Arc`; there is no
//! global state.

#![warn(missing_docs)]

/// Agent types and execution environments
pub mod agent;
/// Agent configuration assembly
pub mod config;
/// Execution dispatch
pub mod dispatch;
/// Uniform result envelope
pub mod envelope;
/// Error taxonomy
pub mod error;
/// Intent analysis
pub mod intent;
/// Request-boundary validation
pub mod validate;

pub use agent::{AgentType, ExecutionEnvironment};
pub use config::{build_config, AgentConfig, AgentParams, RequestMetadata};
pub use dispatch::handlers::standard_table;
pub use dispatch::{
    AgentHandler, AgentReply, AgentSuccess, Dispatcher, ExecutionContext, ExecutionOutcome,
    ExecutionPhase, HandlerTable, ModelDescriptor,
};
pub use envelope::{Envelope, ErrorBody, ExecutionInfo};
pub use error::{Error, FieldIssue, Result};
pub use intent::{
    AnalysisMethod, IntentAnalysis, IntentContext, IntentMetricsSnapshot, IntentService,
    IntentServiceConfig,
};
pub use validate::{ExecutionRequest, IntentRequest};
