//! hermes-llm - Chat-model client abstraction
//!
//! This crate provides the model-client seam the Hermes core programs
//! against: message and completion types, the [`ChatModel`] trait, and an
//! OpenAI-compatible provider implementation.

#![warn(missing_docs)]

/// Completion request/response types
pub mod completion;
/// Error types
pub mod error;
/// Conversation message types
pub mod message;
/// Provider trait
pub mod provider;
/// Provider implementations
pub mod providers;

pub use completion::{CompletionRequest, CompletionResponse, ResponseFormat, TokenUsage};
pub use error::{Error, Result};
pub use message::{Message, MessageRole};
pub use provider::ChatModel;
pub use providers::openai::{OpenAiConfig, OpenAiProvider};
