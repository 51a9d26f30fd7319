//! Chat-model provider implementations

/// OpenAI-compatible `/chat/completions` provider
pub mod openai;
