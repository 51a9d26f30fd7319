//! Provider trait - chat-model abstraction
//!
//! This module defines the trait the rest of the core programs against.
//! The intent classifier and chat-flavored agent handlers receive a
//! `dyn ChatModel` and never know which provider is behind it.

use crate::completion::{CompletionRequest, CompletionResponse};
use crate::error::Result;

/// Trait for chat-model providers
#[async_trait::async_trait]
pub trait ChatModel: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Get the default model id
    fn default_model(&self) -> &str;

    /// Complete a conversation
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::message::Message;

    struct EchoModel;

    #[async_trait::async_trait]
    impl ChatModel for EchoModel {
        fn name(&self) -> &str {
            "echo"
        }

        fn default_model(&self) -> &str {
            "echo-1"
        }

        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
            let last = request
                .messages
                .last()
                .ok_or_else(|| Error::InvalidResponse("no messages".to_string()))?;
            Ok(CompletionResponse {
                content: last.content.clone(),
                usage: None,
                finish_reason: Some("stop".to_string()),
                model: request.model,
            })
        }
    }

    #[tokio::test]
    async fn test_trait_object_dispatch() {
        let model: Box<dyn ChatModel> = Box::new(EchoModel);
        let response = model
            .complete(CompletionRequest::new("echo-1").with_message(Message::user("hi")))
            .await
            .unwrap();
        assert_eq!(response.content, "hi");
    }
}
