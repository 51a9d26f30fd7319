//! Agent handler implementations
//!
//! One handler per agent type, selected through the [`HandlerTable`].
//! Tool-backed agents resolve their capability from the tool registry at
//! execution time; chat-flavored agents drive the configured chat model.

use crate::agent::AgentType;
use crate::config::{AgentConfig, AgentParams};
use crate::dispatch::{AgentHandler, AgentReply, ExecutionContext, HandlerTable};
use crate::error::{Error, Result};
use hermes_llm::{ChatModel, CompletionRequest, Message};
use hermes_tools::{
    dedupe_citations, extract_citations, format_citations, insert_citation_markers,
    sort_citations, CitationOrder, SearchHit, ToolRegistry, WEB_SEARCH_KIND,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Registry kinds for the remaining tool-backed agents
const URL_PULL_KIND: &str = "url_pull";
const CODE_SANDBOX_KIND: &str = "code_sandbox";
const KNOWLEDGE_KIND: &str = "knowledge_lookup";
const FOUNDRY_KIND: &str = "foundry_agent";
const THIRD_PARTY_KIND: &str = "third_party_agent";

/// Web search agent: search tool plus citation pipeline
pub struct WebSearchHandler {
    registry: Arc<ToolRegistry>,
}

impl WebSearchHandler {
    /// Create a handler over the shared registry
    #[must_use]
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait::async_trait]
impl AgentHandler for WebSearchHandler {
    fn agent_type(&self) -> AgentType {
        AgentType::WebSearch
    }

    async fn handle(&self, ctx: &ExecutionContext, config: &AgentConfig) -> Result<AgentReply> {
        let AgentParams::WebSearch {
            max_results,
            locale_override,
            ..
        } = &config.params
        else {
            return Err(Error::execution(
                "EXECUTION_FAILED",
                "web search handler received mismatched params",
                false,
            ));
        };

        let tool = self.registry.get(WEB_SEARCH_KIND).ok_or_else(|| {
            Error::execution("AGENT_NOT_FOUND", "web_search tool not registered", false)
        })?;

        let locale = locale_override.as_deref().unwrap_or(&ctx.locale);
        let outcome = tool
            .execute(serde_json::json!({
                "query": ctx.query,
                "max_results": max_results,
                "locale": locale,
            }))
            .await?;

        if !outcome.success {
            return Err(Error::execution(
                "EXECUTION_FAILED",
                outcome.error.unwrap_or_else(|| "search failed".to_string()),
                false,
            ));
        }

        let hits: Vec<SearchHit> =
            serde_json::from_value(outcome.output["results"].clone()).map_err(|e| {
                Error::execution(
                    "EXECUTION_FAILED",
                    format!("malformed search results: {e}"),
                    false,
                )
            })?;

        let mut citations = dedupe_citations(extract_citations(&hits));
        sort_citations(&mut citations, CitationOrder::Relevance);

        debug!(hits = hits.len(), citations = citations.len(), "Search complete");

        let summary: String = citations
            .iter()
            .filter(|c| !c.snippet.is_empty())
            .map(|c| c.snippet.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let annotated = insert_citation_markers(&summary, &citations);
        let sources = format_citations(&citations);
        let content = if sources.is_empty() {
            annotated
        } else {
            format!("{annotated}\n\n{sources}")
        };

        let confidence = citations
            .first()
            .and_then(|c| c.score)
            .map(|s| s.clamp(0.0, 1.0) as f32);

        let mut reply = AgentReply::new(content)
            .with_structured(serde_json::json!({ "citations": citations }))
            .with_metadata_entry("result_count", Value::from(hits.len()));
        if let Some(confidence) = confidence {
            reply = reply.with_confidence(confidence);
        }
        Ok(reply)
    }
}

/// Plain conversational chat over the configured model
pub struct ChatHandler {
    model: Option<Arc<dyn ChatModel>>,
}

impl ChatHandler {
    /// Create a handler; a missing model fails at execution time with a
    /// stable code, keeping the envelope uniform.
    #[must_use]
    pub fn new(model: Option<Arc<dyn ChatModel>>) -> Self {
        Self { model }
    }

    fn model(&self) -> Result<&Arc<dyn ChatModel>> {
        self.model.as_ref().ok_or_else(|| {
            Error::execution("MODEL_NOT_CONFIGURED", "no chat model configured", false)
        })
    }
}

#[async_trait::async_trait]
impl AgentHandler for ChatHandler {
    fn agent_type(&self) -> AgentType {
        AgentType::StandardChat
    }

    async fn handle(&self, ctx: &ExecutionContext, config: &AgentConfig) -> Result<AgentReply> {
        let model = self.model()?;
        let AgentParams::StandardChat {
            temperature,
            max_tokens,
        } = &config.params
        else {
            return Err(Error::execution(
                "EXECUTION_FAILED",
                "chat handler received mismatched params",
                false,
            ));
        };

        let mut messages = vec![Message::system(&config.instructions)];
        if ctx.messages.is_empty() {
            for turn in &ctx.history {
                messages.push(Message::user(turn));
            }
            messages.push(Message::user(&ctx.query));
        } else {
            messages.extend(ctx.messages.iter().cloned());
        }

        let request = CompletionRequest::new(&config.model_id)
            .with_messages(messages)
            .with_temperature(*temperature as f32)
            .with_max_tokens(*max_tokens as u32);

        let response = model.complete(request).await?;

        let mut reply = AgentReply::new(response.content);
        if let Some(usage) = response.usage {
            reply = reply.with_metadata_entry("total_tokens", Value::from(usage.total_tokens));
        }
        Ok(reply)
    }
}

/// Translation over the configured model
pub struct TranslationHandler {
    model: Option<Arc<dyn ChatModel>>,
}

impl TranslationHandler {
    /// Create a handler
    #[must_use]
    pub fn new(model: Option<Arc<dyn ChatModel>>) -> Self {
        Self { model }
    }
}

#[async_trait::async_trait]
impl AgentHandler for TranslationHandler {
    fn agent_type(&self) -> AgentType {
        AgentType::Translation
    }

    async fn handle(&self, ctx: &ExecutionContext, config: &AgentConfig) -> Result<AgentReply> {
        let model = self.model.as_ref().ok_or_else(|| {
            Error::execution("MODEL_NOT_CONFIGURED", "no chat model configured", false)
        })?;
        let AgentParams::Translation {
            source_lang,
            target_lang,
        } = &config.params
        else {
            return Err(Error::execution(
                "EXECUTION_FAILED",
                "translation handler received mismatched params",
                false,
            ));
        };

        let instruction = match source_lang {
            Some(source) => format!(
                "Translate the following text from {source} into {target_lang}. \
                 Reply with the translation only."
            ),
            None => format!(
                "Translate the following text into {target_lang}. \
                 Reply with the translation only."
            ),
        };

        let request = CompletionRequest::new(&config.model_id)
            .with_message(Message::system(instruction))
            .with_message(Message::user(&ctx.query))
            .with_temperature(0.2);

        let response = model.complete(request).await?;

        Ok(AgentReply::new(response.content)
            .with_structured(serde_json::json!({ "target_language": target_lang })))
    }
}

/// Generic handler for agents whose work is one registry tool call
pub struct ToolBackedHandler {
    agent_type: AgentType,
    tool_kind: &'static str,
    registry: Arc<ToolRegistry>,
}

impl ToolBackedHandler {
    /// Create a handler binding an agent type to a tool kind
    #[must_use]
    pub fn new(agent_type: AgentType, tool_kind: &'static str, registry: Arc<ToolRegistry>) -> Self {
        Self {
            agent_type,
            tool_kind,
            registry,
        }
    }
}

#[async_trait::async_trait]
impl AgentHandler for ToolBackedHandler {
    fn agent_type(&self) -> AgentType {
        self.agent_type
    }

    async fn handle(&self, ctx: &ExecutionContext, _config: &AgentConfig) -> Result<AgentReply> {
        let tool = self.registry.get(self.tool_kind).ok_or_else(|| {
            Error::execution(
                "AGENT_NOT_FOUND",
                format!("{} tool not registered", self.tool_kind),
                false,
            )
        })?;

        let outcome = tool
            .execute(serde_json::json!({
                "query": ctx.query,
                "locale": ctx.locale,
            }))
            .await?;

        if !outcome.success {
            return Err(Error::execution(
                "EXECUTION_FAILED",
                outcome
                    .error
                    .unwrap_or_else(|| format!("{} failed", self.tool_kind)),
                false,
            ));
        }

        let content = match &outcome.output {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        Ok(AgentReply::new(content)
            .with_structured(outcome.output)
            .with_metadata_entry("duration_ms", Value::from(outcome.duration_ms)))
    }
}

/// Build a handler table covering every agent type.
///
/// Tool-backed agents resolve through `registry`; chat-flavored agents
/// use `model` and fail with `MODEL_NOT_CONFIGURED` when none is given.
#[must_use]
pub fn standard_table(
    registry: Arc<ToolRegistry>,
    model: Option<Arc<dyn ChatModel>>,
) -> HandlerTable {
    let mut table = HandlerTable::new();
    table.register(Arc::new(WebSearchHandler::new(Arc::clone(&registry))));
    table.register(Arc::new(ChatHandler::new(model.clone())));
    table.register(Arc::new(TranslationHandler::new(model)));
    table.register(Arc::new(ToolBackedHandler::new(
        AgentType::UrlPull,
        URL_PULL_KIND,
        Arc::clone(&registry),
    )));
    table.register(Arc::new(ToolBackedHandler::new(
        AgentType::CodeInterpreter,
        CODE_SANDBOX_KIND,
        Arc::clone(&registry),
    )));
    table.register(Arc::new(ToolBackedHandler::new(
        AgentType::LocalKnowledge,
        KNOWLEDGE_KIND,
        Arc::clone(&registry),
    )));
    table.register(Arc::new(ToolBackedHandler::new(
        AgentType::Foundry,
        FOUNDRY_KIND,
        Arc::clone(&registry),
    )));
    table.register(Arc::new(ToolBackedHandler::new(
        AgentType::ThirdParty,
        THIRD_PARTY_KIND,
        registry,
    )));
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{build_config, RequestMetadata};
    use hermes_tools::{Tool, ToolDescriptor, ToolOutcome};

    struct FixedSearchTool {
        descriptor: ToolDescriptor,
    }

    impl FixedSearchTool {
        fn new() -> Self {
            Self {
                descriptor: ToolDescriptor::new(WEB_SEARCH_KIND, "fixture"),
            }
        }
    }

    #[async_trait::async_trait]
    impl Tool for FixedSearchTool {
        fn descriptor(&self) -> &ToolDescriptor {
            &self.descriptor
        }

        async fn execute(&self, _input: Value) -> hermes_tools::Result<ToolOutcome> {
            Ok(ToolOutcome::success(
                serde_json::json!({
                    "query": "q",
                    "results": [
                        {"title": "Alpha", "url": "https://a.com", "snippet": "alpha facts", "score": 0.9},
                        {"title": "Beta", "url": "https://b.com", "snippet": "beta facts", "score": 0.7}
                    ],
                    "total": 2
                }),
                5,
            ))
        }
    }

    fn registry_with_search() -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(FixedSearchTool::new()));
        Arc::new(registry)
    }

    #[tokio::test]
    async fn test_web_search_handler_builds_citations() {
        let handler = WebSearchHandler::new(registry_with_search());
        let config =
            build_config(AgentType::WebSearch, None, RequestMetadata::new("r")).unwrap();
        let reply = handler
            .handle(&ExecutionContext::new("anything"), &config)
            .await
            .unwrap();

        assert!(reply.content.contains("Sources:"));
        assert!(reply.content.contains("alpha facts[1]"));
        assert_eq!(reply.confidence, Some(0.9));
        let citations = reply.structured.unwrap()["citations"].clone();
        assert_eq!(citations.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_web_search_handler_without_tool() {
        let handler = WebSearchHandler::new(Arc::new(ToolRegistry::new()));
        let config =
            build_config(AgentType::WebSearch, None, RequestMetadata::new("r")).unwrap();
        let err = handler
            .handle(&ExecutionContext::new("anything"), &config)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "AGENT_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_chat_handler_without_model() {
        let handler = ChatHandler::new(None);
        let config =
            build_config(AgentType::StandardChat, None, RequestMetadata::new("r")).unwrap();
        let err = handler
            .handle(&ExecutionContext::new("hello"), &config)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "MODEL_NOT_CONFIGURED");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_standard_table_covers_every_type() {
        let table = standard_table(registry_with_search(), None);
        for agent_type in AgentType::ALL {
            assert!(table.has(*agent_type), "missing handler for {agent_type}");
        }
    }
}
