//! AI intent classifier
//!
//! Asks a chat model for a structured classification verdict. Transport
//! and parse failures surface as `Error::Classification`; the service
//! layer decides whether to fall back to the heuristic path.

use crate::agent::AgentType;
use crate::error::{Error, Result};
use crate::intent::{AnalysisMethod, IntentAnalysis, IntentContext};
use hermes_llm::{ChatModel, CompletionRequest, Message};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Hard deadline for one classification request
const CLASSIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// How many trailing history turns are shown to the model
const HISTORY_WINDOW: usize = 3;

/// Token budget for the verdict
const MAX_VERDICT_TOKENS: u32 = 500;

const SYSTEM_PROMPT: &str = "\
You route user queries to specialized agents. Reply with a single JSON \
object, no prose: {\"agent\": <type>, \"confidence\": <0..1>, \
\"alternatives\": [{\"agent\": <type>, \"confidence\": <0..1>}, ...1-3 entries], \
\"parameters\": {<extracted slot values, e.g. search_query, target_language>}, \
\"reasoning\": <one sentence>}.\n\
Agent types: web_search (live web information), url_pull (fetch and use a \
specific URL), code_interpreter (write or run code, calculations), \
local_knowledge (the user's own documents), translation (translate text), \
foundry (managed foundry agent), third_party (external agent), \
standard_chat (plain conversation).";

/// Structured-output classification over a chat model
pub struct AiClassifier {
    timeout: Duration,
}

impl Default for AiClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl AiClassifier {
    /// Create a classifier with the default 10s request timeout
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeout: CLASSIFY_TIMEOUT,
        }
    }

    /// Override the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Classify the query with the given model.
    ///
    /// # Errors
    /// Returns `Error::Classification` on timeout, transport failure, or
    /// an unparseable verdict. Never propagates a raw provider error.
    #[instrument(skip(self, ctx, model), fields(model_id = %model_id))]
    pub async fn classify(
        &self,
        ctx: &IntentContext,
        model: &dyn ChatModel,
        model_id: &str,
    ) -> Result<IntentAnalysis> {
        let start = Instant::now();

        let request = CompletionRequest::new(model_id)
            .with_message(Message::system(SYSTEM_PROMPT))
            .with_message(Message::user(build_user_prompt(ctx)))
            .with_max_tokens(MAX_VERDICT_TOKENS)
            .with_temperature(0.1)
            .with_json_output();

        let response = tokio::time::timeout(self.timeout, model.complete(request))
            .await
            .map_err(|_| {
                warn!(timeout_ms = %self.timeout.as_millis(), "AI classification timed out");
                Error::Classification(format!(
                    "classification timed out after {}ms",
                    self.timeout.as_millis()
                ))
            })?
            .map_err(|e| Error::Classification(e.to_string()))?;

        let verdict = parse_verdict(&response.content)?;
        let recommended: AgentType = verdict
            .agent
            .parse()
            .map_err(Error::Classification)?;

        let alternatives = verdict
            .alternatives
            .into_iter()
            .filter_map(|alt| alt.agent.parse().ok().map(|agent| (agent, alt.confidence)))
            .collect();

        debug!(agent = %recommended, confidence = verdict.confidence, "AI verdict");

        let mut analysis = IntentAnalysis::new(
            recommended,
            verdict.confidence,
            alternatives,
            AnalysisMethod::Ai,
            ctx.locale.clone(),
        )
        .with_parameters(verdict.parameters)
        .with_reasoning(verdict.reasoning);
        analysis.processing_time_ms = start.elapsed().as_millis() as u64;
        Ok(analysis)
    }
}

/// Build the user prompt: trailing history, routing hints, then the query.
fn build_user_prompt(ctx: &IntentContext) -> String {
    let mut prompt = String::new();

    let tail_start = ctx.history.len().saturating_sub(HISTORY_WINDOW);
    if tail_start < ctx.history.len() {
        prompt.push_str("Recent conversation:\n");
        for turn in &ctx.history[tail_start..] {
            prompt.push_str("- ");
            prompt.push_str(turn);
            prompt.push('\n');
        }
    }

    if !ctx.disabled_agents.is_empty() {
        let disabled: Vec<&str> = ctx.disabled_agents.iter().map(AgentType::as_str).collect();
        prompt.push_str(&format!("Never choose: {}\n", disabled.join(", ")));
    }
    if !ctx.preferred_agents.is_empty() {
        let preferred: Vec<&str> = ctx.preferred_agents.iter().map(AgentType::as_str).collect();
        prompt.push_str(&format!("Prefer when plausible: {}\n", preferred.join(", ")));
    }

    prompt.push_str(&format!("Locale: {}\nQuery: {}", ctx.locale, ctx.query));
    prompt
}

#[derive(Debug, Deserialize)]
struct Verdict {
    agent: String,
    confidence: f32,
    #[serde(default)]
    alternatives: Vec<VerdictAlternative>,
    #[serde(default)]
    parameters: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    reasoning: String,
}

#[derive(Debug, Deserialize)]
struct VerdictAlternative {
    agent: String,
    confidence: f32,
}

/// Parse the model's verdict, tolerating a markdown code fence around it.
fn parse_verdict(content: &str) -> Result<Verdict> {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str(body.trim())
        .map_err(|e| Error::Classification(format!("unparseable verdict: {e}")))
}
