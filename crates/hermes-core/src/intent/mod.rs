//! Intent analysis - routing a query to the best-suited agent
//!
//! Two classifiers feed the [`IntentService`]: an AI classifier that asks a
//! chat model for a structured verdict, and a pattern-based heuristic that
//! is always available. The service arbitrates between them, caches
//! results, and records metrics.

use crate::agent::AgentType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// AI-based structured classification
pub mod ai;
/// Pattern/keyword classification
pub mod heuristic;
/// Orchestration, caching, metrics
pub mod service;

pub use ai::AiClassifier;
pub use heuristic::HeuristicClassifier;
pub use service::{IntentMetricsSnapshot, IntentService, IntentServiceConfig};

/// Which path produced an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMethod {
    /// AI classifier adopted directly
    Ai,
    /// Heuristic classifier only
    Heuristic,
    /// AI and heuristic results blended
    Hybrid,
}

impl AnalysisMethod {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Heuristic => "heuristic",
            Self::Hybrid => "hybrid",
        }
    }
}

/// Per-request input to intent analysis. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentContext {
    /// The user query to classify
    pub query: String,
    /// Prior conversation turns, most recent last
    #[serde(default)]
    pub history: Vec<String>,
    /// BCP-47 locale tag
    pub locale: String,
    /// Agents the user prefers
    #[serde(default)]
    pub preferred_agents: Vec<AgentType>,
    /// Agents the user has disabled
    #[serde(default)]
    pub disabled_agents: Vec<AgentType>,
    /// Request timestamp
    pub timestamp: DateTime<Utc>,
    /// Session identifier, when known
    #[serde(default)]
    pub session_id: Option<String>,
}

impl IntentContext {
    /// Create a context for a query with defaults
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            history: Vec::new(),
            locale: "en-US".to_string(),
            preferred_agents: Vec::new(),
            disabled_agents: Vec::new(),
            timestamp: Utc::now(),
            session_id: None,
        }
    }

    /// Set the conversation history (most recent last)
    #[must_use]
    pub fn with_history(mut self, history: Vec<String>) -> Self {
        self.history = history;
        self
    }

    /// Set the locale
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Set preferred agents
    #[must_use]
    pub fn with_preferred_agents(mut self, agents: Vec<AgentType>) -> Self {
        self.preferred_agents = agents;
        self
    }

    /// Set disabled agents
    #[must_use]
    pub fn with_disabled_agents(mut self, agents: Vec<AgentType>) -> Self {
        self.disabled_agents = agents;
        self
    }

    /// Set the session id
    #[must_use]
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Result of intent analysis. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentAnalysis {
    /// The agent recommended to handle the query
    pub recommended: AgentType,
    /// Confidence in the recommendation, in [0, 1]
    pub confidence: f32,
    /// Runner-up candidates, descending by confidence, never containing
    /// the recommended agent
    pub alternatives: Vec<(AgentType, f32)>,
    /// Extracted slot values (reformulated query, target language, ...)
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
    /// Human-readable explanation
    pub reasoning: String,
    /// Which path produced this analysis
    pub method: AnalysisMethod,
    /// Wall-clock time spent producing it, in milliseconds
    pub processing_time_ms: u64,
    /// Locale the analysis was made for
    pub locale: String,
}

impl IntentAnalysis {
    /// Create an analysis, normalizing the alternatives list: the
    /// recommended agent is removed, confidences are clamped to [0, 1],
    /// and entries are sorted descending.
    #[must_use]
    pub fn new(
        recommended: AgentType,
        confidence: f32,
        mut alternatives: Vec<(AgentType, f32)>,
        method: AnalysisMethod,
        locale: impl Into<String>,
    ) -> Self {
        alternatives.retain(|(agent, _)| *agent != recommended);
        for (_, c) in &mut alternatives {
            *c = c.clamp(0.0, 1.0);
        }
        alternatives.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Self {
            recommended,
            confidence: confidence.clamp(0.0, 1.0),
            alternatives,
            parameters: serde_json::Map::new(),
            reasoning: String::new(),
            method,
            processing_time_ms: 0,
            locale: locale.into(),
        }
    }

    /// Set the extracted parameters
    #[must_use]
    pub fn with_parameters(mut self, parameters: serde_json::Map<String, serde_json::Value>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Set the reasoning text
    #[must_use]
    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternatives_exclude_recommended_and_sort() {
        let analysis = IntentAnalysis::new(
            AgentType::WebSearch,
            0.9,
            vec![
                (AgentType::StandardChat, 0.2),
                (AgentType::WebSearch, 0.9),
                (AgentType::UrlPull, 0.5),
            ],
            AnalysisMethod::Heuristic,
            "en-US",
        );
        assert!(analysis
            .alternatives
            .iter()
            .all(|(agent, _)| *agent != AgentType::WebSearch));
        assert_eq!(analysis.alternatives[0].0, AgentType::UrlPull);
        assert_eq!(analysis.alternatives[1].0, AgentType::StandardChat);
    }

    #[test]
    fn test_confidence_clamped() {
        let analysis = IntentAnalysis::new(
            AgentType::StandardChat,
            1.7,
            vec![(AgentType::WebSearch, -0.3)],
            AnalysisMethod::Ai,
            "en-US",
        );
        assert_eq!(analysis.confidence, 1.0);
        assert_eq!(analysis.alternatives[0].1, 0.0);
    }

    #[test]
    fn test_context_builder() {
        let ctx = IntentContext::new("hello")
            .with_locale("ko-KR")
            .with_history(vec!["hi".to_string()])
            .with_session_id("s-1");
        assert_eq!(ctx.locale, "ko-KR");
        assert_eq!(ctx.history.len(), 1);
        assert_eq!(ctx.session_id.as_deref(), Some("s-1"));
    }
}
