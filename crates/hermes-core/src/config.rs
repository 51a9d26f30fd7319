//! Agent configuration builder
//!
//! Assembles a per-request [`AgentConfig`] by merging a static per-type
//! default table with caller-supplied overrides. Overrides are strongly
//! typed: each agent type has its own [`AgentParams`] variant and merge
//! function, and an unknown or ill-typed key is a configuration error
//! that reports every offending field at once.

use crate::agent::{AgentType, ExecutionEnvironment};
use crate::error::{Error, FieldIssue, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default model id used when a type-specific table has no entry
const DEFAULT_MODEL_ID: &str = "gpt-4o-mini";

/// Type-specific agent parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentParams {
    /// Web search parameters
    WebSearch {
        /// Maximum number of search results to request
        max_results: u64,
        /// Restrict results to the last N days
        freshness_days: Option<u64>,
        /// Locale override for the search provider
        locale_override: Option<String>,
    },
    /// URL pull parameters
    UrlPull {
        /// Maximum number of URLs fetched from one query
        max_urls: u64,
        /// Whether to render JavaScript before extraction
        render_js: bool,
    },
    /// Code interpreter parameters
    CodeInterpreter {
        /// Language the sandbox runs
        language: String,
        /// Sandbox memory ceiling
        memory_limit_mb: u64,
    },
    /// Local knowledge retrieval parameters
    LocalKnowledge {
        /// Knowledge index name
        index: String,
        /// Number of chunks to retrieve
        top_k: u64,
        /// Minimum similarity score
        min_score: f64,
    },
    /// Translation parameters
    Translation {
        /// Source language, auto-detected when absent
        source_lang: Option<String>,
        /// Target language tag
        target_lang: String,
    },
    /// Managed foundry agent parameters
    Foundry {
        /// Foundry deployment name
        deployment: Option<String>,
    },
    /// Third-party agent parameters
    ThirdParty {
        /// Service endpoint
        endpoint: Option<String>,
        /// API version pin
        api_version: Option<String>,
    },
    /// Plain chat parameters
    StandardChat {
        /// Sampling temperature
        temperature: f64,
        /// Completion token budget
        max_tokens: u64,
    },
}

impl AgentParams {
    /// Static defaults for an agent type
    #[must_use]
    pub fn defaults(agent_type: AgentType) -> Self {
        match agent_type {
            AgentType::WebSearch => Self::WebSearch {
                max_results: 5,
                freshness_days: None,
                locale_override: None,
            },
            AgentType::UrlPull => Self::UrlPull {
                max_urls: 3,
                render_js: false,
            },
            AgentType::CodeInterpreter => Self::CodeInterpreter {
                language: "python".to_string(),
                memory_limit_mb: 512,
            },
            AgentType::LocalKnowledge => Self::LocalKnowledge {
                index: "default".to_string(),
                top_k: 8,
                min_score: 0.0,
            },
            AgentType::Translation => Self::Translation {
                source_lang: None,
                target_lang: "en".to_string(),
            },
            AgentType::Foundry => Self::Foundry { deployment: None },
            AgentType::ThirdParty => Self::ThirdParty {
                endpoint: None,
                api_version: None,
            },
            AgentType::StandardChat => Self::StandardChat {
                temperature: 0.7,
                max_tokens: 1024,
            },
        }
    }

    /// Merge overrides into the defaults for an agent type.
    ///
    /// Every unknown key and every type mismatch is collected; the caller
    /// receives either a fully valid value or the complete issue list.
    fn merge(agent_type: AgentType, overrides: &Map<String, Value>) -> (Self, Vec<FieldIssue>) {
        let mut params = Self::defaults(agent_type);
        let mut issues = Vec::new();

        for (key, value) in overrides {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            let applied = params.apply(key, value, &mut issues);
            if !applied {
                issues.push(FieldIssue::new(
                    key.clone(),
                    format!("unknown parameter for agent type {}", agent_type),
                ));
            }
        }

        (params, issues)
    }

    /// Apply one override key. Returns false when the key does not exist
    /// for this variant.
    fn apply(&mut self, key: &str, value: &Value, issues: &mut Vec<FieldIssue>) -> bool {
        match self {
            Self::WebSearch {
                max_results,
                freshness_days,
                locale_override,
            } => match key {
                "max_results" => set_u64(max_results, key, value, issues),
                "freshness_days" => set_opt_u64(freshness_days, key, value, issues),
                "locale_override" => set_opt_string(locale_override, key, value, issues),
                _ => return false,
            },
            Self::UrlPull { max_urls, render_js } => match key {
                "max_urls" => set_u64(max_urls, key, value, issues),
                "render_js" => set_bool(render_js, key, value, issues),
                _ => return false,
            },
            Self::CodeInterpreter {
                language,
                memory_limit_mb,
            } => match key {
                "language" => set_string(language, key, value, issues),
                "memory_limit_mb" => set_u64(memory_limit_mb, key, value, issues),
                _ => return false,
            },
            Self::LocalKnowledge {
                index,
                top_k,
                min_score,
            } => match key {
                "index" => set_string(index, key, value, issues),
                "top_k" => set_u64(top_k, key, value, issues),
                "min_score" => set_f64(min_score, key, value, issues),
                _ => return false,
            },
            Self::Translation {
                source_lang,
                target_lang,
            } => match key {
                "source_lang" => set_opt_string(source_lang, key, value, issues),
                "target_lang" => set_string(target_lang, key, value, issues),
                _ => return false,
            },
            Self::Foundry { deployment } => match key {
                "deployment" => set_opt_string(deployment, key, value, issues),
                _ => return false,
            },
            Self::ThirdParty {
                endpoint,
                api_version,
            } => match key {
                "endpoint" => set_opt_string(endpoint, key, value, issues),
                "api_version" => set_opt_string(api_version, key, value, issues),
                _ => return false,
            },
            Self::StandardChat {
                temperature,
                max_tokens,
            } => match key {
                "temperature" => set_f64(temperature, key, value, issues),
                "max_tokens" => set_u64(max_tokens, key, value, issues),
                _ => return false,
            },
        }
        true
    }
}

/// Keys handled at the config level rather than the params level
const RESERVED_KEYS: &[&str] = &["model_id", "instructions", "timeout_ms"];

fn set_u64(slot: &mut u64, key: &str, value: &Value, issues: &mut Vec<FieldIssue>) {
    match value.as_u64() {
        Some(v) => *slot = v,
        None => issues.push(FieldIssue::new(key, "expected a non-negative integer")),
    }
}

fn set_opt_u64(slot: &mut Option<u64>, key: &str, value: &Value, issues: &mut Vec<FieldIssue>) {
    if value.is_null() {
        *slot = None;
        return;
    }
    match value.as_u64() {
        Some(v) => *slot = Some(v),
        None => issues.push(FieldIssue::new(key, "expected a non-negative integer")),
    }
}

fn set_f64(slot: &mut f64, key: &str, value: &Value, issues: &mut Vec<FieldIssue>) {
    match value.as_f64() {
        Some(v) => *slot = v,
        None => issues.push(FieldIssue::new(key, "expected a number")),
    }
}

fn set_bool(slot: &mut bool, key: &str, value: &Value, issues: &mut Vec<FieldIssue>) {
    match value.as_bool() {
        Some(v) => *slot = v,
        None => issues.push(FieldIssue::new(key, "expected a boolean")),
    }
}

fn set_string(slot: &mut String, key: &str, value: &Value, issues: &mut Vec<FieldIssue>) {
    match value.as_str() {
        Some(v) => *slot = v.to_string(),
        None => issues.push(FieldIssue::new(key, "expected a string")),
    }
}

fn set_opt_string(slot: &mut Option<String>, key: &str, value: &Value, issues: &mut Vec<FieldIssue>) {
    if value.is_null() {
        *slot = None;
        return;
    }
    match value.as_str() {
        Some(v) => *slot = Some(v.to_string()),
        None => issues.push(FieldIssue::new(key, "expected a string")),
    }
}

/// Request identity carried into a built config
#[derive(Debug, Clone, Default)]
pub struct RequestMetadata {
    /// Correlation id of the originating request
    pub request_id: String,
    /// Authenticated user id, when known
    pub user_id: Option<String>,
}

impl RequestMetadata {
    /// Create metadata for a request id
    #[must_use]
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            user_id: None,
        }
    }

    /// Set the user id
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// Metadata embedded in a built config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Correlation id of the originating request
    pub request_id: String,
    /// Authenticated user id, when known
    pub user_id: Option<String>,
    /// When the config was built
    pub created_at: DateTime<Utc>,
}

/// Fully assembled per-execution agent configuration. Immutable after
/// construction; never shared across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Unique id for this execution
    pub id: String,
    /// Agent type this config drives
    pub agent_type: AgentType,
    /// Execution environment, fixed per agent type
    pub environment: ExecutionEnvironment,
    /// Model id the agent should use
    pub model_id: String,
    /// Instruction text for the agent
    pub instructions: String,
    /// Tool kinds the agent may call
    pub tools: Vec<String>,
    /// Hard execution deadline in milliseconds
    pub timeout_ms: u64,
    /// Type-specific parameters
    pub params: AgentParams,
    /// Request metadata
    pub metadata: ConfigMetadata,
}

/// Per-type defaults for the config-level fields
fn config_defaults(agent_type: AgentType) -> (&'static str, &'static [&'static str], u64) {
    match agent_type {
        AgentType::WebSearch => (
            "Search the web and answer with cited sources.",
            &["web_search"],
            30_000,
        ),
        AgentType::UrlPull => (
            "Fetch the referenced pages and answer from their content.",
            &["url_pull"],
            30_000,
        ),
        AgentType::CodeInterpreter => (
            "Write and run code to answer the question; show the result.",
            &[],
            60_000,
        ),
        AgentType::LocalKnowledge => (
            "Answer strictly from the user's indexed documents.",
            &["knowledge_lookup"],
            20_000,
        ),
        AgentType::Translation => ("Translate the text accurately.", &[], 15_000),
        AgentType::Foundry => ("Delegate to the configured foundry agent.", &[], 60_000),
        AgentType::ThirdParty => ("Delegate to the configured external agent.", &[], 30_000),
        AgentType::StandardChat => ("You are a helpful assistant.", &[], 30_000),
    }
}

/// Build a configuration for one execution.
///
/// Pure: defaults merged with overrides, no I/O. Fails only on invalid
/// override input, reporting every offending field.
///
/// # Errors
/// Returns `Error::Config` listing every invalid or unknown override key.
pub fn build_config(
    agent_type: AgentType,
    overrides: Option<&Map<String, Value>>,
    metadata: RequestMetadata,
) -> Result<AgentConfig> {
    let (instructions, tools, default_timeout) = config_defaults(agent_type);
    let empty = Map::new();
    let overrides = overrides.unwrap_or(&empty);

    let (params, mut issues) = AgentParams::merge(agent_type, overrides);

    let mut model_id = DEFAULT_MODEL_ID.to_string();
    if let Some(value) = overrides.get("model_id") {
        match value.as_str() {
            Some(v) if !v.is_empty() => model_id = v.to_string(),
            _ => issues.push(FieldIssue::new("model_id", "expected a non-empty string")),
        }
    }

    let mut instructions = instructions.to_string();
    if let Some(value) = overrides.get("instructions") {
        match value.as_str() {
            Some(v) => instructions = v.to_string(),
            None => issues.push(FieldIssue::new("instructions", "expected a string")),
        }
    }

    let mut timeout_ms = default_timeout;
    if let Some(value) = overrides.get("timeout_ms") {
        match value.as_u64() {
            Some(v) if v > 0 => timeout_ms = v,
            _ => issues.push(FieldIssue::new("timeout_ms", "expected a positive integer")),
        }
    }

    if !issues.is_empty() {
        return Err(Error::Config { issues });
    }

    let now = Utc::now();
    Ok(AgentConfig {
        id: unique_id(agent_type, now),
        agent_type,
        environment: agent_type.environment(),
        model_id,
        instructions,
        tools: tools.iter().map(|s| (*s).to_string()).collect(),
        timeout_ms,
        params,
        metadata: ConfigMetadata {
            request_id: metadata.request_id,
            user_id: metadata.user_id,
            created_at: now,
        },
    })
}

/// Time plus random suffix keeps ids unique across concurrent requests.
fn unique_id(agent_type: AgentType, now: DateTime<Utc>) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "agent_{}_{}_{}",
        agent_type.as_str(),
        now.timestamp_millis(),
        &suffix[..8]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(json: Value) -> Map<String, Value> {
        json.as_object().unwrap().clone()
    }

    #[test]
    fn test_defaults_when_no_overrides() {
        let config =
            build_config(AgentType::WebSearch, None, RequestMetadata::new("req-1")).unwrap();
        assert_eq!(config.agent_type, AgentType::WebSearch);
        assert_eq!(config.environment, ExecutionEnvironment::Foundry);
        assert_eq!(config.timeout_ms, 30_000);
        assert_eq!(config.tools, vec!["web_search"]);
        assert_eq!(
            config.params,
            AgentParams::WebSearch {
                max_results: 5,
                freshness_days: None,
                locale_override: None
            }
        );
    }

    #[test]
    fn test_override_wins_on_collision() {
        let map = overrides(serde_json::json!({
            "max_results": 9,
            "timeout_ms": 5000,
            "model_id": "gpt-4o"
        }));
        let config = build_config(
            AgentType::WebSearch,
            Some(&map),
            RequestMetadata::new("req-1"),
        )
        .unwrap();
        assert_eq!(config.timeout_ms, 5000);
        assert_eq!(config.model_id, "gpt-4o");
        assert!(matches!(
            config.params,
            AgentParams::WebSearch { max_results: 9, .. }
        ));
    }

    #[test]
    fn test_unknown_and_ill_typed_keys_all_reported() {
        let map = overrides(serde_json::json!({
            "max_results": "many",
            "bogus_key": 1,
            "timeout_ms": -5
        }));
        let err = build_config(
            AgentType::WebSearch,
            Some(&map),
            RequestMetadata::new("req-1"),
        )
        .unwrap_err();

        let Error::Config { issues } = err else {
            panic!("expected config error");
        };
        let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
        assert!(fields.contains(&"max_results"));
        assert!(fields.contains(&"bogus_key"));
        assert!(fields.contains(&"timeout_ms"));
        assert_eq!(issues.len(), 3);
    }

    #[test]
    fn test_environment_mapping_applied() {
        let config = build_config(
            AgentType::CodeInterpreter,
            None,
            RequestMetadata::new("req-1"),
        )
        .unwrap();
        assert_eq!(config.environment, ExecutionEnvironment::Code);

        let config =
            build_config(AgentType::LocalKnowledge, None, RequestMetadata::new("req-1")).unwrap();
        assert_eq!(config.environment, ExecutionEnvironment::Local);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = build_config(AgentType::StandardChat, None, RequestMetadata::new("r")).unwrap();
        let b = build_config(AgentType::StandardChat, None, RequestMetadata::new("r")).unwrap();
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("agent_standard_chat_"));
    }

    #[test]
    fn test_translation_params_merge() {
        let map = overrides(serde_json::json!({
            "target_lang": "ko",
            "source_lang": "en"
        }));
        let config = build_config(
            AgentType::Translation,
            Some(&map),
            RequestMetadata::new("req-1"),
        )
        .unwrap();
        assert_eq!(
            config.params,
            AgentParams::Translation {
                source_lang: Some("en".to_string()),
                target_lang: "ko".to_string(),
            }
        );
    }

    #[test]
    fn test_metadata_carried_through() {
        let config = build_config(
            AgentType::StandardChat,
            None,
            RequestMetadata::new("req-9").with_user_id("user-3"),
        )
        .unwrap();
        assert_eq!(config.metadata.request_id, "req-9");
        assert_eq!(config.metadata.user_id.as_deref(), Some("user-3"));
    }

    #[test]
    fn test_no_partial_application_on_error() {
        // a bad override alongside good ones must fail the whole build
        let map = overrides(serde_json::json!({
            "max_results": 7,
            "freshness_days": "soon"
        }));
        let result = build_config(
            AgentType::WebSearch,
            Some(&map),
            RequestMetadata::new("req-1"),
        );
        assert!(result.is_err());
    }
}
