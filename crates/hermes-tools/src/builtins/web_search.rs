//! Web search tool — JSON search-provider client
//!
//! Calls a configured search-provider endpoint that returns JSON results
//! (Bing-compatible gateways, Tavily, SearXNG instances). The LLM passes
//! only a `query` string; the tool builds the request itself so malformed
//! URLs never reach the provider.

use crate::error::{Error, Result};
use crate::registry::{Tool, ToolDescriptor, ToolOutcome};
use crate::search::SearchHit;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Registry kind for this tool
pub const WEB_SEARCH_KIND: &str = "web_search";

/// Maximum number of search results to return
const MAX_RESULTS_CAP: usize = 10;

/// Default number of results
const DEFAULT_MAX_RESULTS: usize = 5;

/// Default locale sent to the provider
const DEFAULT_LOCALE: &str = "en-US";

/// HTTP timeout for the search request
const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Configuration for the web search tool
#[derive(Debug, Clone)]
pub struct WebSearchConfig {
    /// Search-provider endpoint URL
    pub endpoint: String,
    /// API key sent as a bearer token, if the provider needs one
    pub api_key: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

impl WebSearchConfig {
    /// Create a configuration for the given endpoint
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            timeout: SEARCH_TIMEOUT,
        }
    }

    /// Set the API key
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Shape of the provider's JSON response body
#[derive(Debug, Deserialize)]
struct ProviderResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// JSON search-provider web search tool.
pub struct WebSearchTool {
    descriptor: ToolDescriptor,
    client: Client,
    config: WebSearchConfig,
}

impl WebSearchTool {
    /// Create a new web search tool.
    ///
    /// # Errors
    /// Returns `Error::Network` if the HTTP client cannot be built.
    pub fn new(config: WebSearchConfig) -> Result<Self> {
        let descriptor = ToolDescriptor::new(
            WEB_SEARCH_KIND,
            "Search the web. Returns titles, URLs, and snippets. Use this \
             tool for real-time information like weather, news, prices, and \
             any query that requires up-to-date web results.",
        )
        .with_parameters(serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query string"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of results to return (1-10, default 5)"
                },
                "locale": {
                    "type": "string",
                    "description": "BCP-47 locale tag (e.g. 'en-US', 'ko-KR')"
                }
            },
            "required": ["query"]
        }));

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            descriptor,
            client,
            config,
        })
    }

    /// Run a search and return typed hits.
    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
        locale: &str,
    ) -> Result<Vec<SearchHit>> {
        let url = format!(
            "{}?q={}&count={}&locale={}",
            self.config.endpoint,
            urlencoding::encode(query),
            max_results,
            urlencoding::encode(locale),
        );

        debug!(query = %query, locale = %locale, "Fetching search results");

        let mut request = self.client.get(&url);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout(self.config.timeout.as_millis() as u64)
            } else {
                Error::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Search provider returned an error");
            return Err(Error::Network(format!(
                "search provider returned HTTP {}",
                status
            )));
        }

        let body: ProviderResponse = response
            .json()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(body.results.into_iter().take(max_results).collect())
    }
}

#[async_trait::async_trait]
impl Tool for WebSearchTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolOutcome> {
        let start = Instant::now();

        let query = input
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::InvalidInput("missing 'query' parameter".to_string()))?;

        if query.trim().is_empty() {
            return Err(Error::InvalidInput("query must not be empty".to_string()));
        }

        let max_results = input
            .get("max_results")
            .and_then(|v| v.as_u64())
            .map(|n| (n as usize).clamp(1, MAX_RESULTS_CAP))
            .unwrap_or(DEFAULT_MAX_RESULTS);

        let locale = input
            .get("locale")
            .and_then(|v| v.as_str())
            .unwrap_or(DEFAULT_LOCALE);

        let results = self.search(query, max_results, locale).await?;
        let duration = start.elapsed().as_millis() as u64;

        Ok(ToolOutcome::success(
            serde_json::json!({
                "query": query,
                "results": results,
                "total": results.len(),
            }),
            duration,
        ))
    }
}
