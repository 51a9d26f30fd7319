//! Raw search-provider result records
//!
//! A [`SearchHit`] is the untyped-provider-agnostic shape a search tool
//! returns and the citation extractor consumes.

use serde::{Deserialize, Serialize};

/// A single raw result from a search provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchHit {
    /// Result title, as supplied by the provider
    pub title: String,
    /// Result URL
    pub url: String,
    /// Snippet text shown with the result
    #[serde(default)]
    pub snippet: String,
    /// Provider relevance score, higher is better
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Publisher name, when the provider supplies one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    /// Authors, when the provider supplies them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    /// ISO-8601 publication date, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    /// Raw provider fields carried through untouched
    #[serde(default, flatten)]
    pub extras: serde_json::Map<String, serde_json::Value>,
}

impl SearchHit {
    /// Create a hit with the required fields
    #[must_use]
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the snippet
    #[must_use]
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }

    /// Set the relevance score
    #[must_use]
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Set the publisher
    #[must_use]
    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    /// Add an author
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }

    /// Set the publication date
    #[must_use]
    pub fn with_published_date(mut self, date: impl Into<String>) -> Self {
        self.published_date = Some(date.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let hit = SearchHit::new("Title", "https://example.com")
            .with_snippet("snippet text")
            .with_score(0.9)
            .with_author("A. Author")
            .with_published_date("2026-01-15");

        assert_eq!(hit.title, "Title");
        assert_eq!(hit.score, Some(0.9));
        assert_eq!(hit.authors.len(), 1);
    }

    #[test]
    fn test_deserialize_minimal() {
        let hit: SearchHit =
            serde_json::from_str(r#"{"title":"T","url":"https://a.com"}"#).unwrap();
        assert_eq!(hit.title, "T");
        assert!(hit.score.is_none());
        assert!(hit.authors.is_empty());
    }

    #[test]
    fn test_extras_passthrough() {
        let hit: SearchHit = serde_json::from_str(
            r#"{"title":"T","url":"https://a.com","crawl_depth":3}"#,
        )
        .unwrap();
        assert_eq!(hit.extras["crawl_depth"], serde_json::json!(3));
    }
}
