//! Citations - extraction and normalization of source references
//!
//! Pure functions that turn raw search-provider hits into normalized
//! [`Citation`] records: title cleanup, source-type detection, publisher
//! derivation, URL-keyed deduplication, ordering, and display/inline
//! formatting. Everything here is deterministic and does no I/O.

use crate::search::SearchHit;
use serde::{Deserialize, Serialize};
use url::Url;

/// Source type of a citation, derived from URL and domain heuristics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationKind {
    /// Scholarly source (scholar/arxiv/.edu/doi.org domains)
    Academic,
    /// News outlet or `/news/` path
    News,
    /// `/blog/` path
    Blog,
    /// Anything else
    Webpage,
}

impl CitationKind {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Academic => "academic",
            Self::News => "news",
            Self::Blog => "blog",
            Self::Webpage => "webpage",
        }
    }

    /// Fixed display order: academic < news < blog < webpage
    #[must_use]
    pub fn display_order(&self) -> u8 {
        match self {
            Self::Academic => 0,
            Self::News => 1,
            Self::Blog => 2,
            Self::Webpage => 3,
        }
    }
}

/// Ordering mode for [`sort_citations`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationOrder {
    /// Descending by relevance score; missing score sorts last
    Relevance,
    /// Descending by publication date; missing date sorts last
    Date,
    /// By source type: academic, news, blog, webpage
    Kind,
}

/// A normalized source reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    /// Rank-based id, stable within one extraction call (`cite_1`, ...)
    pub id: String,
    /// Cleaned title
    pub title: String,
    /// Original URL, preserved for display
    pub url: String,
    /// Derived source type
    pub kind: CitationKind,
    /// Publisher, explicit or derived from the domain
    pub publisher: Option<String>,
    /// Authors, merged across duplicate entries
    #[serde(default)]
    pub authors: Vec<String>,
    /// ISO-8601 publication date
    pub published_date: Option<String>,
    /// Provider relevance score
    pub score: Option<f64>,
    /// Snippet text from the originating hit
    #[serde(default)]
    pub snippet: String,
    /// Raw provider fields carried through from the hit
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extras: serde_json::Map<String, serde_json::Value>,
}

/// News domains recognized by the type heuristic
const NEWS_DOMAINS: &[&str] = &[
    "reuters.com",
    "apnews.com",
    "bbc.com",
    "bbc.co.uk",
    "nytimes.com",
    "washingtonpost.com",
    "theguardian.com",
    "wsj.com",
    "bloomberg.com",
    "cnn.com",
    "aljazeera.com",
    "npr.org",
];

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Convert raw search hits into normalized citations.
///
/// Ids are assigned by rank (`cite_1` for the first hit). Titles are
/// trimmed and a trailing `" - Publisher"` suffix is stripped. The source
/// type and publisher are derived from the URL when the hit carries no
/// explicit metadata.
#[must_use]
pub fn extract_citations(hits: &[SearchHit]) -> Vec<Citation> {
    hits.iter()
        .enumerate()
        .map(|(i, hit)| Citation {
            id: format!("cite_{}", i + 1),
            title: clean_title(&hit.title),
            url: hit.url.clone(),
            kind: detect_kind(&hit.url),
            publisher: hit
                .publisher
                .clone()
                .filter(|p| !p.is_empty())
                .or_else(|| derive_publisher(&hit.url)),
            authors: hit.authors.clone(),
            published_date: hit.published_date.clone().filter(|d| !d.is_empty()),
            score: hit.score,
            snippet: hit.snippet.clone(),
            extras: hit.extras.clone(),
        })
        .collect()
}

/// Trim a title and strip a trailing `" - Publisher"` suffix.
fn clean_title(title: &str) -> String {
    let trimmed = title.trim();
    if let Some(pos) = trimmed.rfind(" - ") {
        let head = trimmed[..pos].trim_end();
        if !head.is_empty() {
            return head.to_string();
        }
    }
    trimmed.to_string()
}

/// Derive the source type from URL and domain heuristics.
fn detect_kind(raw_url: &str) -> CitationKind {
    let Ok(url) = Url::parse(raw_url) else {
        return CitationKind::Webpage;
    };
    let host = url.host_str().unwrap_or("").to_lowercase();
    let path = url.path().to_lowercase();

    if host.contains("scholar")
        || host.contains("arxiv")
        || host.contains(".edu")
        || host.contains("doi.org")
    {
        return CitationKind::Academic;
    }

    let is_news_domain = NEWS_DOMAINS
        .iter()
        .any(|d| host == *d || host.ends_with(&format!(".{d}")));
    if is_news_domain || path.contains("/news/") {
        return CitationKind::News;
    }

    if path.contains("/blog/") {
        return CitationKind::Blog;
    }

    CitationKind::Webpage
}

/// Derive a publisher name from the URL's domain.
fn derive_publisher(raw_url: &str) -> Option<String> {
    let url = Url::parse(raw_url).ok()?;
    let host = url.host_str()?.trim_start_matches("www.");
    let labels: Vec<&str> = host.split('.').collect();
    // second-to-last label is the registrable name for common suffixes
    let name = if labels.len() >= 2 {
        labels[labels.len() - 2]
    } else {
        *labels.first()?
    };
    if name.is_empty() {
        return None;
    }
    let mut chars = name.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

// ---------------------------------------------------------------------------
// Deduplication
// ---------------------------------------------------------------------------

/// Trailing-slash-insensitive URL form used as the dedup key.
fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Deduplicate citations by normalized URL.
///
/// First-seen order of distinct URLs is preserved. Merging keeps the
/// first record's id and display URL; authors become the union preserving
/// order of first appearance; title, publisher, and published date take
/// the most-recently-supplied non-empty value; the higher score wins.
/// Idempotent.
#[must_use]
pub fn dedupe_citations(citations: Vec<Citation>) -> Vec<Citation> {
    let mut out: Vec<Citation> = Vec::with_capacity(citations.len());
    let mut index_by_url: std::collections::HashMap<String, usize> =
        std::collections::HashMap::new();

    for citation in citations {
        let key = normalize_url(&citation.url);
        match index_by_url.get(&key) {
            Some(&i) => merge_into(&mut out[i], citation),
            None => {
                index_by_url.insert(key, out.len());
                out.push(citation);
            }
        }
    }

    out
}

/// Merge `incoming` into an already-kept citation with the same URL key.
fn merge_into(kept: &mut Citation, incoming: Citation) {
    if !incoming.title.is_empty() {
        kept.title = incoming.title;
    }
    if incoming.publisher.as_deref().is_some_and(|p| !p.is_empty()) {
        kept.publisher = incoming.publisher;
    }
    if incoming
        .published_date
        .as_deref()
        .is_some_and(|d| !d.is_empty())
    {
        kept.published_date = incoming.published_date;
    }
    for author in incoming.authors {
        if !kept.authors.contains(&author) {
            kept.authors.push(author);
        }
    }
    kept.score = match (kept.score, incoming.score) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    };
    if kept.snippet.is_empty() {
        kept.snippet = incoming.snippet;
    }
    for (k, v) in incoming.extras {
        kept.extras.entry(k).or_insert(v);
    }
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Sort citations in place by the given mode. The sort is stable.
pub fn sort_citations(citations: &mut [Citation], order: CitationOrder) {
    match order {
        CitationOrder::Relevance => {
            citations.sort_by(|a, b| match (a.score, b.score) {
                (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
        }
        CitationOrder::Date => {
            // ISO-8601 strings compare correctly as text
            citations.sort_by(|a, b| match (&a.published_date, &b.published_date) {
                (Some(x), Some(y)) => y.cmp(x),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
        }
        CitationOrder::Kind => {
            citations.sort_by_key(|c| c.kind.display_order());
        }
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Build a human-readable "Sources:" block.
///
/// One line per citation: `[rank] Title — URL (authors, date)`, omitting
/// empty optional fields. Returns an empty string for an empty list.
#[must_use]
pub fn format_citations(citations: &[Citation]) -> String {
    if citations.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(citations.len() + 1);
    lines.push("Sources:".to_string());

    for (i, citation) in citations.iter().enumerate() {
        let mut line = format!("[{}] {} — {}", i + 1, citation.title, citation.url);

        let mut annotations = Vec::new();
        if !citation.authors.is_empty() {
            annotations.push(citation.authors.join(", "));
        }
        if let Some(date) = citation.published_date.as_deref().filter(|d| !d.is_empty()) {
            annotations.push(date.to_string());
        }
        if !annotations.is_empty() {
            line.push_str(&format!(" ({})", annotations.join(", ")));
        }

        lines.push(line);
    }

    lines.join("\n")
}

/// Inline reference marker for a 1-based rank.
#[must_use]
pub fn inline_marker(rank: usize) -> String {
    format!("[{rank}]")
}

/// Insert inline citation markers into generated content.
///
/// For each citation whose snippet appears verbatim in `content`, the
/// marker for its rank is appended directly after the first matching
/// span. Content with no matching snippet is returned unchanged.
#[must_use]
pub fn insert_citation_markers(content: &str, citations: &[Citation]) -> String {
    let mut result = content.to_string();

    for (i, citation) in citations.iter().enumerate() {
        let snippet = citation.snippet.trim();
        if snippet.is_empty() {
            continue;
        }
        if let Some(pos) = result.find(snippet) {
            let insert_at = pos + snippet.len();
            result.insert_str(insert_at, &inline_marker(i + 1));
        }
    }

    result
}
