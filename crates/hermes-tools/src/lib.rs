//! hermes-tools - Tool registry and citation normalization
//!
//! This crate provides the auxiliary capabilities the Hermes agent core
//! composes at dispatch time:
//!
//! - the [`Tool`] trait and kind-keyed [`ToolRegistry`]
//! - the built-in web search tool over a JSON search-provider endpoint
//! - the citations module: extraction, deduplication, ordering, and
//!   display/inline formatting of source references

#![warn(missing_docs)]

/// Built-in tools
pub mod builtins;
/// Citation extraction and normalization
pub mod citations;
/// Error types
pub mod error;
/// Tool trait and registry
pub mod registry;
/// Raw search result records
pub mod search;

pub use builtins::web_search::{WebSearchConfig, WebSearchTool, WEB_SEARCH_KIND};
pub use citations::{
    dedupe_citations, extract_citations, format_citations, inline_marker,
    insert_citation_markers, sort_citations, Citation, CitationKind, CitationOrder,
};
pub use error::{Error, Result};
pub use registry::{Tool, ToolDescriptor, ToolOutcome, ToolRegistry};
pub use search::SearchHit;
