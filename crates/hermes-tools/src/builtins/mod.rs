//! Built-in tool implementations

/// Web search against a JSON search-provider endpoint
pub mod web_search;

pub use web_search::{WebSearchConfig, WebSearchTool};
