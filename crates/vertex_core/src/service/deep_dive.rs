//! Deep Dive: hand-off of a topic or history query to a web search.
//!
//! The search page is shown embedded when the surface allows it; embedding
//! is often blocked, so callers must always offer the plain URL as an
//! "open externally" fallback.

use crate::syllabus::search::normalize_query;

const SEARCH_ENDPOINT: &str = "https://www.google.com/search";

/// Builds the embedded-search URL for `query`, or `None` when blank.
pub fn deep_dive_url(query: &str) -> Option<String> {
    let query = normalize_query(query);
    if query.is_empty() {
        return None;
    }
    // igu=1 asks the engine for its frame-friendly variant.
    Some(format!(
        "{SEARCH_ENDPOINT}?igu=1&q={}",
        urlencoding::encode(&query)
    ))
}
