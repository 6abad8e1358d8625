//! Case-insensitive topic filtering for the search box.
//!
//! # Invariants
//! - Blank queries match nothing (the caller shows the full tree instead).
//! - At most `MAX_DISPLAYED_RESULTS` hits are returned; `total` still
//!   reports the full match count.

use super::{FlatTopic, Syllabus};
use once_cell::sync::Lazy;
use regex::Regex;

/// Upper bound on hits rendered for one query.
pub const MAX_DISPLAYED_RESULTS: usize = 50;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Trims a query and collapses internal whitespace runs to one space.
pub fn normalize_query(raw: &str) -> String {
    WHITESPACE_RE.replace_all(raw.trim(), " ").into_owned()
}

/// Filtered search hits for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMatches<'a> {
    pub query: String,
    /// Number of matching topics before truncation.
    pub total: usize,
    pub hits: Vec<&'a FlatTopic>,
}

impl TopicMatches<'_> {
    pub fn is_truncated(&self) -> bool {
        self.total > self.hits.len()
    }
}

/// Matches `query` against title, description and brief description.
///
/// Returns `None` for blank queries.
pub fn filter_topics<'a>(syllabus: &'a Syllabus, query: &str) -> Option<TopicMatches<'a>> {
    let query = normalize_query(query);
    if query.is_empty() {
        return None;
    }
    let needle = query.to_lowercase();

    let mut total = 0;
    let mut hits = Vec::new();
    for topic in syllabus.topics().iter().filter(|t| topic_matches(t, &needle)) {
        total += 1;
        if hits.len() < MAX_DISPLAYED_RESULTS {
            hits.push(topic);
        }
    }

    Some(TopicMatches { query, total, hits })
}

fn topic_matches(topic: &FlatTopic, needle: &str) -> bool {
    let contains = |text: &str| text.to_lowercase().contains(needle);
    contains(&topic.title)
        || topic.description.as_deref().is_some_and(contains)
        || topic.brief_description.as_deref().is_some_and(contains)
}
