//! Search history, newest first.
//!
//! # Invariants
//! - At most `MAX_HISTORY_ENTRIES` entries.
//! - Queries are unique; re-adding moves the query to the front with a
//!   fresh timestamp.

use crate::model::history::SearchHistoryEntry;
use crate::model::topic::TopicId;
use crate::syllabus::search::normalize_query;

pub const MAX_HISTORY_ENTRIES: usize = 50;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHistory {
    entries: Vec<SearchHistoryEntry>,
}

impl SearchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds history from persisted entries, re-applying dedup and cap.
    pub fn from_entries(entries: Vec<SearchHistoryEntry>) -> Self {
        let mut history = Self::new();
        for entry in entries.into_iter().rev() {
            history.push_front(entry);
        }
        history
    }

    pub fn entries(&self) -> &[SearchHistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records a query. Blank queries are ignored and return `false`.
    pub fn add(&mut self, query: &str, topic_id: Option<TopicId>, now_ms: i64) -> bool {
        let query = normalize_query(query);
        if query.is_empty() {
            return false;
        }
        self.push_front(SearchHistoryEntry {
            query,
            topic_id,
            timestamp: now_ms,
        });
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn push_front(&mut self, entry: SearchHistoryEntry) {
        self.entries.retain(|existing| existing.query != entry.query);
        self.entries.insert(0, entry);
        self.entries.truncate(MAX_HISTORY_ENTRIES);
    }
}
