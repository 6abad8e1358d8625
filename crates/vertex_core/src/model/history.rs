//! Search history record.

use crate::model::topic::TopicId;
use serde::{Deserialize, Serialize};

/// One remembered search, optionally pointing at the topic it led to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryEntry {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<TopicId>,
    /// Unix epoch milliseconds.
    pub timestamp: i64,
}
