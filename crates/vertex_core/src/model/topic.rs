//! Syllabus topic model.
//!
//! # Invariants
//! - `id` is unique across one syllabus tree.
//! - Topics are immutable after the syllabus is loaded.

use serde::{Deserialize, Serialize};

/// Stable topic identifier as it appears in the syllabus document.
pub type TopicId = String;

/// One learnable unit in the syllabus tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicNode {
    pub id: TopicId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// One-line summary some roadmaps carry next to the long description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brief_description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TopicNode>,
}

impl TopicNode {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            brief_description: None,
            children: Vec::new(),
        }
    }

    /// Builder-style helper used by fixtures and importers.
    pub fn with_children(mut self, children: Vec<TopicNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Per-topic learning state.
///
/// Serialized with the capitalized spelling stored in the progress map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TopicStatus {
    /// Not started. Never stored; absence from the progress map means pending.
    #[default]
    Pending,
    Learning,
    Mastered,
}

impl TopicStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Learning => "Learning",
            Self::Mastered => "Mastered",
        }
    }

    /// Parses a status name, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "learning" => Some(Self::Learning),
            "mastered" => Some(Self::Mastered),
            _ => None,
        }
    }
}
