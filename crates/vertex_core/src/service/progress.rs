//! Per-topic status tracking.
//!
//! # Invariants
//! - Only `Learning` and `Mastered` are stored; clearing or setting
//!   `Pending` removes the entry.
//! - Ids are not validated against the syllabus; stale ids are kept and
//!   ignored by consumers.

use crate::model::topic::{TopicId, TopicStatus};
use crate::syllabus::Syllabus;
use std::collections::BTreeMap;

/// Topic id -> non-pending status.
pub type ProgressMap = BTreeMap<TopicId, TopicStatus>;

/// Aggregate counters for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressStats {
    pub total: usize,
    pub mastered: usize,
    pub learning: usize,
    pub pending: usize,
}

impl ProgressStats {
    /// Mastered share in whole percent, rounded down.
    pub fn percent_mastered(&self) -> usize {
        if self.total == 0 {
            return 0;
        }
        self.mastered * 100 / self.total
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressTracker {
    statuses: ProgressMap,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a tracker from a persisted map, dropping `Pending` entries.
    pub fn from_map(map: ProgressMap) -> Self {
        let statuses = map
            .into_iter()
            .filter(|(_, status)| *status != TopicStatus::Pending)
            .collect();
        Self { statuses }
    }

    pub fn as_map(&self) -> &ProgressMap {
        &self.statuses
    }

    /// Records `status`; `None` or `Pending` resets the topic.
    pub fn set_status(&mut self, id: &str, status: Option<TopicStatus>) {
        match status {
            None | Some(TopicStatus::Pending) => {
                self.statuses.remove(id);
            }
            Some(status) => {
                self.statuses.insert(id.to_string(), status);
            }
        }
    }

    pub fn status(&self, id: &str) -> TopicStatus {
        self.statuses.get(id).copied().unwrap_or_default()
    }

    pub fn reset_all(&mut self) {
        self.statuses.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// Counts statuses against the full topic list.
    ///
    /// Statuses stored for ids missing from `syllabus` are not counted.
    pub fn stats(&self, syllabus: &Syllabus) -> ProgressStats {
        let mut stats = ProgressStats {
            total: syllabus.len(),
            ..ProgressStats::default()
        };
        for (id, status) in &self.statuses {
            if !syllabus.contains(id) {
                continue;
            }
            match status {
                TopicStatus::Mastered => stats.mastered += 1,
                TopicStatus::Learning => stats.learning += 1,
                TopicStatus::Pending => {}
            }
        }
        stats.pending = stats
            .total
            .saturating_sub(stats.mastered + stats.learning);
        stats
    }
}
