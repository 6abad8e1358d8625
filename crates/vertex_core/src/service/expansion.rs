//! Tree expansion state under a configurable policy.
//!
//! # Invariants
//! - The expanded set keeps insertion order and holds no duplicates.
//! - Only `toggle` applies policy side effects; `expand_many` never closes
//!   anything.
//! - Changing the policy does not reconcile the current set.

use crate::model::settings::ExpansionMode;
use crate::model::topic::TopicId;
use crate::syllabus::Syllabus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionController {
    mode: ExpansionMode,
    expanded: Vec<TopicId>,
}

impl Default for ExpansionController {
    fn default() -> Self {
        Self::new(ExpansionMode::Persist)
    }
}

impl ExpansionController {
    pub fn new(mode: ExpansionMode) -> Self {
        Self {
            mode,
            expanded: Vec::new(),
        }
    }

    /// Builds a controller for a new session from persisted state.
    ///
    /// `Reset` policy discards `saved`; other policies restore it.
    pub fn restore(mode: ExpansionMode, saved: Vec<TopicId>) -> Self {
        let mut controller = Self::new(mode);
        if mode != ExpansionMode::Reset {
            controller.expand_many(saved);
        }
        controller
    }

    pub fn mode(&self) -> ExpansionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ExpansionMode) {
        self.mode = mode;
    }

    pub fn expanded(&self) -> &[TopicId] {
        &self.expanded
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.iter().any(|candidate| candidate == id)
    }

    /// Opens or closes `id`. Returns whether it is expanded afterwards.
    ///
    /// Under `Accordion`, opening a topic closes all of its siblings.
    pub fn toggle(&mut self, id: &str, syllabus: &Syllabus) -> bool {
        if self.is_expanded(id) {
            self.expanded.retain(|candidate| candidate != id);
            return false;
        }

        self.expanded.push(id.to_string());
        if self.mode == ExpansionMode::Accordion {
            let siblings = syllabus.siblings_of(id);
            if !siblings.is_empty() {
                self.expanded
                    .retain(|candidate| !siblings.contains(&candidate.as_str()));
            }
        }
        true
    }

    /// Union-adds `ids` without policy side effects.
    pub fn expand_many<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<TopicId>,
    {
        for id in ids {
            let id = id.into();
            if !self.is_expanded(&id) {
                self.expanded.push(id);
            }
        }
    }
}
