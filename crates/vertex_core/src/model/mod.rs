//! Domain model types.
//!
//! # Responsibility
//! - Define the syllabus topic shape and per-topic learning status.
//! - Define persisted preference records and their on-disk spellings.
//!
//! # See also
//! - `store::keys` for where each record lives.

pub mod history;
pub mod settings;
pub mod topic;
