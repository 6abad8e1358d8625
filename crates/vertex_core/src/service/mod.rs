//! State-manager building blocks, one per concern.
//!
//! # Responsibility
//! - Hold in-memory state and the rules that mutate it.
//! - Stay storage-agnostic; `state::AppState` owns persistence.

pub mod deep_dive;
pub mod expansion;
pub mod history;
pub mod progress;
pub mod reminder;
pub mod theme;
