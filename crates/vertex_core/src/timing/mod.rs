//! Time sources and single-task scheduling helpers.
//!
//! # Responsibility
//! - Abstract wall-clock access so time-based rules are testable.
//! - Provide "latest value wins" debouncing and the periodic tick schedule
//!   for the UI event loop.

pub mod clock;
pub mod debounce;
pub mod ticker;
