//! Core domain logic for the VERTEX learning-progress tracker.
//! This crate is the single source of truth for progress, expansion,
//! theme, search-history and reminder rules.

pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod state;
pub mod store;
pub mod syllabus;
pub mod timing;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::history::SearchHistoryEntry;
pub use model::settings::{
    AppView, AutoType, DeviceDarkTheme, DeviceLightTheme, EffectiveTheme, ExpansionMode,
    NotificationSettings, ReminderFrequency, StartUpMode, ThemeMode, ThemeSettings,
};
pub use model::topic::{TopicId, TopicNode, TopicStatus};
pub use service::deep_dive::deep_dive_url;
pub use service::expansion::ExpansionController;
pub use service::history::{SearchHistory, MAX_HISTORY_ENTRIES};
pub use service::progress::{ProgressMap, ProgressStats, ProgressTracker};
pub use service::reminder::{
    NotificationPermission, Notifier, Reminder, ReminderOutcome, ThrottlePhase,
};
pub use service::theme::{resolve_theme, ThemeEnvironment};
pub use state::{AppState, ReminderReport};
pub use store::kv_store::{KeyValueStore, SqliteKvStore, StoreError, StoreResult};
pub use syllabus::search::{filter_topics, TopicMatches};
pub use syllabus::source::{load_syllabus, load_syllabus_with_retry, FileSource, LoadState};
pub use syllabus::{FlatTopic, Syllabus, SyllabusError};
pub use timing::clock::{Clock, ManualClock, SystemClock};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
