//! Stable storage key names.
//!
//! These strings are part of the on-device data format; renaming one
//! orphans whatever users already stored under it.

pub const PROGRESS: &str = "progress";
pub const THEME_MODE: &str = "themeMode";
pub const AUTO_TYPE: &str = "autoType";
pub const DEVICE_DARK: &str = "deviceDark";
pub const DEVICE_LIGHT: &str = "deviceLight";
pub const SEARCH_HISTORY: &str = "searchHistory";
pub const EXPANDED_TOPICS: &str = "expandedTopics";
pub const EXPANSION_MODE: &str = "expansionMode";
pub const START_UP_MODE: &str = "startUpMode";
pub const LAST_VIEW: &str = "lastView";
pub const NOTIFICATION_SETTINGS: &str = "notificationSettings";
pub const SCROLL_POSITION: &str = "syllabusScrollY";

/// Single-value theme key written by early releases (`"light"`/`"dark"`).
pub const LEGACY_THEME: &str = "theme";
