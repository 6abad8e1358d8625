//! Persisted preference records.
//!
//! # Responsibility
//! - Define theme, tree-expansion, start-up and reminder preferences.
//! - Fix the lowercase spellings stored on device and accepted from users.
//!
//! # Invariants
//! - Every enum round-trips through `as_str`/`parse` and through serde with
//!   the same spelling.

use serde::{Deserialize, Serialize};

macro_rules! preference_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// All variants in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stable stored spelling.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            /// Parses the stored spelling, case-insensitively.
            pub fn parse(value: &str) -> Option<Self> {
                let normalized = value.trim().to_ascii_lowercase();
                match normalized.as_str() {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

preference_enum! {
    /// User-selected theme mode.
    ThemeMode {
        /// Follow `AutoType` rules.
        Auto => "auto",
        Light => "light",
        Dark => "dark",
        Obsidian => "obsidian",
        Sunrise => "sunrise",
    }
}

preference_enum! {
    /// How `ThemeMode::Auto` picks a theme.
    AutoType {
        /// Follow the OS color-scheme preference.
        Device => "device",
        /// Follow local time of day.
        Daylight => "daylight",
    }
}

preference_enum! {
    /// Theme actually applied after evaluating mode/time/device rules.
    EffectiveTheme {
        Light => "light",
        Dark => "dark",
        Obsidian => "obsidian",
        Sunrise => "sunrise",
    }
}

preference_enum! {
    /// Dark-scheme variant used when device sync reports a dark OS theme.
    DeviceDarkTheme {
        Dark => "dark",
        Obsidian => "obsidian",
    }
}

preference_enum! {
    /// Light-scheme variant used when device sync reports a light OS theme.
    DeviceLightTheme {
        Light => "light",
        Sunrise => "sunrise",
    }
}

preference_enum! {
    /// Tree expansion policy.
    ExpansionMode {
        /// Keep the expanded set across sessions.
        Persist => "persist",
        /// Keep it during a session, start collapsed next time.
        Reset => "reset",
        /// Opening a topic closes its siblings; restored across sessions.
        Accordion => "accordion",
    }
}

preference_enum! {
    /// View the app opens on.
    StartUpMode {
        Dashboard => "dashboard",
        /// Whatever view was open last.
        Last => "last",
    }
}

preference_enum! {
    /// Top-level screen, remembered for `StartUpMode::Last`.
    AppView {
        Dashboard => "dashboard",
        Syllabus => "syllabus",
    }
}

preference_enum! {
    /// Study reminder cadence.
    ReminderFrequency {
        Hourly => "hourly",
        Daily => "daily",
        Weekly => "weekly",
    }
}

impl ThemeMode {
    /// Fixed theme for explicit modes, `None` for `Auto`.
    pub fn fixed_theme(self) -> Option<EffectiveTheme> {
        match self {
            Self::Auto => None,
            Self::Light => Some(EffectiveTheme::Light),
            Self::Dark => Some(EffectiveTheme::Dark),
            Self::Obsidian => Some(EffectiveTheme::Obsidian),
            Self::Sunrise => Some(EffectiveTheme::Sunrise),
        }
    }
}

impl From<DeviceDarkTheme> for EffectiveTheme {
    fn from(value: DeviceDarkTheme) -> Self {
        match value {
            DeviceDarkTheme::Dark => Self::Dark,
            DeviceDarkTheme::Obsidian => Self::Obsidian,
        }
    }
}

impl From<DeviceLightTheme> for EffectiveTheme {
    fn from(value: DeviceLightTheme) -> Self {
        match value {
            DeviceLightTheme::Light => Self::Light,
            DeviceLightTheme::Sunrise => Self::Sunrise,
        }
    }
}

impl ReminderFrequency {
    /// Minimum gap between two reminders, in milliseconds.
    pub fn threshold_ms(self) -> i64 {
        const HOUR_MS: i64 = 60 * 60 * 1000;
        match self {
            Self::Hourly => HOUR_MS,
            Self::Daily => 24 * HOUR_MS,
            Self::Weekly => 7 * 24 * HOUR_MS,
        }
    }
}

/// Theme preferences as stored under their individual keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeSettings {
    pub mode: ThemeMode,
    pub auto_type: AutoType,
    pub device_dark: DeviceDarkTheme,
    pub device_light: DeviceLightTheme,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            mode: ThemeMode::Auto,
            auto_type: AutoType::Device,
            device_dark: DeviceDarkTheme::Dark,
            device_light: DeviceLightTheme::Light,
        }
    }
}

/// Study reminder preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub enabled: bool,
    pub frequency: ReminderFrequency,
    /// Unix epoch milliseconds of the last delivered reminder.
    pub last_notified: Option<i64>,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            frequency: ReminderFrequency::Daily,
            last_notified: None,
        }
    }
}
