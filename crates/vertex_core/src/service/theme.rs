//! Effective theme resolution.
//!
//! # Responsibility
//! - Map theme preferences, local hour and the OS color-scheme signal to
//!   exactly one `EffectiveTheme`.
//! - Report the next daylight boundary for callers that schedule precisely.
//!
//! # Invariants
//! - Explicit modes always win over auto rules.
//! - Daylight windows: [6,9) sunrise, [9,16) light, [16,21) obsidian,
//!   otherwise dark.
//!
//! The periodic ticker re-evaluates the theme every
//! `THEME_POLL_INTERVAL`; a boundary crossing is therefore applied at most
//! one interval late. Polling is kept for simplicity; `next_daylight_boundary`
//! exists for callers that want to sleep until the exact transition.

use crate::model::settings::{AutoType, EffectiveTheme, ThemeSettings};
use chrono::{DateTime, Duration as ChronoDuration, Local, TimeZone, Timelike};
use std::time::Duration;

/// How often the theme is re-evaluated while the app stays open.
pub const THEME_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Hours at which the daylight theme changes, ascending.
const DAYLIGHT_BOUNDARIES: [u32; 4] = [6, 9, 16, 21];

/// Inputs that come from the environment rather than stored preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeEnvironment {
    /// Local hour of day, 0..=23.
    pub hour: u32,
    /// OS reports a dark color scheme.
    pub prefers_dark: bool,
}

/// Theme for a local hour under the daylight schedule.
pub fn daylight_theme(hour: u32) -> EffectiveTheme {
    match hour {
        6..=8 => EffectiveTheme::Sunrise,
        9..=15 => EffectiveTheme::Light,
        16..=20 => EffectiveTheme::Obsidian,
        _ => EffectiveTheme::Dark,
    }
}

pub fn resolve_theme(settings: &ThemeSettings, env: ThemeEnvironment) -> EffectiveTheme {
    if let Some(fixed) = settings.mode.fixed_theme() {
        return fixed;
    }
    match settings.auto_type {
        AutoType::Daylight => daylight_theme(env.hour),
        AutoType::Device if env.prefers_dark => settings.device_dark.into(),
        AutoType::Device => settings.device_light.into(),
    }
}

/// First instant after `now` at which `daylight_theme` changes.
///
/// Falls back to one poll interval ahead when the boundary falls into a
/// local-time gap (DST transitions).
pub fn next_daylight_boundary(now: DateTime<Local>) -> DateTime<Local> {
    let fallback = now + ChronoDuration::seconds(THEME_POLL_INTERVAL.as_secs() as i64);
    let today = now.date_naive();

    let next = DAYLIGHT_BOUNDARIES
        .iter()
        .find(|hour| **hour > now.hour())
        .map(|hour| (today, *hour))
        .or_else(|| today.succ_opt().map(|tomorrow| (tomorrow, DAYLIGHT_BOUNDARIES[0])));

    next.and_then(|(date, hour)| date.and_hms_opt(hour, 0, 0))
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .filter(|boundary| *boundary > now)
        .unwrap_or(fallback)
}
