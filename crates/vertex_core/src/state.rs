//! Application state manager.
//!
//! # Responsibility
//! - Own the loaded syllabus and every per-concern state holder.
//! - Restore state from the key-value store at startup (with defaults and
//!   the legacy theme migration) and write each concern back under its
//!   own key after every mutation.
//!
//! # Invariants
//! - Store failures never reach callers: reads fall back to defaults and
//!   writes are fire-and-forget, both logged.
//! - Each mutation persists only the key(s) of the concern it touched.
//! - `reset_progress` and `clear_history` remove their keys entirely.

use crate::model::history::SearchHistoryEntry;
use crate::model::settings::{
    AppView, AutoType, DeviceDarkTheme, DeviceLightTheme, EffectiveTheme, ExpansionMode,
    NotificationSettings, ReminderFrequency, StartUpMode, ThemeMode, ThemeSettings,
};
use crate::model::topic::{TopicId, TopicStatus};
use crate::service::expansion::ExpansionController;
use crate::service::history::SearchHistory;
use crate::service::progress::{ProgressMap, ProgressStats, ProgressTracker};
use crate::service::reminder::{
    check_reminder, send_reminder_now, NotificationPermission, Notifier, ReminderOutcome,
};
use crate::service::theme::{resolve_theme, ThemeEnvironment};
use crate::store::keys;
use crate::store::kv_store::KeyValueStore;
use crate::syllabus::Syllabus;
use crate::timing::debounce::{Debouncer, SCROLL_DEBOUNCE};
use log::{error, info, warn};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Instant;

/// Result of a reminder check as the view layer should present it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderReport {
    pub outcome: ReminderOutcome,
    /// User-facing message, when this outcome should be surfaced.
    pub notice: Option<String>,
}

/// Explicit application state passed to the view layer.
pub struct AppState<S: KeyValueStore> {
    store: S,
    syllabus: Syllabus,
    progress: ProgressTracker,
    expansion: ExpansionController,
    theme: ThemeSettings,
    history: SearchHistory,
    notifications: NotificationSettings,
    start_up: StartUpMode,
    last_view: AppView,
    scroll: Debouncer<f64>,
    saved_scroll: Option<f64>,
    focused_topic: Option<TopicId>,
    permission_notice_shown: bool,
    all_mastered_notice_shown: bool,
}

impl<S: KeyValueStore> AppState<S> {
    /// Restores state for a new session.
    pub fn load(store: S, syllabus: Syllabus) -> Self {
        let progress = read::<_, ProgressMap>(&store, keys::PROGRESS)
            .map(ProgressTracker::from_map)
            .unwrap_or_default();

        let theme = load_theme_settings(&store);

        let history = read::<_, Vec<SearchHistoryEntry>>(&store, keys::SEARCH_HISTORY)
            .map(SearchHistory::from_entries)
            .unwrap_or_default();

        let expansion_mode =
            read(&store, keys::EXPANSION_MODE).unwrap_or(ExpansionMode::Persist);
        let expansion = if expansion_mode == ExpansionMode::Reset {
            write(&store, keys::EXPANDED_TOPICS, &Vec::<TopicId>::new());
            ExpansionController::new(expansion_mode)
        } else {
            let saved = read::<_, Vec<TopicId>>(&store, keys::EXPANDED_TOPICS).unwrap_or_default();
            ExpansionController::restore(expansion_mode, saved)
        };

        let start_up = read(&store, keys::START_UP_MODE).unwrap_or(StartUpMode::Dashboard);
        let last_view = read(&store, keys::LAST_VIEW).unwrap_or(AppView::Dashboard);
        let notifications = read(&store, keys::NOTIFICATION_SETTINGS).unwrap_or_default();
        let saved_scroll = read::<_, f64>(&store, keys::SCROLL_POSITION);

        info!(
            "event=state_load module=state status=ok topics={} tracked={} expanded={} history={} expansion_mode={} theme_mode={}",
            syllabus.len(),
            progress.as_map().len(),
            expansion.expanded().len(),
            history.len(),
            expansion.mode(),
            theme.mode
        );

        Self {
            store,
            syllabus,
            progress,
            expansion,
            theme,
            history,
            notifications,
            start_up,
            last_view,
            scroll: Debouncer::new(SCROLL_DEBOUNCE),
            saved_scroll,
            focused_topic: None,
            permission_notice_shown: false,
            all_mastered_notice_shown: false,
        }
    }

    pub fn syllabus(&self) -> &Syllabus {
        &self.syllabus
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // -- progress -------------------------------------------------------

    pub fn status(&self, id: &str) -> TopicStatus {
        self.progress.status(id)
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    /// Sets or clears (`None`) one topic's status.
    pub fn set_status(&mut self, id: &str, status: Option<TopicStatus>) {
        self.progress.set_status(id, status);
        if status != Some(TopicStatus::Mastered) {
            self.all_mastered_notice_shown = false;
        }
        write(&self.store, keys::PROGRESS, self.progress.as_map());
    }

    /// Clears every status and deletes the persisted record.
    pub fn reset_progress(&mut self) {
        let cleared = self.progress.as_map().len();
        self.progress.reset_all();
        self.all_mastered_notice_shown = false;
        remove(&self.store, keys::PROGRESS);
        info!("event=progress_reset module=state status=ok cleared={cleared}");
    }

    pub fn stats(&self) -> ProgressStats {
        self.progress.stats(&self.syllabus)
    }

    // -- expansion ------------------------------------------------------

    pub fn expansion(&self) -> &ExpansionController {
        &self.expansion
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expansion.is_expanded(id)
    }

    /// Opens or closes one topic under the active policy.
    pub fn toggle_topic(&mut self, id: &str) -> bool {
        let expanded = self.expansion.toggle(id, &self.syllabus);
        self.persist_expansion();
        expanded
    }

    pub fn expand_topics<I, T>(&mut self, ids: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<TopicId>,
    {
        self.expansion.expand_many(ids);
        self.persist_expansion();
    }

    /// Expands every ancestor of `id` and focuses it.
    ///
    /// Returns `false` for ids missing from the syllabus.
    pub fn reveal_topic(&mut self, id: &str) -> bool {
        let Some(path) = self.syllabus.path_to(id) else {
            return false;
        };
        self.expand_topics(path);
        self.focused_topic = Some(id.to_string());
        true
    }

    pub fn set_expansion_mode(&mut self, mode: ExpansionMode) {
        self.expansion.set_mode(mode);
        write(&self.store, keys::EXPANSION_MODE, &mode);
    }

    pub fn focused_topic(&self) -> Option<&str> {
        self.focused_topic.as_deref()
    }

    fn persist_expansion(&self) {
        write(&self.store, keys::EXPANDED_TOPICS, self.expansion.expanded());
    }

    // -- theme ----------------------------------------------------------

    pub fn theme_settings(&self) -> ThemeSettings {
        self.theme
    }

    pub fn effective_theme(&self, env: ThemeEnvironment) -> EffectiveTheme {
        resolve_theme(&self.theme, env)
    }

    pub fn set_theme_mode(&mut self, mode: ThemeMode) {
        self.theme.mode = mode;
        write(&self.store, keys::THEME_MODE, &mode);
    }

    pub fn set_auto_type(&mut self, auto_type: AutoType) {
        self.theme.auto_type = auto_type;
        write(&self.store, keys::AUTO_TYPE, &auto_type);
    }

    pub fn set_device_dark(&mut self, theme: DeviceDarkTheme) {
        self.theme.device_dark = theme;
        write(&self.store, keys::DEVICE_DARK, &theme);
    }

    pub fn set_device_light(&mut self, theme: DeviceLightTheme) {
        self.theme.device_light = theme;
        write(&self.store, keys::DEVICE_LIGHT, &theme);
    }

    // -- search history -------------------------------------------------

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn add_search(&mut self, query: &str, topic_id: Option<TopicId>, now_ms: i64) {
        if self.history.add(query, topic_id, now_ms) {
            write(&self.store, keys::SEARCH_HISTORY, self.history.entries());
        }
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        remove(&self.store, keys::SEARCH_HISTORY);
    }

    // -- start-up view --------------------------------------------------

    pub fn start_up_mode(&self) -> StartUpMode {
        self.start_up
    }

    pub fn set_start_up_mode(&mut self, mode: StartUpMode) {
        self.start_up = mode;
        write(&self.store, keys::START_UP_MODE, &mode);
    }

    /// View to open at launch under the current start-up mode.
    pub fn start_up_view(&self) -> AppView {
        match self.start_up {
            StartUpMode::Dashboard => AppView::Dashboard,
            StartUpMode::Last => self.last_view,
        }
    }

    /// Records the view being shown; only changes are written.
    pub fn record_view(&mut self, view: AppView) {
        if self.last_view != view {
            self.last_view = view;
            write(&self.store, keys::LAST_VIEW, &view);
        }
    }

    // -- reminders ------------------------------------------------------

    pub fn notification_settings(&self) -> NotificationSettings {
        self.notifications
    }

    pub fn set_notifications_enabled(&mut self, enabled: bool) {
        self.notifications.enabled = enabled;
        if enabled {
            self.permission_notice_shown = false;
        }
        self.persist_notifications();
    }

    pub fn set_reminder_frequency(&mut self, frequency: ReminderFrequency) {
        self.notifications.frequency = frequency;
        self.persist_notifications();
    }

    /// Periodic reminder check.
    ///
    /// Permission problems and the all-mastered message are surfaced once
    /// per session rather than on every tick.
    pub fn check_reminder<R: Rng + ?Sized>(
        &mut self,
        notifier: &dyn Notifier,
        now_ms: i64,
        rng: &mut R,
    ) -> ReminderReport {
        let outcome = check_reminder(
            &mut self.notifications,
            self.syllabus.topics(),
            &self.progress,
            notifier,
            now_ms,
            rng,
        );
        let notice = match &outcome {
            ReminderOutcome::PermissionMissing(permission) if !self.permission_notice_shown => {
                self.permission_notice_shown = true;
                Some(permission_notice(*permission))
            }
            ReminderOutcome::AllMastered if !self.all_mastered_notice_shown => {
                self.all_mastered_notice_shown = true;
                Some(ALL_MASTERED_NOTICE.to_string())
            }
            ReminderOutcome::DeliveryFailed(err) => Some(delivery_failed_notice(err)),
            _ => None,
        };
        self.after_reminder(&outcome);
        ReminderReport { outcome, notice }
    }

    /// Manual "send a reminder now" action; every problem is surfaced.
    pub fn send_reminder_now<R: Rng + ?Sized>(
        &mut self,
        notifier: &dyn Notifier,
        now_ms: i64,
        rng: &mut R,
    ) -> ReminderReport {
        let outcome = send_reminder_now(
            &mut self.notifications,
            self.syllabus.topics(),
            &self.progress,
            notifier,
            now_ms,
            rng,
        );
        let notice = match &outcome {
            ReminderOutcome::PermissionMissing(permission) => Some(permission_notice(*permission)),
            ReminderOutcome::AllMastered => Some(ALL_MASTERED_NOTICE.to_string()),
            ReminderOutcome::DeliveryFailed(err) => Some(delivery_failed_notice(err)),
            _ => None,
        };
        self.after_reminder(&outcome);
        ReminderReport { outcome, notice }
    }

    fn after_reminder(&self, outcome: &ReminderOutcome) {
        if matches!(outcome, ReminderOutcome::Sent(_)) {
            self.persist_notifications();
        }
    }

    fn persist_notifications(&self) {
        write(&self.store, keys::NOTIFICATION_SETTINGS, &self.notifications);
    }

    // -- scroll position ------------------------------------------------

    /// Last persisted tree scroll offset.
    pub fn saved_scroll(&self) -> Option<f64> {
        self.saved_scroll
    }

    /// Schedules a debounced scroll-position write.
    pub fn record_scroll(&mut self, offset: f64, now: Instant) {
        self.scroll.push(offset, now);
    }

    /// Writes the pending scroll position once its debounce delay passed.
    pub fn poll_scroll(&mut self, now: Instant) -> bool {
        match self.scroll.poll(now) {
            Some(offset) => {
                self.store_scroll(offset);
                true
            }
            None => false,
        }
    }

    /// Writes any pending scroll position immediately (shutdown path).
    pub fn flush_scroll(&mut self) {
        if let Some(offset) = self.scroll.flush() {
            self.store_scroll(offset);
        }
    }

    fn store_scroll(&mut self, offset: f64) {
        self.saved_scroll = Some(offset);
        write(&self.store, keys::SCROLL_POSITION, &offset);
    }
}

const ALL_MASTERED_NOTICE: &str =
    "Wow! You've mastered everything! Nothing to remind you about.";

fn permission_notice(permission: NotificationPermission) -> String {
    match permission {
        NotificationPermission::Unsupported => {
            "This device does not support desktop notifications.".to_string()
        }
        _ => "Notification permission is not granted. Enable it in your system settings."
            .to_string(),
    }
}

fn delivery_failed_notice(err: &str) -> String {
    format!("Failed to send notification. Error: {err}")
}

fn load_theme_settings<S: KeyValueStore>(store: &S) -> ThemeSettings {
    let defaults = ThemeSettings::default();
    let stored_mode = read::<_, ThemeMode>(store, keys::THEME_MODE);
    let mode = match stored_mode {
        Some(mode) => mode,
        None if matches!(store.get_raw(keys::THEME_MODE), Ok(None)) => {
            migrate_legacy_theme(store).unwrap_or(defaults.mode)
        }
        None => defaults.mode,
    };

    ThemeSettings {
        mode,
        auto_type: read(store, keys::AUTO_TYPE).unwrap_or(defaults.auto_type),
        device_dark: read(store, keys::DEVICE_DARK).unwrap_or(defaults.device_dark),
        device_light: read(store, keys::DEVICE_LIGHT).unwrap_or(defaults.device_light),
    }
}

/// Copies the single-value legacy `theme` key into `themeMode`.
fn migrate_legacy_theme<S: KeyValueStore>(store: &S) -> Option<ThemeMode> {
    let legacy = read::<_, ThemeMode>(store, keys::LEGACY_THEME)?;
    write(store, keys::THEME_MODE, &legacy);
    info!("event=theme_migrate module=state status=ok from_key=theme mode={legacy}");
    Some(legacy)
}

fn read<S: KeyValueStore, T: DeserializeOwned>(store: &S, key: &str) -> Option<T> {
    match store.get(key) {
        Ok(value) => value,
        Err(err) => {
            warn!("event=store_read module=state status=error key={key} fallback=default error={err}");
            None
        }
    }
}

fn write<S: KeyValueStore, T: Serialize + ?Sized>(store: &S, key: &str, value: &T) {
    if let Err(err) = store.set(key, value) {
        error!("event=store_write module=state status=error key={key} error={err}");
    }
}

fn remove<S: KeyValueStore>(store: &S, key: &str) {
    if let Err(err) = store.remove(key) {
        error!("event=store_remove module=state status=error key={key} error={err}");
    }
}
