use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::RefCell;
use std::time::{Duration, Instant};
use vertex_core::db::open_db_in_memory;
use vertex_core::service::theme::ThemeEnvironment;
use vertex_core::store::keys;
use vertex_core::{
    AppState, AutoType, DeviceDarkTheme, EffectiveTheme, ExpansionMode, KeyValueStore,
    NotificationPermission, Notifier, ReminderFrequency, ReminderOutcome, Reminder,
    AppView, SearchHistoryEntry, SqliteKvStore, StartUpMode, Syllabus, ThemeMode, TopicStatus,
    MAX_HISTORY_ENTRIES,
};

const ROADMAP: &str = r#"{
    "id": "mern",
    "title": "MERN Breakdown",
    "children": [
        {"id": "frontend", "title": "Frontend", "children": [
            {"id": "html", "title": "HTML"},
            {"id": "css", "title": "CSS", "children": [
                {"id": "flexbox", "title": "Flexbox"},
                {"id": "grid", "title": "Grid"}
            ]},
            {"id": "react", "title": "React", "description": "Components and hooks"}
        ]},
        {"id": "backend", "title": "Backend", "children": [
            {"id": "node", "title": "Node.js"},
            {"id": "express", "title": "Express"}
        ]}
    ]
}"#;

const HOUR_MS: i64 = 3_600_000;
const NOW: i64 = 1_800_000_000_000;

fn syllabus() -> Syllabus {
    Syllabus::from_json_str(ROADMAP).unwrap()
}

struct TestNotifier {
    permission: NotificationPermission,
    delivered: RefCell<Vec<Reminder>>,
}

impl TestNotifier {
    fn with(permission: NotificationPermission) -> Self {
        Self {
            permission,
            delivered: RefCell::new(Vec::new()),
        }
    }
}

impl Notifier for TestNotifier {
    fn permission(&self) -> NotificationPermission {
        self.permission
    }

    fn deliver(&self, reminder: &Reminder) -> Result<(), String> {
        self.delivered.borrow_mut().push(reminder.clone());
        Ok(())
    }
}

#[test]
fn status_round_trips_across_sessions() {
    let conn = open_db_in_memory().unwrap();
    {
        let store = SqliteKvStore::try_new(&conn).unwrap();
        let mut state = AppState::load(store, syllabus());
        state.set_status("html", Some(TopicStatus::Mastered));
        state.set_status("react", Some(TopicStatus::Learning));
        state.set_status("css", Some(TopicStatus::Learning));
        state.set_status("css", None);
    }

    let store = SqliteKvStore::try_new(&conn).unwrap();
    let state = AppState::load(store, syllabus());
    assert_eq!(state.status("html"), TopicStatus::Mastered);
    assert_eq!(state.status("react"), TopicStatus::Learning);
    assert_eq!(state.status("css"), TopicStatus::Pending);
    assert_eq!(state.status("never-tracked"), TopicStatus::Pending);

    let stats = state.stats();
    assert_eq!(stats.total, 10);
    assert_eq!(stats.mastered, 1);
    assert_eq!(stats.learning, 1);
    assert_eq!(stats.pending, 8);
}

#[test]
fn reset_progress_clears_memory_and_store() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::try_new(&conn).unwrap();
    let mut state = AppState::load(store, syllabus());
    for id in ["html", "css", "node"] {
        state.set_status(id, Some(TopicStatus::Mastered));
    }

    state.reset_progress();

    for id in ["html", "css", "node"] {
        assert_eq!(state.status(id), TopicStatus::Pending);
    }
    assert!(state.store().get_raw(keys::PROGRESS).unwrap().is_none());
}

#[test]
fn stale_progress_ids_are_tolerated() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::try_new(&conn).unwrap();
    store
        .set_raw(keys::PROGRESS, r#"{"removed-topic":"Mastered","node":"Learning"}"#)
        .unwrap();

    let state = AppState::load(store, syllabus());
    assert_eq!(state.status("node"), TopicStatus::Learning);
    assert_eq!(state.stats().mastered, 0);
}

#[test]
fn accordion_toggle_closes_siblings_and_persists() {
    let conn = open_db_in_memory().unwrap();
    {
        let store = SqliteKvStore::try_new(&conn).unwrap();
        let mut state = AppState::load(store, syllabus());
        state.set_expansion_mode(ExpansionMode::Accordion);

        state.toggle_topic("frontend");
        state.toggle_topic("flexbox");
        state.toggle_topic("grid");
        assert!(!state.is_expanded("flexbox"));
        assert!(state.is_expanded("grid"));
        assert!(state.is_expanded("frontend"));

        state.toggle_topic("node");
        assert!(state.is_expanded("grid"));
        assert!(state.is_expanded("frontend"));
    }

    let store = SqliteKvStore::try_new(&conn).unwrap();
    let state = AppState::load(store, syllabus());
    assert_eq!(state.expansion().mode(), ExpansionMode::Accordion);
    assert_eq!(
        state.expansion().expanded(),
        ["frontend".to_string(), "grid".to_string(), "node".to_string()]
    );
}

#[test]
fn reset_policy_starts_collapsed_next_session() {
    let conn = open_db_in_memory().unwrap();
    {
        let store = SqliteKvStore::try_new(&conn).unwrap();
        let mut state = AppState::load(store, syllabus());
        state.set_expansion_mode(ExpansionMode::Reset);
        state.toggle_topic("frontend");
        assert!(state.is_expanded("frontend"));
    }

    let store = SqliteKvStore::try_new(&conn).unwrap();
    let state = AppState::load(store, syllabus());
    assert!(state.expansion().expanded().is_empty());
}

#[test]
fn reveal_topic_expands_ancestors_without_closing_others() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::try_new(&conn).unwrap();
    let mut state = AppState::load(store, syllabus());
    state.set_expansion_mode(ExpansionMode::Accordion);
    state.toggle_topic("backend");

    assert!(state.reveal_topic("grid"));
    assert!(state.is_expanded("backend"));
    assert!(state.is_expanded("frontend"));
    assert!(state.is_expanded("css"));
    assert_eq!(state.focused_topic(), Some("grid"));
    assert!(!state.reveal_topic("missing"));
}

#[test]
fn legacy_theme_is_migrated_once() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::try_new(&conn).unwrap();
    store.set(keys::LEGACY_THEME, "light").unwrap();

    let state = AppState::load(store, syllabus());
    assert_eq!(state.theme_settings().mode, ThemeMode::Light);
    assert_eq!(
        state.store().get::<ThemeMode>(keys::THEME_MODE).unwrap(),
        Some(ThemeMode::Light)
    );
}

#[test]
fn legacy_theme_is_ignored_when_theme_mode_exists() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::try_new(&conn).unwrap();
    store.set(keys::LEGACY_THEME, "light").unwrap();
    store.set(keys::THEME_MODE, &ThemeMode::Sunrise).unwrap();

    let state = AppState::load(store, syllabus());
    assert_eq!(state.theme_settings().mode, ThemeMode::Sunrise);
}

#[test]
fn corrupt_values_fall_back_to_defaults() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::try_new(&conn).unwrap();
    store.set_raw(keys::THEME_MODE, "\"neon\"").unwrap();
    store.set_raw(keys::SEARCH_HISTORY, "{}").unwrap();
    store.set_raw(keys::NOTIFICATION_SETTINGS, "[1,2]").unwrap();

    let state = AppState::load(store, syllabus());
    assert_eq!(state.theme_settings().mode, ThemeMode::Auto);
    assert!(state.history().is_empty());
    assert!(!state.notification_settings().enabled);
}

#[test]
fn theme_preferences_persist_and_resolve() {
    let conn = open_db_in_memory().unwrap();
    {
        let store = SqliteKvStore::try_new(&conn).unwrap();
        let mut state = AppState::load(store, syllabus());
        state.set_theme_mode(ThemeMode::Auto);
        state.set_auto_type(AutoType::Device);
        state.set_device_dark(DeviceDarkTheme::Obsidian);
    }

    let store = SqliteKvStore::try_new(&conn).unwrap();
    let mut state = AppState::load(store, syllabus());
    let dark_os = ThemeEnvironment {
        hour: 12,
        prefers_dark: true,
    };
    assert_eq!(state.effective_theme(dark_os), EffectiveTheme::Obsidian);

    state.set_auto_type(AutoType::Daylight);
    for (hour, expected) in [
        (8, EffectiveTheme::Sunrise),
        (10, EffectiveTheme::Light),
        (17, EffectiveTheme::Obsidian),
        (23, EffectiveTheme::Dark),
    ] {
        let env = ThemeEnvironment {
            hour,
            prefers_dark: false,
        };
        assert_eq!(state.effective_theme(env), expected, "hour {hour}");
    }
}

#[test]
fn search_history_dedups_caps_and_clears() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::try_new(&conn).unwrap();
    let mut state = AppState::load(store, syllabus());

    state.add_search("grid", Some("grid".to_string()), 10);
    state.add_search("hooks", None, 20);
    state.add_search("grid", Some("grid".to_string()), 30);
    assert_eq!(state.history().len(), 2);
    assert_eq!(state.history().entries()[0].query, "grid");
    assert_eq!(state.history().entries()[0].timestamp, 30);

    for i in 0..80 {
        state.add_search(&format!("q{i}"), None, 100 + i);
    }
    assert_eq!(state.history().len(), MAX_HISTORY_ENTRIES);
    let stored: Vec<SearchHistoryEntry> =
        state.store().get(keys::SEARCH_HISTORY).unwrap().unwrap();
    assert_eq!(stored.len(), MAX_HISTORY_ENTRIES);
    assert_eq!(stored[0].query, "q79");

    state.clear_history();
    assert!(state.history().is_empty());
    assert!(state.store().get_raw(keys::SEARCH_HISTORY).unwrap().is_none());
}

#[test]
fn due_reminder_updates_persisted_last_notified() {
    let conn = open_db_in_memory().unwrap();
    {
        let store = SqliteKvStore::try_new(&conn).unwrap();
        let mut state = AppState::load(store, syllabus());
        state.set_notifications_enabled(true);
        state.set_reminder_frequency(ReminderFrequency::Daily);
    }
    let store = SqliteKvStore::try_new(&conn).unwrap();
    store
        .set_raw(
            keys::NOTIFICATION_SETTINGS,
            &format!(
                r#"{{"enabled":true,"frequency":"daily","lastNotified":{}}}"#,
                NOW - 25 * HOUR_MS
            ),
        )
        .unwrap();
    let mut state = AppState::load(store, syllabus());
    let notifier = TestNotifier::with(NotificationPermission::Granted);
    let mut rng = StdRng::seed_from_u64(42);

    let report = state.check_reminder(&notifier, NOW, &mut rng);
    assert!(matches!(report.outcome, ReminderOutcome::Sent(_)));
    assert!(report.notice.is_none());
    assert_eq!(state.notification_settings().last_notified, Some(NOW));

    let report = state.check_reminder(&notifier, NOW + HOUR_MS, &mut rng);
    assert!(matches!(report.outcome, ReminderOutcome::NotDue { .. }));
    assert_eq!(notifier.delivered.borrow().len(), 1);

    let persisted = state
        .store()
        .get::<vertex_core::NotificationSettings>(keys::NOTIFICATION_SETTINGS)
        .unwrap()
        .unwrap();
    assert_eq!(persisted.last_notified, Some(NOW));
}

#[test]
fn permission_problem_is_surfaced_once() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::try_new(&conn).unwrap();
    let mut state = AppState::load(store, syllabus());
    state.set_notifications_enabled(true);
    let notifier = TestNotifier::with(NotificationPermission::Denied);
    let mut rng = StdRng::seed_from_u64(1);

    let first = state.check_reminder(&notifier, NOW, &mut rng);
    let second = state.check_reminder(&notifier, NOW + 60_000, &mut rng);
    assert!(first.notice.is_some());
    assert!(second.notice.is_none());
    assert_eq!(
        second.outcome,
        ReminderOutcome::PermissionMissing(NotificationPermission::Denied)
    );
}

#[test]
fn all_mastered_sends_message_instead_of_reminder() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::try_new(&conn).unwrap();
    let mut state = AppState::load(store, syllabus());
    let ids = state
        .syllabus()
        .topics()
        .iter()
        .map(|t| t.id.clone())
        .collect::<Vec<_>>();
    for id in &ids {
        state.set_status(id, Some(TopicStatus::Mastered));
    }
    state.set_notifications_enabled(true);
    let notifier = TestNotifier::with(NotificationPermission::Granted);
    let mut rng = StdRng::seed_from_u64(5);

    let report = state.send_reminder_now(&notifier, NOW, &mut rng);
    assert_eq!(report.outcome, ReminderOutcome::AllMastered);
    assert!(report.notice.unwrap().contains("mastered everything"));
    assert_eq!(state.notification_settings().last_notified, None);
    assert!(notifier.delivered.borrow().is_empty());
}

#[test]
fn scroll_position_is_debounced_then_persisted() {
    let conn = open_db_in_memory().unwrap();
    let start = Instant::now();
    {
        let store = SqliteKvStore::try_new(&conn).unwrap();
        let mut state = AppState::load(store, syllabus());
        state.record_scroll(120.0, start);
        state.record_scroll(480.0, start + Duration::from_millis(50));
        assert!(!state.poll_scroll(start + Duration::from_millis(100)));
        assert!(state.poll_scroll(start + Duration::from_millis(150)));
        assert_eq!(state.saved_scroll(), Some(480.0));
    }

    let store = SqliteKvStore::try_new(&conn).unwrap();
    let state = AppState::load(store, syllabus());
    assert_eq!(state.saved_scroll(), Some(480.0));
}

#[test]
fn start_up_mode_persists() {
    let conn = open_db_in_memory().unwrap();
    {
        let store = SqliteKvStore::try_new(&conn).unwrap();
        let mut state = AppState::load(store, syllabus());
        assert_eq!(state.start_up_mode(), StartUpMode::Dashboard);
        state.set_start_up_mode(StartUpMode::Last);
    }
    let store = SqliteKvStore::try_new(&conn).unwrap();
    assert_eq!(
        AppState::load(store, syllabus()).start_up_mode(),
        StartUpMode::Last
    );
}

#[test]
fn last_start_up_mode_reopens_last_view() {
    let conn = open_db_in_memory().unwrap();
    {
        let store = SqliteKvStore::try_new(&conn).unwrap();
        let mut state = AppState::load(store, syllabus());
        state.record_view(AppView::Syllabus);
        assert_eq!(state.start_up_view(), AppView::Dashboard);
        state.set_start_up_mode(StartUpMode::Last);
        assert_eq!(state.start_up_view(), AppView::Syllabus);
    }

    let store = SqliteKvStore::try_new(&conn).unwrap();
    let mut state = AppState::load(store, syllabus());
    assert_eq!(state.start_up_view(), AppView::Syllabus);
    state.record_view(AppView::Dashboard);
    assert_eq!(state.start_up_view(), AppView::Dashboard);
    assert_eq!(
        state.store().get::<AppView>(keys::LAST_VIEW).unwrap(),
        Some(AppView::Dashboard)
    );
}

#[test]
fn roadmap_root_counts_as_a_topic() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::try_new(&conn).unwrap();
    let mut state = AppState::load(store, syllabus());
    let ids = state
        .syllabus()
        .topics()
        .iter()
        .map(|t| t.id.clone())
        .filter(|id| id != "mern")
        .collect::<Vec<_>>();
    for id in &ids {
        state.set_status(id, Some(TopicStatus::Mastered));
    }
    let notifier = TestNotifier::with(NotificationPermission::Granted);
    let mut rng = StdRng::seed_from_u64(3);

    let report = state.send_reminder_now(&notifier, NOW, &mut rng);
    match report.outcome {
        ReminderOutcome::Sent(reminder) => assert_eq!(reminder.topic_id, "mern"),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(state.stats().pending, 1);
}
