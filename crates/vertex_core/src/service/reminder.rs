//! Study reminder throttle.
//!
//! # Responsibility
//! - Decide on each check tick whether a reminder is due.
//! - Pick a random unfinished topic and hand the reminder to a `Notifier`.
//!
//! # Invariants
//! - Two phases: idle (a reminder may fire) and cooldown (threshold for the
//!   configured frequency has not elapsed since `last_notified`).
//! - `last_notified` only moves forward after a delivered reminder; the
//!   all-mastered message and failed deliveries leave it untouched.

use crate::model::settings::NotificationSettings;
use crate::model::topic::{TopicId, TopicStatus};
use crate::service::progress::ProgressTracker;
use crate::syllabus::FlatTopic;
use log::{info, warn};
use rand::Rng;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Interval between reminder checks while the app is open.
pub const REMINDER_CHECK_INTERVAL: Duration = Duration::from_secs(60);
/// Delay before the first check after startup.
pub const REMINDER_STARTUP_DELAY: Duration = Duration::from_secs(5);
/// Repeated reminders carry this tag so they replace each other.
pub const REMINDER_TAG: &str = "study-reminder";
pub const REMINDER_TITLE: &str = "Ready to learn?";

/// Platform notification permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPermission {
    Granted,
    Denied,
    /// The platform cannot show desktop notifications at all.
    Unsupported,
}

impl Display for NotificationPermission {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Granted => f.write_str("granted"),
            Self::Denied => f.write_str("denied"),
            Self::Unsupported => f.write_str("unsupported"),
        }
    }
}

/// Reminder payload handed to the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub title: String,
    pub body: String,
    pub tag: &'static str,
    pub topic_id: TopicId,
}

impl Reminder {
    fn for_topic(topic: &FlatTopic) -> Self {
        Self {
            title: REMINDER_TITLE.to_string(),
            body: format!("How about a quick session on \"{}\"?", topic.title),
            tag: REMINDER_TAG,
            topic_id: topic.id.clone(),
        }
    }
}

/// Desktop notification surface.
pub trait Notifier {
    fn permission(&self) -> NotificationPermission;
    /// Shows `reminder`; clicking it should bring the app to the front.
    fn deliver(&self, reminder: &Reminder) -> Result<(), String>;
}

/// Throttle phase at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottlePhase {
    Idle,
    Cooldown { remaining_ms: i64 },
}

/// What one check (or forced send) did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderOutcome {
    Disabled,
    PermissionMissing(NotificationPermission),
    NotDue { remaining_ms: i64 },
    Sent(Reminder),
    /// Nothing left to study; shown as an informational message.
    AllMastered,
    /// No syllabus topics are loaded; nothing is checked or shown.
    NoTopics,
    DeliveryFailed(String),
}

/// Current phase for `settings` at `now_ms`.
pub fn throttle_phase(settings: &NotificationSettings, now_ms: i64) -> ThrottlePhase {
    let elapsed = now_ms.saturating_sub(settings.last_notified.unwrap_or(0));
    let threshold = settings.frequency.threshold_ms();
    if elapsed > threshold {
        ThrottlePhase::Idle
    } else {
        ThrottlePhase::Cooldown {
            remaining_ms: threshold.saturating_sub(elapsed),
        }
    }
}

/// Runs one periodic check.
pub fn check_reminder<R: Rng + ?Sized>(
    settings: &mut NotificationSettings,
    topics: &[FlatTopic],
    progress: &ProgressTracker,
    notifier: &dyn Notifier,
    now_ms: i64,
    rng: &mut R,
) -> ReminderOutcome {
    if topics.is_empty() {
        return ReminderOutcome::NoTopics;
    }
    if !settings.enabled {
        return ReminderOutcome::Disabled;
    }
    let permission = notifier.permission();
    if permission != NotificationPermission::Granted {
        return ReminderOutcome::PermissionMissing(permission);
    }
    if let ThrottlePhase::Cooldown { remaining_ms } = throttle_phase(settings, now_ms) {
        return ReminderOutcome::NotDue { remaining_ms };
    }
    deliver_random(settings, topics, progress, notifier, now_ms, rng)
}

/// Sends a reminder immediately, bypassing the enabled flag and cooldown.
pub fn send_reminder_now<R: Rng + ?Sized>(
    settings: &mut NotificationSettings,
    topics: &[FlatTopic],
    progress: &ProgressTracker,
    notifier: &dyn Notifier,
    now_ms: i64,
    rng: &mut R,
) -> ReminderOutcome {
    if topics.is_empty() {
        return ReminderOutcome::NoTopics;
    }
    let permission = notifier.permission();
    if permission != NotificationPermission::Granted {
        return ReminderOutcome::PermissionMissing(permission);
    }
    deliver_random(settings, topics, progress, notifier, now_ms, rng)
}

fn deliver_random<R: Rng + ?Sized>(
    settings: &mut NotificationSettings,
    topics: &[FlatTopic],
    progress: &ProgressTracker,
    notifier: &dyn Notifier,
    now_ms: i64,
    rng: &mut R,
) -> ReminderOutcome {
    let candidates = topics
        .iter()
        .filter(|topic| progress.status(&topic.id) != TopicStatus::Mastered)
        .collect::<Vec<_>>();
    if candidates.is_empty() {
        info!("event=reminder_check module=reminder status=ok result=all_mastered");
        return ReminderOutcome::AllMastered;
    }

    let topic = candidates[rng.random_range(0..candidates.len())];
    let reminder = Reminder::for_topic(topic);
    match notifier.deliver(&reminder) {
        Ok(()) => {
            settings.last_notified = Some(now_ms);
            info!(
                "event=reminder_sent module=reminder status=ok topic_id={} candidates={}",
                topic.id,
                candidates.len()
            );
            ReminderOutcome::Sent(reminder)
        }
        Err(err) => {
            warn!("event=reminder_sent module=reminder status=error error={err}");
            ReminderOutcome::DeliveryFailed(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        check_reminder, send_reminder_now, throttle_phase, NotificationPermission, Notifier,
        Reminder, ReminderOutcome, ThrottlePhase,
    };
    use crate::model::settings::{NotificationSettings, ReminderFrequency};
    use crate::model::topic::{TopicNode, TopicStatus};
    use crate::service::progress::ProgressTracker;
    use crate::syllabus::Syllabus;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::RefCell;

    const HOUR_MS: i64 = 3_600_000;
    const NOW: i64 = 1_800_000_000_000;

    struct RecordingNotifier {
        permission: NotificationPermission,
        fail: bool,
        sent: RefCell<Vec<Reminder>>,
    }

    impl RecordingNotifier {
        fn granted() -> Self {
            Self {
                permission: NotificationPermission::Granted,
                fail: false,
                sent: RefCell::new(Vec::new()),
            }
        }
    }

    impl Notifier for RecordingNotifier {
        fn permission(&self) -> NotificationPermission {
            self.permission
        }

        fn deliver(&self, reminder: &Reminder) -> Result<(), String> {
            if self.fail {
                return Err("blocked".to_string());
            }
            self.sent.borrow_mut().push(reminder.clone());
            Ok(())
        }
    }

    fn syllabus() -> Syllabus {
        Syllabus::from_roots(
            None,
            vec![TopicNode::new("html", "HTML"), TopicNode::new("css", "CSS")],
        )
        .unwrap()
    }

    fn daily(last_notified: Option<i64>) -> NotificationSettings {
        NotificationSettings {
            enabled: true,
            frequency: ReminderFrequency::Daily,
            last_notified,
        }
    }

    #[test]
    fn due_reminder_fires_and_enters_cooldown() {
        let syllabus = syllabus();
        let notifier = RecordingNotifier::granted();
        let mut settings = daily(Some(NOW - 25 * HOUR_MS));
        let mut rng = StdRng::seed_from_u64(7);

        let outcome = check_reminder(
            &mut settings,
            syllabus.topics(),
            &ProgressTracker::new(),
            &notifier,
            NOW,
            &mut rng,
        );

        assert!(matches!(outcome, ReminderOutcome::Sent(_)));
        assert_eq!(settings.last_notified, Some(NOW));
        assert_eq!(notifier.sent.borrow().len(), 1);
        assert_eq!(notifier.sent.borrow()[0].tag, "study-reminder");
        assert!(matches!(
            throttle_phase(&settings, NOW + 1),
            ThrottlePhase::Cooldown { .. }
        ));
    }

    #[test]
    fn recent_reminder_is_throttled() {
        let syllabus = syllabus();
        let notifier = RecordingNotifier::granted();
        let mut settings = daily(Some(NOW - HOUR_MS));
        let mut rng = StdRng::seed_from_u64(7);

        let outcome = check_reminder(
            &mut settings,
            syllabus.topics(),
            &ProgressTracker::new(),
            &notifier,
            NOW,
            &mut rng,
        );

        assert_eq!(
            outcome,
            ReminderOutcome::NotDue {
                remaining_ms: 23 * HOUR_MS
            }
        );
        assert_eq!(settings.last_notified, Some(NOW - HOUR_MS));
        assert!(notifier.sent.borrow().is_empty());
    }

    #[test]
    fn never_notified_counts_as_due() {
        assert_eq!(throttle_phase(&daily(None), NOW), ThrottlePhase::Idle);
    }

    #[test]
    fn corrupt_last_notified_does_not_overflow() {
        assert_eq!(throttle_phase(&daily(Some(i64::MIN)), NOW), ThrottlePhase::Idle);
        assert_eq!(
            throttle_phase(&daily(Some(i64::MAX)), i64::MIN),
            ThrottlePhase::Cooldown {
                remaining_ms: i64::MAX
            }
        );
    }

    #[test]
    fn empty_topic_list_is_quiet() {
        let notifier = RecordingNotifier::granted();
        let mut rng = StdRng::seed_from_u64(2);
        let mut settings = daily(None);

        let periodic = check_reminder(
            &mut settings,
            &[],
            &ProgressTracker::new(),
            &notifier,
            NOW,
            &mut rng,
        );
        let manual = send_reminder_now(
            &mut settings,
            &[],
            &ProgressTracker::new(),
            &notifier,
            NOW,
            &mut rng,
        );
        assert_eq!(periodic, ReminderOutcome::NoTopics);
        assert_eq!(manual, ReminderOutcome::NoTopics);
        assert_eq!(settings.last_notified, None);
        assert!(notifier.sent.borrow().is_empty());
    }

    #[test]
    fn disabled_or_unpermitted_is_a_no_op() {
        let syllabus = syllabus();
        let mut rng = StdRng::seed_from_u64(1);
        let mut settings = daily(None);
        settings.enabled = false;
        let outcome = check_reminder(
            &mut settings,
            syllabus.topics(),
            &ProgressTracker::new(),
            &RecordingNotifier::granted(),
            NOW,
            &mut rng,
        );
        assert_eq!(outcome, ReminderOutcome::Disabled);

        let denied = RecordingNotifier {
            permission: NotificationPermission::Denied,
            ..RecordingNotifier::granted()
        };
        let mut settings = daily(None);
        let outcome = check_reminder(
            &mut settings,
            syllabus.topics(),
            &ProgressTracker::new(),
            &denied,
            NOW,
            &mut rng,
        );
        assert_eq!(
            outcome,
            ReminderOutcome::PermissionMissing(NotificationPermission::Denied)
        );
        assert_eq!(settings.last_notified, None);
    }

    #[test]
    fn reminder_only_picks_unmastered_topics() {
        let syllabus = syllabus();
        let mut progress = ProgressTracker::new();
        progress.set_status("html", Some(TopicStatus::Mastered));
        progress.set_status("css", Some(TopicStatus::Learning));

        for seed in 0..20 {
            let notifier = RecordingNotifier::granted();
            let mut settings = daily(None);
            let mut rng = StdRng::seed_from_u64(seed);
            let outcome = check_reminder(
                &mut settings,
                syllabus.topics(),
                &progress,
                &notifier,
                NOW,
                &mut rng,
            );
            match outcome {
                ReminderOutcome::Sent(reminder) => {
                    assert_eq!(reminder.topic_id, "css");
                    assert_eq!(reminder.body, "How about a quick session on \"CSS\"?");
                }
                other => panic!("unexpected outcome: {other:?}"),
            }
        }
    }

    #[test]
    fn all_mastered_reports_message_without_cooldown() {
        let syllabus = syllabus();
        let mut progress = ProgressTracker::new();
        progress.set_status("html", Some(TopicStatus::Mastered));
        progress.set_status("css", Some(TopicStatus::Mastered));
        let mut settings = daily(None);
        let mut rng = StdRng::seed_from_u64(3);

        let outcome = check_reminder(
            &mut settings,
            syllabus.topics(),
            &progress,
            &RecordingNotifier::granted(),
            NOW,
            &mut rng,
        );
        assert_eq!(outcome, ReminderOutcome::AllMastered);
        assert_eq!(settings.last_notified, None);
    }

    #[test]
    fn failed_delivery_keeps_last_notified() {
        let syllabus = syllabus();
        let notifier = RecordingNotifier {
            fail: true,
            ..RecordingNotifier::granted()
        };
        let mut settings = daily(None);
        let mut rng = StdRng::seed_from_u64(3);

        let outcome = send_reminder_now(
            &mut settings,
            syllabus.topics(),
            &ProgressTracker::new(),
            &notifier,
            NOW,
            &mut rng,
        );
        assert_eq!(outcome, ReminderOutcome::DeliveryFailed("blocked".to_string()));
        assert_eq!(settings.last_notified, None);
    }

    #[test]
    fn send_now_ignores_cooldown_and_enabled_flag() {
        let syllabus = syllabus();
        let notifier = RecordingNotifier::granted();
        let mut settings = daily(Some(NOW - HOUR_MS));
        settings.enabled = false;
        let mut rng = StdRng::seed_from_u64(11);

        let outcome = send_reminder_now(
            &mut settings,
            syllabus.topics(),
            &ProgressTracker::new(),
            &notifier,
            NOW,
            &mut rng,
        );
        assert!(matches!(outcome, ReminderOutcome::Sent(_)));
        assert_eq!(settings.last_notified, Some(NOW));
    }
}
