//! Periodic work schedule for the long-running view loop.
//!
//! The loop owns one `TickSchedule`, sleeps until `next_deadline()`, then
//! runs whatever `due()` reports. Theme re-evaluation and reminder checks
//! share the loop, so there is never more than one task touching state.

use crate::service::reminder::{REMINDER_CHECK_INTERVAL, REMINDER_STARTUP_DELAY};
use crate::service::theme::THEME_POLL_INTERVAL;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    ThemeRefresh,
    ReminderCheck,
}

#[derive(Debug, Clone)]
pub struct TickSchedule {
    theme_interval: Duration,
    reminder_interval: Duration,
    next_theme: Instant,
    next_reminder: Instant,
}

impl TickSchedule {
    /// Schedule with the standard intervals, starting at `start`.
    pub fn new(start: Instant) -> Self {
        Self::with_intervals(
            start,
            THEME_POLL_INTERVAL,
            REMINDER_CHECK_INTERVAL,
            REMINDER_STARTUP_DELAY,
        )
    }

    pub fn with_intervals(
        start: Instant,
        theme_interval: Duration,
        reminder_interval: Duration,
        reminder_startup_delay: Duration,
    ) -> Self {
        Self {
            theme_interval,
            reminder_interval,
            next_theme: start + theme_interval,
            next_reminder: start + reminder_startup_delay,
        }
    }

    pub fn next_deadline(&self) -> Instant {
        self.next_theme.min(self.next_reminder)
    }

    /// Events due at `now`; each due event is rescheduled one interval later.
    pub fn due(&mut self, now: Instant) -> Vec<TickEvent> {
        let mut events = Vec::new();
        if self.next_theme <= now {
            events.push(TickEvent::ThemeRefresh);
            self.next_theme = now + self.theme_interval;
        }
        if self.next_reminder <= now {
            events.push(TickEvent::ReminderCheck);
            self.next_reminder = now + self.reminder_interval;
        }
        events
    }
}
