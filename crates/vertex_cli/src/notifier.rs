//! Terminal stand-in for desktop notifications.

use std::io::{IsTerminal, Write};
use vertex_core::{NotificationPermission, Notifier, Reminder};

/// Prints reminders to stderr with a bell.
///
/// Permission is granted only when stderr is attached to a terminal, so
/// reminders never end up silently in a redirected log.
pub struct TerminalNotifier {
    permission: NotificationPermission,
}

impl TerminalNotifier {
    pub fn detect() -> Self {
        let permission = if std::io::stderr().is_terminal() {
            NotificationPermission::Granted
        } else {
            NotificationPermission::Unsupported
        };
        Self { permission }
    }
}

impl Notifier for TerminalNotifier {
    fn permission(&self) -> NotificationPermission {
        self.permission
    }

    fn deliver(&self, reminder: &Reminder) -> Result<(), String> {
        let mut stderr = std::io::stderr().lock();
        writeln!(
            stderr,
            "\x07[{}] {}\n  {}\n  (vertex reveal {})",
            reminder.tag, reminder.title, reminder.body, reminder.topic_id
        )
        .map_err(|err| err.to_string())
    }
}
