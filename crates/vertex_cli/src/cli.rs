//! Command-line surface of the `vertex` binary.

use clap::{Args, Parser, Subcommand};
use std::fmt::Display;
use std::path::PathBuf;
use vertex_core::{
    AutoType, DeviceDarkTheme, DeviceLightTheme, ExpansionMode, ReminderFrequency, StartUpMode,
    ThemeMode, TopicStatus,
};

/// Top-level CLI parser for the `vertex` binary.
#[derive(Debug, Parser)]
#[command(name = "vertex", version, about = "VERTEX - local-first learning progress tracker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Directory holding the database and logs
    #[arg(long, global = true, env = "VERTEX_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Syllabus JSON document (defaults to <data-dir>/roadmap.json)
    #[arg(long, global = true, env = "VERTEX_SYLLABUS")]
    pub syllabus: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, global = true, env = "VERTEX_LOG")]
    pub log_level: Option<String>,

    /// Extra syllabus load attempts after a failure
    #[arg(long, global = true, default_value_t = 0)]
    pub retries: u32,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the syllabus tree with status marks
    Tree,
    /// Set one topic's status
    Status {
        id: String,
        #[arg(value_parser = topic_status)]
        status: TopicStatus,
    },
    /// Clear all progress
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
    /// Expand or collapse one topic
    Toggle { id: String },
    /// Expand every ancestor of a topic and show it
    Reveal { id: String },
    /// Filter topics by title and description
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        /// Add the query to the search history
        #[arg(long)]
        record: bool,
    },
    /// Filter topics interactively, one query per input line
    Browse,
    /// Show or clear recent searches
    History {
        #[arg(long)]
        clear: bool,
    },
    /// Show or change theme preferences
    Theme(ThemeArgs),
    /// Show or change app settings
    Settings(SettingsArgs),
    /// Progress summary
    Stats,
    /// Print the embedded web-search URL for a query
    DeepDive {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Run one reminder check
    Remind {
        /// Send a reminder regardless of schedule and the enabled flag
        #[arg(long)]
        now: bool,
    },
    /// Keep running and re-evaluate theme and reminders periodically
    Watch {
        /// Stop after this many scheduled ticks
        #[arg(long)]
        ticks: Option<u32>,
        /// Treat the OS color scheme as dark
        #[arg(long, env = "VERTEX_PREFERS_DARK")]
        prefers_dark: bool,
    },
    /// Show or record the tree scroll position
    Scroll { offset: Option<f64> },
}

#[derive(Debug, Args)]
pub struct ThemeArgs {
    #[arg(long, value_parser = theme_mode)]
    pub mode: Option<ThemeMode>,
    #[arg(long, value_parser = auto_type)]
    pub auto_type: Option<AutoType>,
    #[arg(long, value_parser = device_dark)]
    pub device_dark: Option<DeviceDarkTheme>,
    #[arg(long, value_parser = device_light)]
    pub device_light: Option<DeviceLightTheme>,
    /// Treat the OS color scheme as dark
    #[arg(long, env = "VERTEX_PREFERS_DARK")]
    pub prefers_dark: bool,
}

#[derive(Debug, Args)]
pub struct SettingsArgs {
    #[arg(long, value_parser = expansion_mode)]
    pub expansion_mode: Option<ExpansionMode>,
    #[arg(long, value_parser = start_up_mode)]
    pub start_up: Option<StartUpMode>,
    /// Study reminders: on or off
    #[arg(long, value_parser = on_off)]
    pub notifications: Option<bool>,
    #[arg(long, value_parser = reminder_frequency)]
    pub frequency: Option<ReminderFrequency>,
}

fn preference<T: Copy + Display>(
    value: &str,
    parse: fn(&str) -> Option<T>,
    all: &[T],
) -> Result<T, String> {
    parse(value).ok_or_else(|| {
        let expected = all.iter().map(ToString::to_string).collect::<Vec<_>>();
        format!("expected one of: {}", expected.join(", "))
    })
}

fn topic_status(value: &str) -> Result<TopicStatus, String> {
    TopicStatus::parse(value)
        .ok_or_else(|| "expected one of: pending, learning, mastered".to_string())
}

fn theme_mode(value: &str) -> Result<ThemeMode, String> {
    preference(value, ThemeMode::parse, ThemeMode::ALL)
}

fn auto_type(value: &str) -> Result<AutoType, String> {
    preference(value, AutoType::parse, AutoType::ALL)
}

fn device_dark(value: &str) -> Result<DeviceDarkTheme, String> {
    preference(value, DeviceDarkTheme::parse, DeviceDarkTheme::ALL)
}

fn device_light(value: &str) -> Result<DeviceLightTheme, String> {
    preference(value, DeviceLightTheme::parse, DeviceLightTheme::ALL)
}

fn expansion_mode(value: &str) -> Result<ExpansionMode, String> {
    preference(value, ExpansionMode::parse, ExpansionMode::ALL)
}

fn start_up_mode(value: &str) -> Result<StartUpMode, String> {
    preference(value, StartUpMode::parse, StartUpMode::ALL)
}

fn reminder_frequency(value: &str) -> Result<ReminderFrequency, String> {
    preference(value, ReminderFrequency::parse, ReminderFrequency::ALL)
}

fn on_off(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        _ => Err("expected on or off".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::{CommandFactory, Parser};
    use vertex_core::{ExpansionMode, ThemeMode, TopicStatus};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_invocation_has_no_subcommand() {
        let cli = Cli::try_parse_from(["vertex"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.retries, 0);
    }

    #[test]
    fn status_parses_case_insensitively() {
        let cli = Cli::try_parse_from(["vertex", "status", "react", "Mastered"]).unwrap();
        match cli.command {
            Some(Command::Status { id, status }) => {
                assert_eq!(id, "react");
                assert_eq!(status, TopicStatus::Mastered);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn preference_flags_reject_unknown_values() {
        assert!(Cli::try_parse_from(["vertex", "theme", "--mode", "neon"]).is_err());
        assert!(Cli::try_parse_from(["vertex", "settings", "--notifications", "maybe"]).is_err());
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "vertex",
            "settings",
            "--expansion-mode",
            "accordion",
            "--retries",
            "2",
            "--data-dir",
            "/tmp/vertex",
        ])
        .unwrap();
        assert_eq!(cli.retries, 2);
        assert_eq!(cli.data_dir.as_deref(), Some(std::path::Path::new("/tmp/vertex")));
        match cli.command {
            Some(Command::Settings(args)) => {
                assert_eq!(args.expansion_mode, Some(ExpansionMode::Accordion));
                assert_eq!(args.notifications, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn theme_mode_accepts_every_variant() {
        for mode in ThemeMode::ALL {
            let cli = Cli::try_parse_from(["vertex", "theme", "--mode", mode.as_str()]).unwrap();
            assert!(matches!(cli.command, Some(Command::Theme(_))));
        }
    }

    #[test]
    fn browse_takes_no_arguments() {
        let cli = Cli::try_parse_from(["vertex", "browse"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Browse)));
        assert!(Cli::try_parse_from(["vertex", "browse", "react"]).is_err());
    }

    #[test]
    fn search_joins_multiple_words() {
        let cli = Cli::try_parse_from(["vertex", "search", "react", "hooks", "--record"]).unwrap();
        match cli.command {
            Some(Command::Search { query, record }) => {
                assert_eq!(query, ["react", "hooks"]);
                assert!(record);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
