//! Command handlers.
//!
//! # Responsibility
//! - Apply one parsed command to `AppState` and print the result.
//! - Drive the long-running `watch` loop from a single `TickSchedule`.
//!
//! # Invariants
//! - Handlers never touch storage directly; every mutation goes through
//!   `AppState`, which persists it.
//! - Unknown topic ids are rejected before any state change.

use crate::cli::{Command, SettingsArgs, ThemeArgs};
use crate::error::UserError;
use crate::render;
use anyhow::bail;
use log::info;
use rand::RngCore;
use std::io::{BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Instant;
use vertex_core::service::theme::{next_daylight_boundary, ThemeEnvironment};
use vertex_core::timing::debounce::{Debouncer, SEARCH_DEBOUNCE};
use vertex_core::timing::ticker::{TickEvent, TickSchedule};
use vertex_core::{
    deep_dive_url, filter_topics, AppState, AppView, AutoType, Clock, KeyValueStore, Notifier,
    ReminderOutcome, ReminderReport, ThemeMode,
};

/// Platform services a command may need.
pub struct Services<'a> {
    pub notifier: &'a dyn Notifier,
    pub clock: &'a dyn Clock,
    pub rng: &'a mut dyn RngCore,
}

pub fn dispatch<S: KeyValueStore>(
    command: Option<Command>,
    state: &mut AppState<S>,
    services: &mut Services<'_>,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let Some(command) = command else {
        return start_up_view(state, out);
    };

    match command {
        Command::Tree => show_tree(state, out)?,
        Command::Status { id, status } => {
            ensure_topic(state, &id)?;
            state.set_status(&id, Some(status));
            writeln!(out, "{id}: {}", state.status(&id).as_str())?;
        }
        Command::Reset { yes } => {
            if !yes {
                bail!(UserError::new(
                    "resetting clears all progress; pass --yes to confirm"
                ));
            }
            state.reset_progress();
            writeln!(out, "All progress has been reset.")?;
        }
        Command::Toggle { id } => {
            ensure_topic(state, &id)?;
            state.toggle_topic(&id);
            show_tree(state, out)?;
        }
        Command::Reveal { id } => {
            if !state.reveal_topic(&id) {
                bail!(UserError::new(format!("unknown topic `{id}`")));
            }
            show_tree(state, out)?;
        }
        Command::Search { query, record } => search(state, services, out, &query.join(" "), record)?,
        Command::Browse => browse(state, stdin_lines(), out)?,
        Command::History { clear } => {
            if clear {
                state.clear_history();
                writeln!(out, "Search history cleared.")?;
            } else {
                render::history(out, state.history().entries())?;
            }
        }
        Command::Theme(args) => theme(state, services, out, args)?,
        Command::Settings(args) => settings(state, out, args)?,
        Command::Stats => {
            state.record_view(AppView::Dashboard);
            render::stats(out, &state.stats())?;
        }
        Command::DeepDive { query } => match deep_dive_url(&query.join(" ")) {
            Some(url) => writeln!(out, "{url}")?,
            None => bail!(UserError::new("deep-dive query is blank")),
        },
        Command::Remind { now } => {
            let now_ms = services.clock.now_ms();
            let report = if now {
                state.send_reminder_now(services.notifier, now_ms, &mut *services.rng)
            } else {
                state.check_reminder(services.notifier, now_ms, &mut *services.rng)
            };
            print_reminder(out, &report, true)?;
        }
        Command::Watch {
            ticks,
            prefers_dark,
        } => watch(state, services, out, ticks, prefers_dark)?,
        Command::Scroll { offset } => {
            if let Some(offset) = offset {
                state.record_scroll(offset, Instant::now());
                state.flush_scroll();
            }
            match state.saved_scroll() {
                Some(offset) => writeln!(out, "scroll offset: {offset}")?,
                None => writeln!(out, "scroll offset: none")?,
            }
        }
    }
    Ok(())
}

fn start_up_view<S: KeyValueStore>(state: &AppState<S>, out: &mut dyn Write) -> anyhow::Result<()> {
    match state.start_up_view() {
        AppView::Dashboard => render::stats(out, &state.stats())?,
        AppView::Syllabus => render::tree(out, state)?,
    }
    Ok(())
}

fn show_tree<S: KeyValueStore>(state: &mut AppState<S>, out: &mut dyn Write) -> anyhow::Result<()> {
    state.record_view(AppView::Syllabus);
    render::tree(out, state)?;
    Ok(())
}

fn ensure_topic<S: KeyValueStore>(state: &AppState<S>, id: &str) -> anyhow::Result<()> {
    if !state.syllabus().contains(id) {
        bail!(UserError::new(format!("unknown topic `{id}`")));
    }
    Ok(())
}

fn search<S: KeyValueStore>(
    state: &mut AppState<S>,
    services: &Services<'_>,
    out: &mut dyn Write,
    raw_query: &str,
    record: bool,
) -> anyhow::Result<()> {
    let Some(matches) = filter_topics(state.syllabus(), raw_query) else {
        bail!(UserError::new("search query is blank"));
    };
    render::search_results(out, &matches)?;
    let query = matches.query.clone();
    let first_hit = matches.hits.first().map(|topic| topic.id.clone());

    if record {
        state.add_search(&query, first_hit, services.clock.now_ms());
    }
    Ok(())
}

/// Feeds stdin lines to a channel so the browse loop can wait with a
/// timeout. The reader thread ends at EOF.
fn stdin_lines() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Interactive filtering: each input line replaces the pending query, and
/// only a query left untouched for the search debounce delay is run.
fn browse<S: KeyValueStore>(
    state: &AppState<S>,
    input: Receiver<String>,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let mut pending = Debouncer::new(SEARCH_DEBOUNCE);
    let mut runs = 0usize;
    loop {
        let next = match pending.deadline() {
            Some(deadline) => {
                input.recv_timeout(deadline.saturating_duration_since(Instant::now()))
            }
            None => input.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        let query = match next {
            Ok(line) => {
                pending.push(line, Instant::now());
                pending.poll(Instant::now())
            }
            Err(RecvTimeoutError::Timeout) => pending.poll(Instant::now()),
            Err(RecvTimeoutError::Disconnected) => {
                if let Some(query) = pending.flush() {
                    runs += show_matches(state, out, &query)?;
                }
                break;
            }
        };
        if let Some(query) = query {
            runs += show_matches(state, out, &query)?;
        }
    }
    info!("event=browse module=cli status=ok searches={runs}");
    Ok(())
}

fn show_matches<S: KeyValueStore>(
    state: &AppState<S>,
    out: &mut dyn Write,
    query: &str,
) -> anyhow::Result<usize> {
    let Some(matches) = filter_topics(state.syllabus(), query) else {
        return Ok(0);
    };
    writeln!(out, "-- {}", matches.query)?;
    render::search_results(out, &matches)?;
    out.flush()?;
    Ok(1)
}

fn theme_environment(clock: &dyn Clock, prefers_dark: bool) -> ThemeEnvironment {
    ThemeEnvironment {
        hour: clock.local_hour(),
        prefers_dark,
    }
}

fn theme<S: KeyValueStore>(
    state: &mut AppState<S>,
    services: &Services<'_>,
    out: &mut dyn Write,
    args: ThemeArgs,
) -> anyhow::Result<()> {
    if let Some(mode) = args.mode {
        state.set_theme_mode(mode);
    }
    if let Some(auto_type) = args.auto_type {
        state.set_auto_type(auto_type);
    }
    if let Some(theme) = args.device_dark {
        state.set_device_dark(theme);
    }
    if let Some(theme) = args.device_light {
        state.set_device_light(theme);
    }

    let settings = state.theme_settings();
    writeln!(out, "mode:         {}", settings.mode)?;
    writeln!(out, "auto type:    {}", settings.auto_type)?;
    writeln!(out, "device dark:  {}", settings.device_dark)?;
    writeln!(out, "device light: {}", settings.device_light)?;
    let effective = state.effective_theme(theme_environment(services.clock, args.prefers_dark));
    writeln!(out, "active theme: {effective}")?;
    if settings.mode == ThemeMode::Auto && settings.auto_type == AutoType::Daylight {
        let next = next_daylight_boundary(services.clock.now());
        writeln!(out, "next change:  {}", next.format("%H:%M"))?;
    }
    Ok(())
}

fn settings<S: KeyValueStore>(
    state: &mut AppState<S>,
    out: &mut dyn Write,
    args: SettingsArgs,
) -> anyhow::Result<()> {
    if let Some(mode) = args.expansion_mode {
        state.set_expansion_mode(mode);
    }
    if let Some(mode) = args.start_up {
        state.set_start_up_mode(mode);
    }
    if let Some(enabled) = args.notifications {
        state.set_notifications_enabled(enabled);
    }
    if let Some(frequency) = args.frequency {
        state.set_reminder_frequency(frequency);
    }

    let notifications = state.notification_settings();
    writeln!(out, "expansion mode: {}", state.expansion().mode())?;
    writeln!(out, "start-up view:  {}", state.start_up_mode())?;
    writeln!(
        out,
        "reminders:      {} ({})",
        if notifications.enabled { "on" } else { "off" },
        notifications.frequency
    )?;
    Ok(())
}

/// Prints a reminder report. `verbose` also reports quiet outcomes.
fn print_reminder(out: &mut dyn Write, report: &ReminderReport, verbose: bool) -> anyhow::Result<()> {
    if let Some(notice) = &report.notice {
        writeln!(out, "{notice}")?;
        return Ok(());
    }
    match &report.outcome {
        ReminderOutcome::Sent(reminder) => {
            writeln!(out, "Reminder sent for `{}`.", reminder.topic_id)?
        }
        ReminderOutcome::Disabled if verbose => writeln!(
            out,
            "Study reminders are off. Enable them with `vertex settings --notifications on`."
        )?,
        ReminderOutcome::NotDue { remaining_ms } if verbose => {
            let minutes = (remaining_ms + 59_999) / 60_000;
            writeln!(out, "Next reminder due in about {minutes} min.")?
        }
        _ => {}
    }
    Ok(())
}

fn watch<S: KeyValueStore>(
    state: &mut AppState<S>,
    services: &mut Services<'_>,
    out: &mut dyn Write,
    ticks: Option<u32>,
    prefers_dark: bool,
) -> anyhow::Result<()> {
    let mut schedule = TickSchedule::new(Instant::now());
    let mut active = state.effective_theme(theme_environment(services.clock, prefers_dark));
    writeln!(out, "active theme: {active}")?;
    info!("event=watch_loop module=cli status=start ticks={ticks:?}");

    let mut handled = 0u32;
    while ticks.map_or(true, |limit| handled < limit) {
        let deadline = schedule.next_deadline();
        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }

        for event in schedule.due(Instant::now()) {
            match event {
                TickEvent::ThemeRefresh => {
                    let next =
                        state.effective_theme(theme_environment(services.clock, prefers_dark));
                    if next != active {
                        writeln!(out, "active theme: {active} -> {next}")?;
                        active = next;
                    }
                }
                TickEvent::ReminderCheck => {
                    let report = state.check_reminder(
                        services.notifier,
                        services.clock.now_ms(),
                        &mut *services.rng,
                    );
                    print_reminder(out, &report, false)?;
                }
            }
        }
        state.poll_scroll(Instant::now());
        out.flush()?;
        handled += 1;
    }

    state.flush_scroll();
    info!("event=watch_loop module=cli status=ok handled={handled}");
    Ok(())
}
