//! `vertex` command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration, start logging, open the store and load the
//!   syllabus before handing one command to `commands::dispatch`.
//! - Turn load failures into the "data unavailable" screen, report user
//!   input errors verbatim, and replace every other failure (including
//!   panics) with a generic failure screen.

use anyhow::Context;
use clap::Parser;
use log::{error, info};
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::process::ExitCode;
use vertex_core::{
    load_syllabus_with_retry, AppState, FileSource, LoadState, SqliteKvStore, SystemClock,
};

mod cli;
mod commands;
mod config;
mod error;
mod notifier;
mod render;

const EXIT_UNAVAILABLE: u8 = 2;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    match panic::catch_unwind(AssertUnwindSafe(|| run(cli))) {
        Ok(Ok(code)) => code,
        Ok(Err(err)) => report_error(&err, &mut std::io::stderr()),
        Err(_) => {
            let _ = render::failure(&mut std::io::stderr());
            ExitCode::FAILURE
        }
    }
}

fn report_error(err: &anyhow::Error, out: &mut dyn Write) -> ExitCode {
    if error::is_user_error(err) {
        info!("event=command module=cli status=rejected reason={err:#}");
        let _ = writeln!(out, "vertex: {err:#}");
    } else {
        error!("event=command module=cli status=error error={err:#}");
        let _ = render::failure(out);
    }
    ExitCode::FAILURE
}

fn run(cli: cli::Cli) -> anyhow::Result<ExitCode> {
    let config = config::Config::resolve(&cli)?;
    if let Err(err) = vertex_core::init_logging(&config.log_level, config.log_dir()) {
        eprintln!("vertex warning: file logging disabled: {err}");
    }

    let conn = vertex_core::db::open_db(config.db_path())
        .with_context(|| format!("failed to open database {}", config.db_path().display()))?;
    let store = SqliteKvStore::try_new(&conn).context("failed to prepare key-value store")?;

    let source = FileSource::new(&config.syllabus_path);
    let syllabus = match load_syllabus_with_retry(&source, cli.retries) {
        LoadState::Ready(syllabus) => syllabus,
        LoadState::Unavailable { location, reason } => {
            render::unavailable(&mut std::io::stdout(), &location, &reason)?;
            return Ok(ExitCode::from(EXIT_UNAVAILABLE));
        }
    };

    let mut state = AppState::load(store, syllabus);
    let notifier = notifier::TerminalNotifier::detect();
    let clock = SystemClock;
    let mut rng = rand::rng();
    let mut services = commands::Services {
        notifier: &notifier,
        clock: &clock,
        rng: &mut rng,
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::dispatch(cli.command, &mut state, &mut services, &mut out)?;
    state.flush_scroll();
    info!("event=command module=cli status=ok");
    Ok(ExitCode::SUCCESS)
}
