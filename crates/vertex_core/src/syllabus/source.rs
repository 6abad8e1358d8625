//! Syllabus resource fetching and load-state tracking.
//!
//! # Responsibility
//! - Fetch the static roadmap document once at startup.
//! - Turn fetch/parse failures into a distinct "data unavailable" state
//!   that callers can retry, instead of an error that ends the session.
//!
//! # Invariants
//! - No partial or cached syllabus is ever substituted for a failed load.

use super::{Syllabus, SyllabusError, SyllabusResult};
use log::{error, info};
use std::path::PathBuf;
use std::time::Instant;

/// Where a syllabus document comes from.
pub trait SyllabusSource {
    /// Human-readable location for logs and error screens.
    fn location(&self) -> String;
    /// Reads the raw document text.
    fn fetch(&self) -> SyllabusResult<String>;
}

/// Syllabus stored as a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SyllabusSource for FileSource {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> SyllabusResult<String> {
        std::fs::read_to_string(&self.path).map_err(|source| SyllabusError::Fetch {
            location: self.location(),
            source,
        })
    }
}

/// Syllabus embedded as a string, mostly for tests and demos.
#[derive(Debug, Clone)]
pub struct StaticSource(pub String);

impl SyllabusSource for StaticSource {
    fn location(&self) -> String {
        "<static>".to_string()
    }

    fn fetch(&self) -> SyllabusResult<String> {
        Ok(self.0.clone())
    }
}

/// Outcome of one load attempt.
#[derive(Debug)]
pub enum LoadState {
    Ready(Syllabus),
    /// Shown as the "data unavailable" screen with a retry action.
    Unavailable { location: String, reason: String },
}

impl LoadState {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn into_syllabus(self) -> Option<Syllabus> {
        match self {
            Self::Ready(syllabus) => Some(syllabus),
            Self::Unavailable { .. } => None,
        }
    }
}

/// Fetches and indexes the syllabus, never failing hard.
pub fn load_syllabus(source: &dyn SyllabusSource) -> LoadState {
    let started_at = Instant::now();
    let location = source.location();
    info!("event=syllabus_load module=syllabus status=start location={location}");

    match source.fetch().and_then(|raw| Syllabus::from_json_str(&raw)) {
        Ok(syllabus) => {
            info!(
                "event=syllabus_load module=syllabus status=ok topics={} duration_ms={}",
                syllabus.len(),
                started_at.elapsed().as_millis()
            );
            LoadState::Ready(syllabus)
        }
        Err(err) => {
            error!(
                "event=syllabus_load module=syllabus status=error location={location} duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            LoadState::Unavailable {
                location,
                reason: err.to_string(),
            }
        }
    }
}

/// Loads with up to `retries` extra attempts after the first failure.
pub fn load_syllabus_with_retry(source: &dyn SyllabusSource, retries: u32) -> LoadState {
    let mut state = load_syllabus(source);
    let mut attempt = 0;
    while !state.is_ready() && attempt < retries {
        attempt += 1;
        info!("event=syllabus_retry module=syllabus status=start attempt={attempt}");
        state = load_syllabus(source);
    }
    state
}
