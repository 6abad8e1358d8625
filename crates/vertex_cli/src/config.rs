//! Runtime paths and log level resolved from flags, environment and
//! platform defaults.

use crate::cli::Cli;
use crate::error::UserError;
use anyhow::Context;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "vertex";
const DB_FILE_NAME: &str = "vertex.sqlite3";
const LOG_DIR_NAME: &str = "logs";
const DEFAULT_SYLLABUS_FILE: &str = "roadmap.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub syllabus_path: PathBuf,
    pub log_level: String,
}

impl Config {
    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let data_dir = match &cli.data_dir {
            Some(dir) => absolutize(dir)?,
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or_else(|| {
                    UserError::new(
                        "no platform data directory; pass --data-dir or set VERTEX_DATA_DIR",
                    )
                })?,
        };
        let syllabus_path = match &cli.syllabus {
            Some(path) => absolutize(path)?,
            None => data_dir.join(DEFAULT_SYLLABUS_FILE),
        };
        let log_level = cli
            .log_level
            .clone()
            .unwrap_or_else(|| vertex_core::default_log_level().to_string());

        Ok(Self {
            data_dir,
            syllabus_path,
            log_level,
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }
}

fn absolutize(path: &Path) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    Ok(cwd.join(path))
}
