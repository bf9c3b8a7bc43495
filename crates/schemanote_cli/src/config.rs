//! Shell configuration.
//!
//! # Responsibility
//! - Resolve database path and logging settings for one invocation.
//!
//! # Invariants
//! - Precedence is always: command-line flag, environment variable, default.
//! - Blank values count as unset at every layer.

use schemanote_core::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "SCHEMANOTE_DB_PATH";
pub const LOG_DIR_ENV: &str = "SCHEMANOTE_LOG_DIR";
pub const LOG_LEVEL_ENV: &str = "SCHEMANOTE_LOG_LEVEL";

const DEFAULT_DB_FILE_NAME: &str = "schemanote.sqlite3";

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub db: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub db_path: PathBuf,
    /// `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Settings {
    /// Resolves settings from the process environment.
    pub fn from_env(overrides: Overrides) -> Self {
        Self::resolve(overrides, |key| std::env::var(key).ok())
    }

    /// Resolves settings with `env` standing in for environment lookup.
    pub fn resolve(overrides: Overrides, env: impl Fn(&str) -> Option<String>) -> Self {
        let env = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        let db_path = non_empty_path(overrides.db)
            .or_else(|| env(DB_PATH_ENV).map(PathBuf::from))
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));
        let log_dir =
            non_empty_path(overrides.log_dir).or_else(|| env(LOG_DIR_ENV).map(PathBuf::from));
        let log_level = overrides
            .log_level
            .filter(|level| !level.trim().is_empty())
            .or_else(|| env(LOG_LEVEL_ENV))
            .unwrap_or_else(|| default_log_level().to_string());

        Self {
            db_path,
            log_dir,
            log_level,
        }
    }
}

fn non_empty_path(path: Option<PathBuf>) -> Option<PathBuf> {
    path.filter(|path| !path.as_os_str().is_empty())
}
