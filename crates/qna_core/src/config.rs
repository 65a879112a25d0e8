//! Runtime configuration for hosts embedding the core.
//!
//! # Responsibility
//! - Resolve database location and logging settings from the environment.
//!
//! # Invariants
//! - Blank environment values fall back to defaults.
//! - `log_level` is always a normalized level accepted by `init_logging`.

use crate::logging::{default_log_level, normalize_level, LoggingError};
use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable overriding the database file path.
pub const ENV_DB_PATH: &str = "QNA_DB_PATH";
/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "QNA_LOG_LEVEL";
/// Environment variable enabling file logging into a directory.
pub const ENV_LOG_DIR: &str = "QNA_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "qna.sqlite3";

/// Core settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Loads configuration from `QNA_*` environment variables.
    ///
    /// # Errors
    /// Returns `LoggingError::UnsupportedLevel` for an unknown `QNA_LOG_LEVEL`.
    pub fn from_env() -> Result<Self, LoggingError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LoggingError> {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = non_blank(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = non_blank(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        config.log_dir = non_blank(ENV_LOG_DIR).map(PathBuf::from);

        config.normalized()
    }

    /// Returns a copy with `log_level` normalized.
    ///
    /// Needed after deserializing, where the level is taken verbatim.
    pub fn normalized(mut self) -> Result<Self, LoggingError> {
        self.log_level = normalize_level(&self.log_level)?.to_string();
        Ok(self)
    }
}
