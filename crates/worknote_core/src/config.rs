//! Runtime configuration for the note store.
//!
//! # Responsibility
//! - Resolve where the note document lives and how logging is set up.
//! - Validate log settings before anything touches the logger.
//!
//! # Invariants
//! - Blank environment values are treated as unset.
//! - A `LogSettings` always carries an absolute directory.

use crate::storage::DEFAULT_DOCUMENT_FILE_NAME;
use log::LevelFilter;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Overrides the note document path.
pub const ENV_DOCUMENT_PATH: &str = "WORKNOTE_DOCUMENT_PATH";
/// Overrides the log level (`off|error|warn|info|debug|trace`).
pub const ENV_LOG_LEVEL: &str = "WORKNOTE_LOG_LEVEL";
/// Enables file logging into this absolute directory.
pub const ENV_LOG_DIR: &str = "WORKNOTE_LOG_DIR";

const DEFAULT_DATA_DIR_NAME: &str = "worknote";

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(String),
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(raw) => write!(
                f,
                "unsupported log level `{raw}`; expected off|error|warn|info|debug|trace"
            ),
            Self::RelativeLogDir(dir) => {
                write!(f, "log directory must be absolute, got `{}`", dir.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validated file-logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    level: LevelFilter,
    dir: PathBuf,
}

impl LogSettings {
    /// Parses `level` and checks that `dir` is absolute.
    pub fn new(level: &str, dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Self::with_level(parse_log_level(level)?, dir)
    }

    pub fn with_level(level: LevelFilter, dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let dir = dir.into();
        if !dir.is_absolute() {
            return Err(ConfigError::RelativeLogDir(dir));
        }
        Ok(Self { level, dir })
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Resolved store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// JSON document holding every note.
    pub document_path: PathBuf,
    /// File logging; `None` leaves it off.
    pub logging: Option<LogSettings>,
}

impl StoreConfig {
    /// Config for a document at `document_path` with logging off.
    pub fn new(document_path: impl Into<PathBuf>) -> Self {
        Self {
            document_path: document_path.into(),
            logging: None,
        }
    }

    /// Resolves settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup`, which maps variable names to values.
    ///
    /// The level is validated even when no log directory is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let document_path = non_blank(ENV_DOCUMENT_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(default_document_path);
        let level = match non_blank(ENV_LOG_LEVEL) {
            Some(raw) => parse_log_level(&raw)?,
            None => default_log_level(),
        };
        let logging = non_blank(ENV_LOG_DIR)
            .map(|dir| LogSettings::with_level(level, dir))
            .transpose()?;

        Ok(Self {
            document_path,
            logging,
        })
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(default_document_path())
    }
}

/// `<temp_dir>/worknote/notes.json`.
pub fn default_document_path() -> PathBuf {
    std::env::temp_dir()
        .join(DEFAULT_DATA_DIR_NAME)
        .join(DEFAULT_DOCUMENT_FILE_NAME)
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Case-insensitive level name; `warning` is accepted for `warn`.
pub fn parse_log_level(raw: &str) -> Result<LevelFilter, ConfigError> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("warning") {
        return Ok(LevelFilter::Warn);
    }
    raw.parse::<LevelFilter>()
        .map_err(|_| ConfigError::InvalidLogLevel(raw.to_string()))
}
