//! File logging for the note core.
//!
//! # Responsibility
//! - Start the rolling file logger described by `StoreConfig::logging`.
//! - Keep log events metadata-only: ids, counts, durations. Never note text.
//!
//! # Invariants
//! - At most one logger per process; re-init with equal settings is a no-op.
//! - Init never panics.

use crate::config::{LogSettings, StoreConfig};
use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, LogSpecification, Logger, LoggerHandle,
    Naming, WriteMode,
};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const LOG_FILE_BASENAME: &str = "worknote";
const ROTATE_AT_BYTES: u64 = 4 * 1024 * 1024;
const KEEP_ROTATED_FILES: usize = 3;
const PANIC_HEADLINE_CHARS: usize = 120;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();

struct ActiveLogger {
    settings: LogSettings,
    _handle: LoggerHandle,
}

#[derive(Debug)]
pub enum LoggingError {
    /// A logger with different settings is already running.
    Conflict {
        active: LogSettings,
        requested: LogSettings,
    },
    CreateDir {
        dir: PathBuf,
        source: std::io::Error,
    },
    Start(FlexiLoggerError),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conflict { active, requested } => write!(
                f,
                "logging already runs at {} in `{}`; refusing {} in `{}`",
                active.level(),
                active.dir().display(),
                requested.level(),
                requested.dir().display()
            ),
            Self::CreateDir { dir, source } => {
                write!(f, "cannot create log directory `{}`: {source}", dir.display())
            }
            Self::Start(err) => write!(f, "logger failed to start: {err}"),
        }
    }
}

impl std::error::Error for LoggingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Conflict { .. } => None,
            Self::CreateDir { source, .. } => Some(source),
            Self::Start(err) => Some(err),
        }
    }
}

/// Starts file logging when `config.logging` is set; otherwise does nothing.
pub fn init_logging(config: &StoreConfig) -> Result<(), LoggingError> {
    let Some(requested) = config.logging.as_ref() else {
        return Ok(());
    };

    let active = ACTIVE.get_or_try_init(|| start(requested))?;
    if &active.settings != requested {
        return Err(LoggingError::Conflict {
            active: active.settings.clone(),
            requested: requested.clone(),
        });
    }
    Ok(())
}

/// Settings of the running logger, or `None` before init.
pub fn active_log_settings() -> Option<&'static LogSettings> {
    ACTIVE.get().map(|active| &active.settings)
}

fn start(settings: &LogSettings) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(settings.dir()).map_err(|source| LoggingError::CreateDir {
        dir: settings.dir().to_path_buf(),
        source,
    })?;

    let spec = LogSpecification::builder()
        .default(settings.level())
        .build();
    let handle = Logger::with(spec)
        .log_to_file(
            FileSpec::default()
                .directory(settings.dir())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_ROTATED_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(LoggingError::Start)?;

    install_panic_logging();
    info!(
        "event=logging_init module=core status=ok version={} level={} log_dir={}",
        env!("CARGO_PKG_VERSION"),
        settings.level(),
        settings.dir().display()
    );

    Ok(ActiveLogger {
        settings: settings.clone(),
        _handle: handle,
    })
}

fn install_panic_logging() {
    static INSTALLED: OnceCell<()> = OnceCell::new();
    if INSTALLED.set(()).is_err() {
        return;
    }

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_default();
        error!(
            "event=panic module=core status=error location={} message={}",
            location,
            panic_headline(info.payload())
        );
        previous(info);
    }));
}

/// First line of a panic message, capped. Messages may quote note text.
fn panic_headline(payload: &(dyn Any + Send)) -> String {
    let text = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<opaque payload>");
    let line = text.lines().next().unwrap_or_default();

    let mut headline: String = line.chars().take(PANIC_HEADLINE_CHARS).collect();
    if headline.len() < line.len() {
        headline.push_str("...");
    }
    headline
}
