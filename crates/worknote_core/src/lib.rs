//! Core domain logic for WorkNote.
//! This crate owns the note collection, its persistence and its derived views.

pub mod config;
pub mod logging;
pub mod model;
pub mod storage;
pub mod store;

pub use config::{ConfigError, LogSettings, StoreConfig};
pub use logging::{active_log_settings, init_logging, LoggingError};
pub use model::note::{
    AccentColor, Note, NoteId, NoteStatus, NoteValidationError, DEFAULT_NOTE_TITLE,
};
pub use storage::{
    JsonFileStorage, MemoryStorage, NoteStorage, ReadFailure, StorageError, StorageResult,
};
pub use store::{
    Clock, ManualClock, NoteEdit, NoteStore, SortOrder, StoreError, StoreResult, SystemClock,
    ViewQuery,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
