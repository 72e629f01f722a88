//! JSON file backend for the note document.
//!
//! # Responsibility
//! - Read the note document from one file on disk.
//! - Replace that file atomically on every save.
//!
//! # Invariants
//! - Saves go to a temporary sibling file which is synced and then renamed
//!   over the target, so readers only ever see a complete document.
//! - Note titles and bodies are never written to logs.

use super::{decode_document, encode_document, NoteStorage, ReadFailure, StorageError, StorageResult};
use crate::model::note::Note;
use log::{error, info};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;

/// Default file name of the note document.
pub const DEFAULT_DOCUMENT_FILE_NAME: &str = "notes.json";

/// File-backed note storage.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
    #[cfg(test)]
    fail_before_rename: bool,
}

impl JsonFileStorage {
    /// Creates a storage bound to `path`. Nothing is touched on disk yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            #[cfg(test)]
            fail_before_rename: false,
        }
    }

    /// Creates a storage for `notes.json` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(DEFAULT_DOCUMENT_FILE_NAME))
    }

    /// Document path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_failure(&self, source: ReadFailure) -> StorageError {
        StorageError::Read {
            path: self.path.clone(),
            source,
        }
    }

    fn write_atomically(&self, bytes: &[u8]) -> io::Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;

        let mut temp = NamedTempFile::new_in(&parent)?;
        temp.write_all(bytes)?;
        temp.as_file().sync_all()?;
        #[cfg(test)]
        if self.fail_before_rename {
            return Err(io::Error::new(io::ErrorKind::Other, "rename refused"));
        }
        temp.persist(&self.path)?;
        sync_dir(&parent)
    }
}

/// Flushes the directory entry so the rename survives a crash.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

impl NoteStorage for JsonFileStorage {
    fn load(&self) -> StorageResult<Vec<Note>> {
        let started_at = Instant::now();
        info!("event=storage_load module=storage status=start");

        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(
                    "event=storage_load module=storage status=ok notes=0 missing=true duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                return Ok(Vec::new());
            }
            Err(err) => {
                error!(
                    "event=storage_load module=storage status=error duration_ms={} error_code=read_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(self.read_failure(ReadFailure::Io(err)));
            }
        };

        match decode_document(&bytes) {
            Ok(notes) => {
                info!(
                    "event=storage_load module=storage status=ok notes={} duration_ms={}",
                    notes.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(notes)
            }
            Err(failure) => {
                error!(
                    "event=storage_load module=storage status=error duration_ms={} error_code=malformed_document error={}",
                    started_at.elapsed().as_millis(),
                    failure
                );
                Err(self.read_failure(failure))
            }
        }
    }

    fn save(&mut self, notes: &[Note]) -> StorageResult<()> {
        let started_at = Instant::now();
        let result = encode_document(notes).and_then(|bytes| self.write_atomically(&bytes));

        match result {
            Ok(()) => {
                info!(
                    "event=storage_save module=storage status=ok notes={} duration_ms={}",
                    notes.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=storage_save module=storage status=error notes={} duration_ms={} error_code=write_failed error={}",
                    notes.len(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(StorageError::Write {
                    path: self.path.clone(),
                    source: err,
                })
            }
        }
    }
}
