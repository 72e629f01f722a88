//! In-process storage backend.
//!
//! Used by collaborators that want a store without a disk and by tests that
//! need to inject read/write failures. Clones share the same document.

use super::{NoteStorage, ReadFailure, StorageError, StorageResult};
use crate::model::note::Note;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

const MEMORY_PATH: &str = ":memory:";

#[derive(Debug, Default)]
struct MemoryState {
    notes: Vec<Note>,
    save_count: usize,
    fail_reads: bool,
    fail_writes: bool,
}

/// Shared in-memory note document.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStorage {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a document pre-populated with `notes`.
    pub fn with_notes(notes: Vec<Note>) -> Self {
        let storage = Self::default();
        storage.lock().notes = notes;
        storage
    }

    /// Makes subsequent loads fail (or succeed again).
    pub fn set_fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    /// Makes subsequent saves fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Snapshot of the last successfully saved document.
    pub fn persisted(&self) -> Vec<Note> {
        self.lock().notes.clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.lock().save_count
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl NoteStorage for MemoryStorage {
    fn load(&self) -> StorageResult<Vec<Note>> {
        let state = self.lock();
        if state.fail_reads {
            return Err(StorageError::Read {
                path: PathBuf::from(MEMORY_PATH),
                source: ReadFailure::Io(io::Error::new(
                    io::ErrorKind::Other,
                    "simulated read failure",
                )),
            });
        }
        Ok(state.notes.clone())
    }

    fn save(&mut self, notes: &[Note]) -> StorageResult<()> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(StorageError::Write {
                path: PathBuf::from(MEMORY_PATH),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "simulated write failure"),
            });
        }
        state.notes = notes.to_vec();
        state.save_count += 1;
        Ok(())
    }
}
