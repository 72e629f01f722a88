//! Persistence adapter for the note collection.
//!
//! # Responsibility
//! - Read and write the whole note collection as one document.
//! - Keep file format and I/O details out of the note store.
//!
//! # Invariants
//! - A missing document is an empty collection, not an error.
//! - Malformed documents are reported, never silently dropped.
//! - A failed save leaves the previously persisted document intact.
//! - Storage knows nothing about filtering or sorting.

use crate::model::note::{Note, NoteValidationError};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

mod json_file;
mod memory;

pub use json_file::{JsonFileStorage, DEFAULT_DOCUMENT_FILE_NAME};
pub use memory::MemoryStorage;

pub type StorageResult<T> = Result<T, StorageError>;

/// Why a document could not be read.
#[derive(Debug)]
pub enum ReadFailure {
    /// The medium refused the read (other than "not found").
    Io(io::Error),
    /// Content is not a valid note document.
    Malformed(serde_json::Error),
    /// Content decoded but violates note invariants.
    Invalid(NoteValidationError),
}

impl Display for ReadFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Malformed(err) => write!(f, "malformed document: {err}"),
            Self::Invalid(err) => write!(f, "invalid note record: {err}"),
        }
    }
}

impl Error for ReadFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Malformed(err) => Some(err),
            Self::Invalid(err) => Some(err),
        }
    }
}

/// Storage-layer error for loading and saving the note document.
#[derive(Debug)]
pub enum StorageError {
    /// Persisted document could not be read or decoded.
    Read { path: PathBuf, source: ReadFailure },
    /// Medium rejected the write (no space, permission denied, ...).
    Write { path: PathBuf, source: io::Error },
}

impl StorageError {
    /// Returns whether this error came from a load.
    pub fn is_read(&self) -> bool {
        matches!(self, Self::Read { .. })
    }

    /// Returns whether this error came from a save.
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Write { .. })
    }

    /// Document path the failed operation targeted.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Read { path, .. } | Self::Write { path, .. } => path,
        }
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to load notes from `{}`: {source}", path.display())
            }
            Self::Write { path, source } => {
                write!(f, "failed to save notes to `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Write { source, .. } => Some(source),
        }
    }
}

/// Persistence contract used by the note store.
///
/// Implementations own one document and always read/write it whole.
pub trait NoteStorage {
    /// Loads every persisted note in stored order.
    fn load(&self) -> StorageResult<Vec<Note>>;
    /// Replaces the persisted document with `notes`.
    fn save(&mut self, notes: &[Note]) -> StorageResult<()>;
}

impl<S: NoteStorage + ?Sized> NoteStorage for Box<S> {
    fn load(&self) -> StorageResult<Vec<Note>> {
        (**self).load()
    }

    fn save(&mut self, notes: &[Note]) -> StorageResult<()> {
        (**self).save(notes)
    }
}

/// Decodes a note document and validates every record.
pub(crate) fn decode_document(bytes: &[u8]) -> Result<Vec<Note>, ReadFailure> {
    let notes: Vec<Note> = serde_json::from_slice(bytes).map_err(ReadFailure::Malformed)?;
    let mut seen = HashSet::with_capacity(notes.len());
    for note in &notes {
        note.validate().map_err(ReadFailure::Invalid)?;
        if !seen.insert(note.id) {
            return Err(ReadFailure::Invalid(NoteValidationError::DuplicateId {
                id: note.id,
            }));
        }
    }
    Ok(notes)
}

/// Encodes a note document.
pub(crate) fn encode_document(notes: &[Note]) -> io::Result<Vec<u8>> {
    serde_json::to_vec_pretty(notes).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

#[cfg(test)]
mod tests {
    use super::{decode_document, encode_document, ReadFailure};
    use crate::model::note::{AccentColor, Note, NoteStatus};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn decode_accepts_records_without_newer_fields() {
        let raw = br#"[{
            "id": "6f1c2b1e-3a4d-4c5e-8f90-1a2b3c4d5e6f",
            "title": "Shopping",
            "body": "milk eggs",
            "createdAt": "2025-12-29T09:00:00Z",
            "updatedAt": "2025-12-29T09:30:00Z",
            "isFavorite": true
        }]"#;
        let notes = decode_document(raw).expect("legacy document should decode");
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].usage_count, 0);
        assert_eq!(notes[0].status, NoteStatus::Draft);
        assert_eq!(notes[0].accent_color, AccentColor::Black);
        assert!(notes[0].is_favorite);
    }

    #[test]
    fn decode_rejects_unparseable_timestamp() {
        let raw = br#"[{
            "id": "6f1c2b1e-3a4d-4c5e-8f90-1a2b3c4d5e6f",
            "title": "t", "body": "b",
            "createdAt": "yesterday",
            "updatedAt": "2025-12-29T09:30:00Z",
            "isFavorite": false
        }]"#;
        let err = decode_document(raw).expect_err("bad timestamp must fail");
        assert!(matches!(err, ReadFailure::Malformed(_)));
    }

    #[test]
    fn decode_rejects_negative_status() {
        let raw = br#"[{
            "id": "6f1c2b1e-3a4d-4c5e-8f90-1a2b3c4d5e6f",
            "title": "t", "body": "b",
            "createdAt": "2025-12-29T09:00:00Z",
            "updatedAt": "2025-12-29T09:30:00Z",
            "isFavorite": false,
            "status": -1
        }]"#;
        assert!(matches!(
            decode_document(raw),
            Err(ReadFailure::Malformed(_))
        ));
    }

    #[test]
    fn decode_rejects_duplicate_ids() {
        let now = Utc.with_ymd_and_hms(2025, 12, 29, 9, 0, 0).unwrap();
        let note = Note::new(now);
        let bytes = encode_document(&[note.clone(), note]).unwrap();
        assert!(matches!(
            decode_document(&bytes),
            Err(ReadFailure::Invalid(_))
        ));
    }

    #[test]
    fn decode_rejects_records_updated_before_created() {
        let now = Utc.with_ymd_and_hms(2025, 12, 29, 9, 0, 0).unwrap();
        let mut note = Note::new(now);
        note.updated_at = now - Duration::minutes(1);
        let bytes = encode_document(&[note]).unwrap();
        assert!(matches!(
            decode_document(&bytes),
            Err(ReadFailure::Invalid(_))
        ));
    }
}
