//! Note domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by the note store.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod note;
