//! Note store and query engine.
//!
//! # Responsibility
//! - Orchestrate note mutations, persistence and derived-view refresh.
//! - Keep UI collaborators decoupled from storage details.

pub mod clock;
mod note_store;
pub mod view;

pub use clock::{Clock, ManualClock, SystemClock};
pub use note_store::{NoteEdit, NoteStore, StoreError, StoreResult};
pub use view::{compare_titles, derive_view, SortOrder, ViewQuery};
