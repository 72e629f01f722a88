//! Note store: canonical collection, command surface and derived view.
//!
//! # Responsibility
//! - Own the canonical note collection in insertion order.
//! - Persist the whole collection after every mutation.
//! - Recompute the derived view after every state change, then notify.
//!
//! # Invariants
//! - Only the store mutates the canonical collection and writes storage.
//! - View-state setters never touch storage.
//! - Persistence failures are recorded in `last_error`; the in-memory
//!   mutation is kept and the store stays usable.
//! - `NotFound` results have no side effects.

use super::clock::{Clock, SystemClock};
use super::view::{derive_view, SortOrder, ViewQuery};
use crate::config::StoreConfig;
use crate::model::note::{AccentColor, Note, NoteId, NoteStatus};
use crate::storage::{JsonFileStorage, NoteStorage, StorageError};
use log::{debug, error, info};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Error returned synchronously by store commands.
#[derive(Debug)]
pub enum StoreError {
    /// Command referenced a note id that is not in the collection.
    NotFound(NoteId),
    /// Persistence-layer failure.
    Storage(StorageError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Field changes submitted by a note editor.
///
/// `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteEdit {
    pub title: Option<String>,
    pub body: Option<String>,
    pub status: Option<NoteStatus>,
    pub accent_color: Option<AccentColor>,
}

impl NoteEdit {
    fn apply(self, note: &mut Note) {
        if let Some(title) = self.title {
            note.title = title;
        }
        if let Some(body) = self.body {
            note.body = body;
        }
        if let Some(status) = self.status {
            note.status = status;
        }
        if let Some(accent_color) = self.accent_color {
            note.accent_color = accent_color;
        }
    }
}

type ViewObserver = Box<dyn FnMut(&[&Note]) + Send>;

/// Single-writer note store.
pub struct NoteStore<S: NoteStorage, C: Clock = SystemClock> {
    storage: S,
    clock: C,
    notes: Vec<Note>,
    query: ViewQuery,
    view: Vec<usize>,
    is_loading: bool,
    last_error: Option<StorageError>,
    revision: u64,
    observer: Option<ViewObserver>,
}

impl NoteStore<JsonFileStorage, SystemClock> {
    /// Opens the JSON document described by `config`.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::open(JsonFileStorage::new(config.document_path.clone()))
    }
}

impl<S: NoteStorage> NoteStore<S, SystemClock> {
    /// Creates a store over `storage` and loads it immediately.
    pub fn open(storage: S) -> Self {
        Self::with_clock(storage, SystemClock)
    }
}

impl<S: NoteStorage, C: Clock> NoteStore<S, C> {
    /// Creates a store with an explicit time source and loads it immediately.
    ///
    /// A read failure leaves an empty collection and populates `last_error`.
    pub fn with_clock(storage: S, clock: C) -> Self {
        let mut store = Self {
            storage,
            clock,
            notes: Vec::new(),
            query: ViewQuery::default(),
            view: Vec::new(),
            is_loading: false,
            last_error: None,
            revision: 0,
            observer: None,
        };
        store.reload();
        store
    }

    /// Re-reads the persisted document, replacing the canonical collection.
    pub fn reload(&mut self) {
        self.is_loading = true;
        self.last_error = None;

        match self.storage.load() {
            Ok(notes) => {
                info!(
                    "event=store_load module=store status=ok notes={}",
                    notes.len()
                );
                self.notes = notes;
            }
            Err(err) => {
                error!(
                    "event=store_load module=store status=error fallback=empty error={}",
                    err
                );
                self.notes.clear();
                self.last_error = Some(err);
            }
        }

        self.is_loading = false;
        self.refresh_view();
    }

    /// Appends a new default note, persists and returns it.
    ///
    /// A persistence failure is recorded in `last_error`; the note stays in
    /// memory.
    pub fn create(&mut self) -> Note {
        self.create_with(NoteEdit::default())
    }

    /// Appends a new note with `initial` fields applied, in a single write.
    ///
    /// Initial content is not an edit: `usage_count` starts at zero.
    pub fn create_with(&mut self, initial: NoteEdit) -> Note {
        let mut note = Note::new(self.clock.now());
        initial.apply(&mut note);
        self.notes.push(note.clone());
        info!(
            "event=note_create module=store status=ok note_id={}",
            note.id
        );
        self.commit();
        note
    }

    /// Replaces the stored note with the same id and stamps `updated_at`.
    ///
    /// `id` and `created_at` stay as stored; `usage_count` never decreases.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when `note.id` is absent. Nothing changes.
    pub fn update(&mut self, note: Note) -> StoreResult<Note> {
        let now = self.clock.now();
        let index = self.index_of(note.id)?;
        let current = &mut self.notes[index];
        let created_at = current.created_at;
        let usage_count = current.usage_count.max(note.usage_count);
        *current = Note {
            created_at,
            usage_count,
            ..note
        };
        current.touch(now);
        let updated = current.clone();
        info!(
            "event=note_update module=store status=ok note_id={}",
            updated.id
        );
        self.commit();
        Ok(updated)
    }

    /// Removes the note with `id`. Returns whether a note was removed.
    ///
    /// An absent id is a no-op: no error and no write.
    pub fn delete(&mut self, id: NoteId) -> bool {
        let Some(index) = self.notes.iter().position(|note| note.id == id) else {
            debug!("event=note_delete module=store status=noop note_id={id}");
            return false;
        };
        self.notes.remove(index);
        info!("event=note_delete module=store status=ok note_id={id}");
        self.commit();
        true
    }

    /// Deletes the notes shown at `positions` of the current derived view.
    ///
    /// Out-of-range positions are ignored. Writes once for the whole batch
    /// and returns how many notes were removed.
    pub fn delete_at(&mut self, positions: &[usize]) -> usize {
        let doomed: HashSet<NoteId> = positions
            .iter()
            .filter_map(|&position| self.view.get(position))
            .map(|&index| self.notes[index].id)
            .collect();
        if doomed.is_empty() {
            return 0;
        }

        let before = self.notes.len();
        self.notes.retain(|note| !doomed.contains(&note.id));
        let removed = before - self.notes.len();
        info!("event=note_delete_batch module=store status=ok removed={removed}");
        self.commit();
        removed
    }

    /// Flips `is_favorite`.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when `id` is absent.
    pub fn toggle_favorite(&mut self, id: NoteId) -> StoreResult<Note> {
        self.mutate(id, "note_toggle_favorite", |note| {
            note.is_favorite = !note.is_favorite;
        })
    }

    /// Applies editor changes and counts the edit as a use.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when `id` is absent.
    pub fn edit(&mut self, id: NoteId, edit: NoteEdit) -> StoreResult<Note> {
        self.mutate(id, "note_edit", |note| {
            edit.apply(note);
            note.usage_count = note.usage_count.saturating_add(1);
        })
    }

    /// Counts one view of the note.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when `id` is absent.
    pub fn record_view(&mut self, id: NoteId) -> StoreResult<Note> {
        self.mutate(id, "note_view", |note| {
            note.usage_count = note.usage_count.saturating_add(1);
        })
    }

    /// Moves the note to another lifecycle stage.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when `id` is absent.
    pub fn set_status(&mut self, id: NoteId, status: NoteStatus) -> StoreResult<Note> {
        self.mutate(id, "note_set_status", |note| note.status = status)
    }

    /// Changes the note's accent color.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when `id` is absent.
    pub fn set_accent_color(&mut self, id: NoteId, color: AccentColor) -> StoreResult<Note> {
        self.mutate(id, "note_set_accent_color", |note| note.accent_color = color)
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.query.search_text = text.into();
        self.refresh_view();
    }

    pub fn set_favorites_only(&mut self, favorites_only: bool) {
        self.query.favorites_only = favorites_only;
        self.refresh_view();
    }

    pub fn set_sort_order(&mut self, sort_order: SortOrder) {
        self.query.sort_order = sort_order;
        self.refresh_view();
    }

    /// Filtered and sorted notes, as of the last state change.
    pub fn derived_view(&self) -> Vec<&Note> {
        self.view.iter().map(|&index| &self.notes[index]).collect()
    }

    /// Canonical collection in insertion order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn search_text(&self) -> &str {
        &self.query.search_text
    }

    pub fn favorites_only(&self) -> bool {
        self.query.favorites_only
    }

    pub fn sort_order(&self) -> SortOrder {
        self.query.sort_order
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Most recent persistence failure, until cleared or reloaded.
    pub fn last_error(&self) -> Option<&StorageError> {
        self.last_error.as_ref()
    }

    /// Dismisses the recorded persistence failure.
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Counter bumped on every derived-view recompute.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Registers a callback invoked with the fresh view after each recompute.
    pub fn set_observer(&mut self, observer: impl FnMut(&[&Note]) + Send + 'static) {
        self.observer = Some(Box::new(observer));
    }

    fn index_of(&self, id: NoteId) -> StoreResult<usize> {
        self.notes
            .iter()
            .position(|note| note.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    fn mutate(
        &mut self,
        id: NoteId,
        event: &'static str,
        change: impl FnOnce(&mut Note),
    ) -> StoreResult<Note> {
        let now = self.clock.now();
        let index = self.index_of(id)?;
        let note = &mut self.notes[index];
        change(note);
        note.touch(now);
        let updated = note.clone();
        info!("event={event} module=store status=ok note_id={id}");
        self.commit();
        Ok(updated)
    }

    fn commit(&mut self) {
        self.persist();
        self.refresh_view();
    }

    fn persist(&mut self) {
        if let Err(err) = self.storage.save(&self.notes) {
            error!(
                "event=store_persist module=store status=error notes={} retained=true error={}",
                self.notes.len(),
                err
            );
            self.last_error = Some(err);
        }
    }

    fn refresh_view(&mut self) {
        self.view = derive_view(&self.notes, &self.query);
        self.revision += 1;
        if let Some(observer) = self.observer.as_mut() {
            let view: Vec<&Note> = self.view.iter().map(|&index| &self.notes[index]).collect();
            observer(&view);
        }
    }
}
