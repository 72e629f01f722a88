use chrono::{TimeZone, Utc};
use std::fs;
use worknote_core::{
    JsonFileStorage, ManualClock, MemoryStorage, NoteStorage, NoteStore, ReadFailure,
    StorageError,
};

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2025, 12, 29, 9, 0, 0).unwrap())
}

#[test]
fn malformed_document_degrades_to_empty_store_then_recovers_on_create() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.json");
    fs::write(&path, "[{\"id\": 12, \"title\": ").unwrap();

    let mut store = NoteStore::with_clock(JsonFileStorage::new(&path), clock());
    assert!(store.is_empty());
    assert!(store.derived_view().is_empty());
    assert!(matches!(
        store.last_error(),
        Some(StorageError::Read {
            source: ReadFailure::Malformed(_),
            ..
        })
    ));

    let created = store.create();
    assert_eq!(store.len(), 1);

    let reloaded = JsonFileStorage::new(&path)
        .load()
        .expect("create should overwrite the malformed file with a valid one");
    assert_eq!(reloaded, vec![created]);
}

#[test]
fn write_failure_keeps_in_memory_mutation_and_reports_error() {
    let storage = MemoryStorage::new();
    let mut store = NoteStore::with_clock(storage.clone(), clock());
    storage.set_fail_writes(true);

    let note = store.create();
    assert_eq!(store.len(), 1);
    assert_eq!(store.derived_view()[0].id, note.id);
    assert!(store.last_error().is_some_and(StorageError::is_write));
    assert!(storage.persisted().is_empty());

    // Store remains usable; the next successful write catches the document up.
    storage.set_fail_writes(false);
    let favored = store.toggle_favorite(note.id).unwrap();
    assert_eq!(storage.persisted(), vec![favored]);
    // Error stays until the collaborator dismisses it.
    assert!(store.last_error().is_some());
    store.clear_error();
    assert!(store.last_error().is_none());
}

#[test]
fn not_found_does_not_touch_error_state() {
    let storage = MemoryStorage::new();
    let mut store = NoteStore::with_clock(storage, clock());

    assert!(store.toggle_favorite(uuid::Uuid::new_v4()).is_err());
    assert!(store.last_error().is_none());
}

#[test]
fn reload_failure_clears_collection_and_records_error() {
    let storage = MemoryStorage::new();
    let mut store = NoteStore::with_clock(storage.clone(), clock());
    store.create();
    storage.set_fail_reads(true);

    store.reload();
    assert!(store.is_empty());
    assert!(store.last_error().is_some_and(StorageError::is_read));
    assert!(!store.is_loading());

    storage.set_fail_reads(false);
    store.reload();
    assert_eq!(store.len(), 1);
    assert!(store.last_error().is_none());
}
