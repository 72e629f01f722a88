use chrono::{Duration, TimeZone, Utc};
use std::cmp::Ordering;
use worknote_core::store::compare_titles;
use worknote_core::{ManualClock, MemoryStorage, Note, NoteEdit, NoteId, NoteStore, SortOrder};

fn fixture() -> (NoteStore<MemoryStorage, ManualClock>, ManualClock) {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 12, 29, 9, 0, 0).unwrap());
    let store = NoteStore::with_clock(MemoryStorage::new(), clock.clone());
    (store, clock)
}

fn add(
    store: &mut NoteStore<MemoryStorage, ManualClock>,
    clock: &ManualClock,
    title: &str,
    body: &str,
) -> NoteId {
    clock.advance(Duration::seconds(10));
    let id = store.create().id;
    store
        .edit(
            id,
            NoteEdit {
                title: Some(title.to_string()),
                body: Some(body.to_string()),
                ..NoteEdit::default()
            },
        )
        .unwrap();
    id
}

fn ids(view: &[&Note]) -> Vec<NoteId> {
    view.iter().map(|note| note.id).collect()
}

#[test]
fn favorites_then_search_scenario() {
    let (mut store, clock) = fixture();
    let a = add(&mut store, &clock, "Shopping", "milk eggs");
    let b = add(&mut store, &clock, "Meeting", "timeline");

    store.toggle_favorite(a).unwrap();
    store.set_favorites_only(true);
    assert_eq!(ids(&store.derived_view()), vec![a]);

    store.set_favorites_only(false);
    store.set_search_text("time");
    assert_eq!(ids(&store.derived_view()), vec![b]);
}

#[test]
fn derived_view_is_idempotent() {
    let (mut store, clock) = fixture();
    add(&mut store, &clock, "one", "");
    add(&mut store, &clock, "two", "");
    store.set_sort_order(SortOrder::TitleDescending);

    let first = ids(&store.derived_view());
    let second = ids(&store.derived_view());
    assert_eq!(first, second);
}

#[test]
fn favorites_only_view_contains_only_favorites() {
    let (mut store, clock) = fixture();
    let mut expected = Vec::new();
    for idx in 0..6 {
        let id = add(&mut store, &clock, &format!("note {idx}"), "");
        if idx % 3 == 0 {
            store.toggle_favorite(id).unwrap();
            expected.push(id);
        }
    }

    store.set_favorites_only(true);
    let view = store.derived_view();
    assert!(view.iter().all(|note| note.is_favorite));
    assert_eq!(view.len(), expected.len());
}

#[test]
fn search_is_case_insensitive_over_title_and_body() {
    let (mut store, clock) = fixture();
    let title_hit = add(&mut store, &clock, "Quarterly REPORT", "");
    let body_hit = add(&mut store, &clock, "misc", "the report is due");
    add(&mut store, &clock, "unrelated", "nothing here");

    store.set_sort_order(SortOrder::OldestFirst);
    store.set_search_text("RePoRt");
    let view = store.derived_view();
    assert_eq!(ids(&view), vec![title_hit, body_hit]);
    for note in view {
        let needle = "report";
        assert!(
            note.title.to_lowercase().contains(needle) || note.body.to_lowercase().contains(needle)
        );
    }

    store.set_search_text("");
    assert_eq!(store.derived_view().len(), 3);
}

#[test]
fn newest_first_is_non_increasing_by_updated_at() {
    let (mut store, clock) = fixture();
    let first = add(&mut store, &clock, "first", "");
    add(&mut store, &clock, "second", "");
    add(&mut store, &clock, "third", "");
    clock.advance(Duration::minutes(5));
    store.toggle_favorite(first).unwrap();

    let view = store.derived_view();
    assert_eq!(view[0].id, first);
    assert!(view
        .windows(2)
        .all(|pair| pair[0].updated_at >= pair[1].updated_at));

    store.set_sort_order(SortOrder::OldestFirst);
    let view = store.derived_view();
    assert_eq!(view.last().map(|note| note.id), Some(first));
    assert!(view
        .windows(2)
        .all(|pair| pair[0].updated_at <= pair[1].updated_at));
}

#[test]
fn title_ascending_is_non_decreasing() {
    let (mut store, clock) = fixture();
    for title in ["pear", "Apple", "banana", "cherry", "apricot"] {
        add(&mut store, &clock, title, "");
    }

    store.set_sort_order(SortOrder::TitleAscending);
    let titles: Vec<String> = store
        .derived_view()
        .iter()
        .map(|note| note.title.clone())
        .collect();
    assert_eq!(titles, vec!["Apple", "apricot", "banana", "cherry", "pear"]);
    assert!(titles
        .windows(2)
        .all(|pair| compare_titles(&pair[0], &pair[1]) != Ordering::Greater));
}

#[test]
fn accented_titles_sort_with_their_base_letters() {
    let (mut store, clock) = fixture();
    for title in ["Zebra", "Éclair", "apple", "Ölkanne", "Orange"] {
        add(&mut store, &clock, title, "");
    }

    store.set_sort_order(SortOrder::TitleAscending);
    let titles: Vec<String> = store
        .derived_view()
        .iter()
        .map(|note| note.title.clone())
        .collect();
    assert_eq!(titles, vec!["apple", "Éclair", "Ölkanne", "Orange", "Zebra"]);

    store.set_sort_order(SortOrder::TitleDescending);
    let titles: Vec<String> = store
        .derived_view()
        .iter()
        .map(|note| note.title.clone())
        .collect();
    assert_eq!(titles, vec!["Zebra", "Orange", "Ölkanne", "Éclair", "apple"]);
}

#[test]
fn equal_sort_keys_keep_insertion_order() {
    let (mut store, _clock) = fixture();
    // Clock is not advanced: both notes share `updated_at` and the title.
    let first = store.create().id;
    let second = store.create().id;

    for order in SortOrder::ALL {
        store.set_sort_order(order);
        assert_eq!(
            ids(&store.derived_view()),
            vec![first, second],
            "order {order:?} must be stable"
        );
    }
}

#[test]
fn revision_advances_on_every_recompute() {
    let (mut store, _clock) = fixture();
    let start = store.revision();
    store.set_search_text("x");
    store.set_search_text("x");
    store.create();
    assert_eq!(store.revision(), start + 3);
}
