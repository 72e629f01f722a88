//! Derived-view computation.
//!
//! # Responsibility
//! - Turn the canonical collection plus view state into an ordered list of
//!   positions into that collection.
//!
//! # Invariants
//! - Output only references entries; it never copies or mutates notes.
//! - Sorting is stable: equal keys keep canonical insertion order.
//! - The same input always yields the same output.

use crate::model::note::Note;
use log::warn;
use regex::{Regex, RegexBuilder};
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Ordering applied to the derived view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// `updated_at` descending.
    #[default]
    NewestFirst,
    /// `updated_at` ascending.
    OldestFirst,
    /// Title A-Z.
    TitleAscending,
    /// Title Z-A.
    TitleDescending,
}

impl SortOrder {
    /// All orders in menu order.
    pub const ALL: [SortOrder; 4] = [
        SortOrder::NewestFirst,
        SortOrder::OldestFirst,
        SortOrder::TitleAscending,
        SortOrder::TitleDescending,
    ];

    /// Menu label.
    pub fn label(self) -> &'static str {
        match self {
            Self::NewestFirst => "Newest First",
            Self::OldestFirst => "Oldest First",
            Self::TitleAscending => "Title A-Z",
            Self::TitleDescending => "Title Z-A",
        }
    }

    /// Parses a short command-line name (`newest|oldest|title-asc|title-desc`).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "newest" | "newest-first" => Some(Self::NewestFirst),
            "oldest" | "oldest-first" => Some(Self::OldestFirst),
            "title-asc" | "title" | "a-z" => Some(Self::TitleAscending),
            "title-desc" | "z-a" => Some(Self::TitleDescending),
            _ => None,
        }
    }
}

/// Ephemeral view state. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    /// Substring filter over title and body; empty disables it.
    pub search_text: String,
    /// Keep only favorites.
    pub favorites_only: bool,
    pub sort_order: SortOrder,
}

/// Computes the derived view as positions into `notes`.
pub fn derive_view(notes: &[Note], query: &ViewQuery) -> Vec<usize> {
    let matcher = SearchMatcher::new(&query.search_text);

    let mut positions: Vec<usize> = notes
        .iter()
        .enumerate()
        .filter(|(_, note)| !query.favorites_only || note.is_favorite)
        .filter(|(_, note)| matcher.matches(note))
        .map(|(index, _)| index)
        .collect();

    // `sort_by` is stable; ties keep insertion order.
    match query.sort_order {
        SortOrder::NewestFirst => {
            positions.sort_by(|&a, &b| notes[b].updated_at.cmp(&notes[a].updated_at))
        }
        SortOrder::OldestFirst => {
            positions.sort_by(|&a, &b| notes[a].updated_at.cmp(&notes[b].updated_at))
        }
        SortOrder::TitleAscending => {
            positions.sort_by(|&a, &b| compare_titles(&notes[a].title, &notes[b].title))
        }
        SortOrder::TitleDescending => {
            positions.sort_by(|&a, &b| compare_titles(&notes[b].title, &notes[a].title))
        }
    }

    positions
}

/// Locale-aware title order.
///
/// Primary key ignores case and diacritics (`Éclair` sorts with `eclair`);
/// accent differences break primary ties. Titles differing only by case
/// compare equal so the stable sort keeps their insertion order.
pub fn compare_titles(left: &str, right: &str) -> Ordering {
    base_letters(left)
        .cmp(base_letters(right))
        .then_with(|| folded(left).cmp(folded(right)))
}

fn base_letters(title: &str) -> impl Iterator<Item = char> + '_ {
    title
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn folded(title: &str) -> impl Iterator<Item = char> + '_ {
    title.nfd().flat_map(char::to_lowercase)
}

/// Case-insensitive literal substring matcher over title and body.
struct SearchMatcher {
    needle: Option<Needle>,
}

enum Needle {
    Pattern(Regex),
    Folded(String),
}

impl SearchMatcher {
    fn new(text: &str) -> Self {
        if text.is_empty() {
            return Self { needle: None };
        }

        let needle = match RegexBuilder::new(&regex::escape(text))
            .case_insensitive(true)
            .build()
        {
            Ok(pattern) => Needle::Pattern(pattern),
            Err(err) => {
                warn!(
                    "event=view_search module=store status=fallback reason=pattern_build_failed error={}",
                    err
                );
                Needle::Folded(text.to_lowercase())
            }
        };
        Self {
            needle: Some(needle),
        }
    }

    fn matches(&self, note: &Note) -> bool {
        match &self.needle {
            None => true,
            Some(Needle::Pattern(pattern)) => {
                pattern.is_match(&note.title) || pattern.is_match(&note.body)
            }
            Some(Needle::Folded(folded)) => {
                note.title.to_lowercase().contains(folded.as_str())
                    || note.body.to_lowercase().contains(folded.as_str())
            }
        }
    }
}
