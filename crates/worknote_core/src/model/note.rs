//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record owned by the note store.
//! - Own the closed `status` / `accent_color` vocabularies and their wire codes.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `updated_at >= created_at` for every valid note.
//! - `usage_count` never decreases during a note's lifetime.
//! - `accent_color` is always one of the fixed palette values.

use chrono::{DateTime, Utc};
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every note.
pub type NoteId = Uuid;

/// Title assigned to freshly created notes.
pub const DEFAULT_NOTE_TITLE: &str = "New Note";

/// Lifecycle stage of a note.
///
/// Persisted as an integer code (`0..=3`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NoteStatus {
    /// Freshly created, not yet worked on.
    #[default]
    Draft,
    /// Currently in use.
    Active,
    /// Kept for reference only.
    Archived,
    /// Finished.
    Completed,
}

impl NoteStatus {
    /// All statuses in picker order.
    pub const ALL: [NoteStatus; 4] = [
        NoteStatus::Draft,
        NoteStatus::Active,
        NoteStatus::Archived,
        NoteStatus::Completed,
    ];

    /// Integer code used in the persisted document.
    pub fn code(self) -> u8 {
        match self {
            Self::Draft => 0,
            Self::Active => 1,
            Self::Archived => 2,
            Self::Completed => 3,
        }
    }

    /// Decodes a persisted status code.
    ///
    /// Unknown codes fall back to `Draft`, the same way the editor treats
    /// unrecognized raw values.
    pub fn from_code(code: u64) -> Self {
        match code {
            1 => Self::Active,
            2 => Self::Archived,
            3 => Self::Completed,
            _ => Self::Draft,
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Active => "Active",
            Self::Archived => "Archived",
            Self::Completed => "Completed",
        }
    }

    /// Parses a case-insensitive label (`draft`, `active`, ...).
    pub fn parse_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "active" => Some(Self::Active),
            "archived" => Some(Self::Archived),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl Serialize for NoteStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for NoteStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u64::deserialize(deserializer)?;
        Ok(Self::from_code(code))
    }
}

/// Cosmetic accent color from the fixed palette.
///
/// Persisted as a lowercase string token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AccentColor {
    #[default]
    Black,
    Blue,
    Green,
    Orange,
    Pink,
}

impl AccentColor {
    /// Palette in picker order.
    pub const ALL: [AccentColor; 5] = [
        AccentColor::Black,
        AccentColor::Blue,
        AccentColor::Green,
        AccentColor::Orange,
        AccentColor::Pink,
    ];

    /// String token used in the persisted document.
    pub fn token(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Orange => "orange",
            Self::Pink => "pink",
        }
    }

    /// Decodes a persisted token. Unrecognized tokens decode to `Black`.
    pub fn from_token(token: &str) -> Self {
        Self::parse_token(token).unwrap_or(Self::Black)
    }

    /// Strict variant of [`AccentColor::from_token`] for user input.
    pub fn parse_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "black" => Some(Self::Black),
            "blue" => Some(Self::Blue),
            "green" => Some(Self::Green),
            "orange" => Some(Self::Orange),
            "pink" => Some(Self::Pink),
            _ => None,
        }
    }
}

impl Serialize for AccentColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}

impl<'de> Deserialize<'de> for AccentColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Ok(Self::from_token(&token))
    }
}

/// Validation error for note invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// `updated_at` is earlier than `created_at`.
    UpdatedBeforeCreated { id: NoteId },
    /// Two records share one id.
    DuplicateId { id: NoteId },
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UpdatedBeforeCreated { id } => {
                write!(f, "note {id}: updatedAt must be >= createdAt")
            }
            Self::DuplicateId { id } => write!(f, "note id {id} appears more than once"),
        }
    }
}

impl Error for NoteValidationError {}

/// Canonical note record.
///
/// Serialized with camelCase keys. `usageCount`, `status` and `accentColor`
/// default when absent so documents written before those fields existed
/// still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_favorite: bool,
    #[serde(default)]
    pub usage_count: u64,
    #[serde(default)]
    pub status: NoteStatus,
    #[serde(default)]
    pub accent_color: AccentColor,
}

impl Note {
    /// Creates a note with default content, stamped at `now`.
    ///
    /// # Invariants
    /// - `created_at == updated_at`.
    /// - Status is `Draft`, usage count is zero, accent is `Black`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_id(Uuid::new_v4(), DEFAULT_NOTE_TITLE, "", now)
    }

    /// Creates a note with caller-provided identity and content.
    ///
    /// Used by import paths and tests where identity already exists.
    pub fn with_id(
        id: NoteId,
        title: impl Into<String>,
        body: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            body: body.into(),
            created_at: now,
            updated_at: now,
            is_favorite: false,
            usage_count: 0,
            status: NoteStatus::Draft,
            accent_color: AccentColor::Black,
        }
    }

    /// Advances `updated_at`, never letting it fall behind `created_at`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }

    /// Checks timestamp ordering.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.updated_at < self.created_at {
            return Err(NoteValidationError::UpdatedBeforeCreated { id: self.id });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{AccentColor, Note, NoteStatus, NoteValidationError, DEFAULT_NOTE_TITLE};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn new_note_uses_documented_defaults() {
        let now = Utc.with_ymd_and_hms(2025, 12, 29, 9, 0, 0).unwrap();
        let note = Note::new(now);
        assert_eq!(note.title, DEFAULT_NOTE_TITLE);
        assert!(note.body.is_empty());
        assert_eq!(note.status, NoteStatus::Draft);
        assert_eq!(note.accent_color, AccentColor::Black);
        assert_eq!(note.usage_count, 0);
        assert!(!note.is_favorite);
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn touch_never_moves_before_creation() {
        let now = Utc.with_ymd_and_hms(2025, 12, 29, 9, 0, 0).unwrap();
        let mut note = Note::new(now);
        note.touch(now - Duration::hours(1));
        assert_eq!(note.updated_at, now);
        note.touch(now + Duration::minutes(5));
        assert_eq!(note.updated_at, now + Duration::minutes(5));
    }

    #[test]
    fn validate_rejects_reversed_timestamps() {
        let now = Utc.with_ymd_and_hms(2025, 12, 29, 9, 0, 0).unwrap();
        let mut note = Note::new(now);
        note.updated_at = now - Duration::seconds(1);
        assert_eq!(
            note.validate(),
            Err(NoteValidationError::UpdatedBeforeCreated { id: note.id })
        );
    }

    #[test]
    fn status_codes_are_stable_and_unknown_falls_back_to_draft() {
        for status in NoteStatus::ALL {
            assert_eq!(NoteStatus::from_code(u64::from(status.code())), status);
        }
        assert_eq!(NoteStatus::from_code(42), NoteStatus::Draft);
    }

    #[test]
    fn unknown_color_token_decodes_to_black() {
        assert_eq!(AccentColor::from_token("purple"), AccentColor::Black);
        assert_eq!(AccentColor::from_token("Pink"), AccentColor::Pink);
        assert_eq!(AccentColor::parse_token("purple"), None);
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let now = Utc.with_ymd_and_hms(2025, 12, 29, 9, 0, 0).unwrap();
        let mut note = Note::new(now);
        note.status = NoteStatus::Archived;
        note.accent_color = AccentColor::Orange;
        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(value["status"], 2);
        assert_eq!(value["accentColor"], "orange");
        assert_eq!(value["isFavorite"], false);
        assert_eq!(value["usageCount"], 0);
        assert!(value["createdAt"].as_str().unwrap().starts_with("2025-12-29T09:00:00"));
    }
}
