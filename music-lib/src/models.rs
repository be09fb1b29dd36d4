//! Song entity shapes
//!
//! Two shapes with different "unset" semantics:
//! - [`Song`] (create/filter): plain strings, empty means "not specified".
//! - [`SongPartial`] (read/update): every field independently present or absent,
//!   so an update can set a column to the empty string.

use serde::{Deserialize, Serialize};

/// Storage-assigned song identifier
pub type SongId = i32;

/// Release date format exchanged across every boundary (`DD.MM.YYYY`)
pub const RELEASE_DATE_FORMAT: &str = "%d.%m.%Y";

/// Creation and filter shape
///
/// Carries no identifier: storage assigns one on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Song {
    pub name: String,
    pub artist: String,
    /// `DD.MM.YYYY`
    pub release_date: String,
    /// Lyrics
    pub text: String,
    pub link: String,
}

impl Song {
    /// True when no field carries a value
    pub fn is_blank(&self) -> bool {
        self.name.is_empty()
            && self.artist.is_empty()
            && self.release_date.is_empty()
            && self.text.is_empty()
            && self.link.is_empty()
    }
}

/// Read-result and update shape
///
/// On read, storage fills every field for an existing row; a default value
/// (`id == 0`) means no row matched. On update, `None` leaves the column
/// untouched and the `id` in the body is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SongPartial {
    pub id: SongId,
    pub name: Option<String>,
    pub artist: Option<String>,
    pub release_date: Option<String>,
    pub text: Option<String>,
    pub link: Option<String>,
}

impl SongPartial {
    /// False for the empty "not found" result
    pub fn exists(&self) -> bool {
        self.id != 0
    }

    /// True when no field is present
    pub fn has_no_fields(&self) -> bool {
        self.name.is_none()
            && self.artist.is_none()
            && self.release_date.is_none()
            && self.text.is_none()
            && self.link.is_none()
    }
}
