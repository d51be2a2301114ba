//! Data model types for the media catalog.
//!
//! These types mirror the persistent schema: tags, performers, studios,
//! movies, galleries, scenes, scene markers, images and scraped items.
//! Every entity carries a store-local integer `id` and a portable `checksum`.
//! Timestamps are RFC 3339 strings.

use serde::{Deserialize, Serialize};

/// Compute the checksum used as portable identity for name-identified
/// entities (tags, performers, studios, movies).
pub fn checksum_from_name(name: &str) -> String {
    format!("{:x}", md5::compute(name.as_bytes()))
}

// ── Tag ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub checksum: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Tag {
    /// A new, unsaved tag whose checksum is derived from its name.
    pub fn named(name: &str) -> Self {
        Self {
            id: 0,
            checksum: checksum_from_name(name),
            name: name.to_string(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TagPartial {
    pub id: i64,
    pub name: Option<String>,
    pub updated_at: Option<String>,
}

// ── Performer ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Performer {
    pub id: i64,
    pub checksum: String,
    pub name: String,
    pub gender: Option<String>,
    pub url: Option<String>,
    pub birthdate: Option<String>,
    pub death_date: Option<String>,
    pub ethnicity: Option<String>,
    pub country: Option<String>,
    pub career_length: Option<String>,
    pub aliases: Option<String>,
    pub favorite: bool,
    pub rating: Option<i64>,
    pub details: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Performer {
    /// A new, unsaved performer carrying only a name.
    pub fn named(name: &str) -> Self {
        Self {
            id: 0,
            checksum: checksum_from_name(name),
            name: name.to_string(),
            gender: None,
            url: None,
            birthdate: None,
            death_date: None,
            ethnicity: None,
            country: None,
            career_length: None,
            aliases: None,
            favorite: false,
            rating: None,
            details: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }
}

/// Partial performer update: `None` leaves a column untouched,
/// `Some(None)` clears a nullable column.
#[derive(Debug, Clone, Default)]
pub struct PerformerPartial {
    pub id: i64,
    pub name: Option<String>,
    pub gender: Option<Option<String>>,
    pub url: Option<Option<String>>,
    pub birthdate: Option<Option<String>>,
    pub death_date: Option<Option<String>>,
    pub ethnicity: Option<Option<String>>,
    pub country: Option<Option<String>>,
    pub career_length: Option<Option<String>>,
    pub aliases: Option<Option<String>>,
    pub favorite: Option<bool>,
    pub rating: Option<Option<i64>>,
    pub details: Option<Option<String>>,
    pub updated_at: Option<String>,
}

// ── Studio ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Studio {
    pub id: i64,
    pub checksum: String,
    pub name: String,
    pub url: Option<String>,
    /// Parent studio in the studio hierarchy.
    pub parent_id: Option<i64>,
    pub rating: Option<i64>,
    pub details: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Studio {
    pub fn named(name: &str) -> Self {
        Self {
            id: 0,
            checksum: checksum_from_name(name),
            name: name.to_string(),
            url: None,
            parent_id: None,
            rating: None,
            details: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StudioPartial {
    pub id: i64,
    pub name: Option<String>,
    pub url: Option<Option<String>>,
    pub parent_id: Option<Option<i64>>,
    pub rating: Option<Option<i64>>,
    pub details: Option<Option<String>>,
    pub updated_at: Option<String>,
}

// ── Movie ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub checksum: String,
    pub name: String,
    pub aliases: Option<String>,
    /// Duration in seconds.
    pub duration: Option<i64>,
    pub date: Option<String>,
    pub rating: Option<i64>,
    pub studio_id: Option<i64>,
    pub director: Option<String>,
    pub synopsis: Option<String>,
    pub url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Movie {
    pub fn named(name: &str) -> Self {
        Self {
            id: 0,
            checksum: checksum_from_name(name),
            name: name.to_string(),
            aliases: None,
            duration: None,
            date: None,
            rating: None,
            studio_id: None,
            director: None,
            synopsis: None,
            url: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MoviePartial {
    pub id: i64,
    pub name: Option<String>,
    pub aliases: Option<Option<String>>,
    pub duration: Option<Option<i64>>,
    pub date: Option<Option<String>>,
    pub rating: Option<Option<i64>>,
    pub studio_id: Option<Option<i64>>,
    pub director: Option<Option<String>>,
    pub synopsis: Option<Option<String>>,
    pub url: Option<Option<String>>,
    pub updated_at: Option<String>,
}

/// A scene's membership in a movie, with its optional position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovieScene {
    pub movie_id: i64,
    pub scene_index: Option<i64>,
}

// ── Gallery ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gallery {
    pub id: i64,
    pub checksum: String,
    pub path: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub date: Option<String>,
    pub details: Option<String>,
    pub rating: Option<i64>,
    pub organized: bool,
    pub studio_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl Gallery {
    /// A new, unsaved gallery known only by checksum.
    pub fn with_checksum(checksum: &str) -> Self {
        Self {
            id: 0,
            checksum: checksum.to_string(),
            path: None,
            title: None,
            url: None,
            date: None,
            details: None,
            rating: None,
            organized: false,
            studio_id: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GalleryPartial {
    pub id: i64,
    pub path: Option<Option<String>>,
    pub title: Option<Option<String>>,
    pub url: Option<Option<String>>,
    pub date: Option<Option<String>>,
    pub details: Option<Option<String>>,
    pub rating: Option<Option<i64>>,
    pub organized: Option<bool>,
    pub studio_id: Option<Option<i64>>,
    pub updated_at: Option<String>,
}

// ── Scene ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: i64,
    pub checksum: String,
    pub oshash: Option<String>,
    pub path: String,
    pub title: Option<String>,
    pub details: Option<String>,
    pub url: Option<String>,
    pub date: Option<String>,
    pub rating: Option<i64>,
    pub organized: bool,
    pub o_counter: i64,
    pub size: Option<i64>,
    /// Duration in seconds.
    pub duration: Option<f64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub studio_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct ScenePartial {
    pub id: i64,
    pub path: Option<String>,
    pub title: Option<Option<String>>,
    pub details: Option<Option<String>>,
    pub url: Option<Option<String>>,
    pub date: Option<Option<String>>,
    pub rating: Option<Option<i64>>,
    pub organized: Option<bool>,
    pub size: Option<Option<i64>>,
    pub duration: Option<Option<f64>>,
    pub width: Option<Option<i64>>,
    pub height: Option<Option<i64>>,
    pub studio_id: Option<Option<i64>>,
    pub updated_at: Option<String>,
}

/// A timestamped marker inside a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneMarker {
    pub id: i64,
    pub scene_id: i64,
    pub title: String,
    pub seconds: f64,
    pub primary_tag_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct SceneMarkerPartial {
    pub id: i64,
    pub title: Option<String>,
    pub seconds: Option<f64>,
    pub primary_tag_id: Option<i64>,
    pub updated_at: Option<String>,
}

// ── Image ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: i64,
    pub checksum: String,
    pub path: String,
    pub title: Option<String>,
    pub rating: Option<i64>,
    pub organized: bool,
    pub o_counter: i64,
    pub size: Option<i64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub studio_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct ImagePartial {
    pub id: i64,
    pub path: Option<String>,
    pub title: Option<Option<String>>,
    pub rating: Option<Option<i64>>,
    pub organized: Option<bool>,
    pub size: Option<Option<i64>>,
    pub width: Option<Option<i64>>,
    pub height: Option<Option<i64>>,
    pub studio_id: Option<Option<i64>>,
    pub updated_at: Option<String>,
}

// ── Scraped Item ────────────────────────────────────────────────────────────

/// A record scraped from an external site, kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedItem {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub date: Option<String>,
    pub rating: Option<String>,
    pub tags: Option<String>,
    pub models: Option<String>,
    pub episode: Option<i64>,
    pub gallery_filename: Option<String>,
    pub gallery_url: Option<String>,
    pub video_filename: Option<String>,
    pub video_url: Option<String>,
    pub studio_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}
