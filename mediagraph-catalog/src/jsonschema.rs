//! Serialized record types of an exported catalog snapshot.
//!
//! Records reference related entities by name (tags, performers, studios,
//! movies) or by checksum (galleries), never by store-local id.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The entity types that appear in an import run, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Tag,
    Performer,
    Studio,
    Movie,
    Gallery,
    ScrapedItem,
    Scene,
    SceneMarker,
    Image,
}

impl EntityKind {
    /// Label used in log prefixes and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Tag => "tags",
            Self::Performer => "performers",
            Self::Studio => "studios",
            Self::Movie => "movies",
            Self::Gallery => "galleries",
            Self::ScrapedItem => "scraped sites",
            Self::Scene => "scenes",
            Self::SceneMarker => "scene markers",
            Self::Image => "images",
        }
    }

    /// Directory holding one `<checksum>.json` record per entity, for the
    /// kinds that are listed in the manifest.
    pub fn dir_name(&self) -> Option<&'static str> {
        match self {
            Self::Tag => Some("tags"),
            Self::Performer => Some("performers"),
            Self::Studio => Some("studios"),
            Self::Movie => Some("movies"),
            Self::Gallery => Some("galleries"),
            Self::Scene => Some("scenes"),
            Self::Image => Some("images"),
            Self::ScrapedItem | Self::SceneMarker => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Manifest ────────────────────────────────────────────────────────────────

/// One manifest entry: the checksum that names the record file, plus the
/// entity's name or path where the exporter recorded one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub checksum: String,
}

/// Checksum references per entity type; the sole index of an export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportManifest {
    #[serde(default)]
    pub tags: Vec<MappingEntry>,
    #[serde(default)]
    pub performers: Vec<MappingEntry>,
    #[serde(default)]
    pub studios: Vec<MappingEntry>,
    #[serde(default)]
    pub movies: Vec<MappingEntry>,
    #[serde(default)]
    pub galleries: Vec<MappingEntry>,
    #[serde(default)]
    pub scenes: Vec<MappingEntry>,
    #[serde(default)]
    pub images: Vec<MappingEntry>,
}

impl ImportManifest {
    pub fn entries(&self, kind: EntityKind) -> &[MappingEntry] {
        match kind {
            EntityKind::Tag => &self.tags,
            EntityKind::Performer => &self.performers,
            EntityKind::Studio => &self.studios,
            EntityKind::Movie => &self.movies,
            EntityKind::Gallery => &self.galleries,
            EntityKind::Scene => &self.scenes,
            EntityKind::Image => &self.images,
            EntityKind::ScrapedItem | EntityKind::SceneMarker => &[],
        }
    }
}

// ── Records ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagRecord {
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformerRecord {
    pub name: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub birthdate: Option<String>,
    #[serde(default)]
    pub death_date: Option<String>,
    #[serde(default)]
    pub ethnicity: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub career_length: Option<String>,
    #[serde(default)]
    pub aliases: Option<String>,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudioRecord {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    /// Name of the parent studio, which may appear later in the manifest.
    #[serde(default)]
    pub parent_studio: Option<String>,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub name: String,
    #[serde(default)]
    pub aliases: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub studio: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GalleryRecord {
    pub checksum: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub organized: bool,
    #[serde(default)]
    pub studio: Option<String>,
    #[serde(default)]
    pub performers: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// File properties captured at export time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub height: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneMovieRecord {
    pub movie_name: String,
    #[serde(default)]
    pub scene_index: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneMarkerRecord {
    pub title: String,
    pub seconds: f64,
    pub primary_tag: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub oshash: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub organized: bool,
    #[serde(default)]
    pub o_counter: i64,
    #[serde(default)]
    pub studio: Option<String>,
    /// Gallery checksums.
    #[serde(default)]
    pub galleries: Vec<String>,
    #[serde(default)]
    pub performers: Vec<String>,
    #[serde(default)]
    pub movies: Vec<SceneMovieRecord>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub markers: Vec<SceneMarkerRecord>,
    #[serde(default)]
    pub file: Option<FileRecord>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub organized: bool,
    #[serde(default)]
    pub o_counter: i64,
    #[serde(default)]
    pub studio: Option<String>,
    /// Gallery checksums.
    #[serde(default)]
    pub galleries: Vec<String>,
    #[serde(default)]
    pub performers: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub file: Option<FileRecord>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapedItemRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub models: Option<String>,
    #[serde(default)]
    pub episode: Option<i64>,
    #[serde(default)]
    pub gallery_filename: Option<String>,
    #[serde(default)]
    pub gallery_url: Option<String>,
    #[serde(default)]
    pub video_filename: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub studio: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}
