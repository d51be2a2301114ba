use mediagraph_catalog::{Gallery, GalleryCriterion, GalleryPartial};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};

use super::{Queryable, Repository};
use crate::criterion::{
    bool_criterion, count_criterion, fk_multi_criterion, int_criterion, joined_multi_criterion,
    missing_relation, missing_scalar, performer_tags_criterion, relation_count_sql,
    string_criterion,
};
use crate::filter::{CriterionHandler, FilterBuilder, FilterError};
use crate::query_builder::SortSpec;
use crate::repository::{Changes, Entity, JoinRepository, OperationError, Relation, set};

const GALLERY_TAGS: Relation = Relation::new("galleries_tags", "gallery_id", "tag_id");
const GALLERY_PERFORMERS: Relation =
    Relation::new("performers_galleries", "gallery_id", "performer_id");
const GALLERY_IMAGES: Relation = Relation::new("galleries_images", "gallery_id", "image_id");
const GALLERY_SCENES: Relation = Relation::new("scenes_galleries", "gallery_id", "scene_id");

const MISSING_SCALARS: &[&str] = &["path", "title", "url", "date", "details", "rating"];

impl Entity for Gallery {
    const TABLE: &'static str = "galleries";
    const ENTITY_TYPE: &'static str = "gallery";
    const COLUMNS: &'static [&'static str] = &[
        "checksum",
        "path",
        "title",
        "url",
        "date",
        "details",
        "rating",
        "organized",
        "studio_id",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            checksum: row.get("checksum")?,
            path: row.get("path")?,
            title: row.get("title")?,
            url: row.get("url")?,
            date: row.get("date")?,
            details: row.get("details")?,
            rating: row.get("rating")?,
            organized: row.get("organized")?,
            studio_id: row.get("studio_id")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.checksum.clone().into(),
            self.path.clone().into(),
            self.title.clone().into(),
            self.url.clone().into(),
            self.date.clone().into(),
            self.details.clone().into(),
            self.rating.into(),
            self.organized.into(),
            self.studio_id.into(),
            self.created_at.clone().into(),
            self.updated_at.clone().into(),
        ]
    }
}

impl Changes for GalleryPartial {
    fn id(&self) -> i64 {
        self.id
    }

    fn changes(&self) -> Vec<(&'static str, Value)> {
        let mut out = Vec::new();
        set(&mut out, "path", self.path.clone());
        set(&mut out, "title", self.title.clone());
        set(&mut out, "url", self.url.clone());
        set(&mut out, "date", self.date.clone());
        set(&mut out, "details", self.details.clone());
        set(&mut out, "rating", self.rating);
        set(&mut out, "organized", self.organized);
        set(&mut out, "studio_id", self.studio_id);
        set(&mut out, "updated_at", self.updated_at.clone());
        out
    }
}

impl CriterionHandler for GalleryCriterion {
    fn apply(&self, f: &mut FilterBuilder) -> Result<(), FilterError> {
        let count = |r: &Relation| relation_count_sql("galleries", r.join_table, r.id_column);
        match self {
            Self::Path(c) => string_criterion(f, "galleries.path", c),
            Self::Title(c) => string_criterion(f, "galleries.title", c),
            Self::Checksum(c) => string_criterion(f, "galleries.checksum", c),
            Self::Rating(c) => int_criterion(f, "galleries.rating", c),
            Self::Organized(v) => {
                bool_criterion(f, "galleries.organized", *v);
                Ok(())
            }
            Self::IsMissing(field) => {
                let relation = match field.as_str() {
                    "studio" => {
                        f.add_where("galleries.studio_id IS NULL", vec![]);
                        return Ok(());
                    }
                    "performers" => &GALLERY_PERFORMERS,
                    "tags" => &GALLERY_TAGS,
                    "scenes" => &GALLERY_SCENES,
                    "images" => &GALLERY_IMAGES,
                    other => return missing_scalar(f, other, MISSING_SCALARS),
                };
                missing_relation(f, field, relation);
                Ok(())
            }
            Self::Tags(c) => joined_multi_criterion(f, "tags", &GALLERY_TAGS, c),
            Self::TagCount(c) => count_criterion(f, "tag_count", &count(&GALLERY_TAGS), c),
            Self::Performers(c) => joined_multi_criterion(f, "performers", &GALLERY_PERFORMERS, c),
            Self::PerformerCount(c) => {
                count_criterion(f, "performer_count", &count(&GALLERY_PERFORMERS), c)
            }
            Self::Studios(c) => fk_multi_criterion(f, "galleries.studio_id", c),
            Self::ImageCount(c) => count_criterion(f, "image_count", &count(&GALLERY_IMAGES), c),
            Self::PerformerTags(c) => performer_tags_criterion(f, &GALLERY_PERFORMERS, c),
        }
    }
}

pub struct GalleryRepository<'c> {
    conn: &'c Connection,
}

impl<'c> Repository<'c> for GalleryRepository<'c> {
    type Entity = Gallery;

    fn conn(&self) -> &'c Connection {
        self.conn
    }
}

impl<'c> Queryable<'c> for GalleryRepository<'c> {
    type Criterion = GalleryCriterion;

    const SEARCH_COLUMNS: &'static [&'static str] =
        &["galleries.title", "galleries.path", "galleries.checksum"];
    const SORT: SortSpec = SortSpec {
        default: "path",
        columns: &[
            ("path", "galleries.path"),
            ("title", "galleries.title COLLATE NOCASE"),
            ("date", "galleries.date"),
            ("rating", "galleries.rating"),
            ("created_at", "galleries.created_at"),
            ("updated_at", "galleries.updated_at"),
        ],
        counts: &[
            ("images", "galleries_images", "gallery_id"),
            ("tags", "galleries_tags", "gallery_id"),
            ("performers", "performers_galleries", "gallery_id"),
        ],
    };
}

impl<'c> GalleryRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn update(&self, partial: &GalleryPartial) -> Result<Gallery, OperationError> {
        self.table().update(partial)
    }

    pub fn find_by_checksum(&self, checksum: &str) -> Result<Option<Gallery>, OperationError> {
        self.table()
            .find_by("checksum", Value::Text(checksum.to_string()), false)
    }

    pub fn find_by_checksums(&self, checksums: &[String]) -> Result<Vec<Gallery>, OperationError> {
        let values = checksums.iter().map(|c| Value::Text(c.clone())).collect();
        self.table().find_all_by("checksum", values, false)
    }

    pub fn find_by_path(&self, path: &str) -> Result<Option<Gallery>, OperationError> {
        self.table()
            .find_by("path", Value::Text(path.to_string()), false)
    }

    pub fn find_by_scene_id(&self, scene_id: i64) -> Result<Vec<Gallery>, OperationError> {
        self.table().select(
            "SELECT galleries.* FROM galleries
             JOIN scenes_galleries ON scenes_galleries.gallery_id = galleries.id
             WHERE scenes_galleries.scene_id = ?1 ORDER BY galleries.id",
            vec![Value::Integer(scene_id)],
        )
    }

    // ── Relations ──

    pub fn get_tag_ids(&self, id: i64) -> Result<Vec<i64>, OperationError> {
        JoinRepository::new(self.conn, GALLERY_TAGS).get_ids(id)
    }

    pub fn update_tags(&self, id: i64, tag_ids: &[i64]) -> Result<(), OperationError> {
        JoinRepository::new(self.conn, GALLERY_TAGS).replace(id, tag_ids)
    }

    pub fn get_performer_ids(&self, id: i64) -> Result<Vec<i64>, OperationError> {
        JoinRepository::new(self.conn, GALLERY_PERFORMERS).get_ids(id)
    }

    pub fn update_performers(&self, id: i64, performer_ids: &[i64]) -> Result<(), OperationError> {
        JoinRepository::new(self.conn, GALLERY_PERFORMERS).replace(id, performer_ids)
    }

    pub fn get_image_ids(&self, id: i64) -> Result<Vec<i64>, OperationError> {
        JoinRepository::new(self.conn, GALLERY_IMAGES).get_ids(id)
    }

    pub fn update_images(&self, id: i64, image_ids: &[i64]) -> Result<(), OperationError> {
        JoinRepository::new(self.conn, GALLERY_IMAGES).replace(id, image_ids)
    }
}
