use mediagraph_catalog::{Image, ImageCriterion, ImagePartial};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};

use super::{Queryable, Repository};
use crate::criterion::{
    bool_criterion, count_criterion, fk_multi_criterion, int_criterion, joined_multi_criterion,
    missing_relation, missing_scalar, performer_tags_criterion, relation_count_sql,
    resolution_criterion, string_criterion,
};
use crate::filter::{CriterionHandler, FilterBuilder, FilterError};
use crate::query_builder::SortSpec;
use crate::repository::{
    Changes, CounterOp, Entity, JoinRepository, OperationError, Relation, set, update_counter,
};

const IMAGE_TAGS: Relation = Relation::new("images_tags", "image_id", "tag_id");
const IMAGE_PERFORMERS: Relation = Relation::new("performers_images", "image_id", "performer_id");
const IMAGE_GALLERIES: Relation = Relation::new("galleries_images", "image_id", "gallery_id");

const MISSING_SCALARS: &[&str] = &["title", "rating"];

impl Entity for Image {
    const TABLE: &'static str = "images";
    const ENTITY_TYPE: &'static str = "image";
    const COLUMNS: &'static [&'static str] = &[
        "checksum",
        "path",
        "title",
        "rating",
        "organized",
        "o_counter",
        "size",
        "width",
        "height",
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
            rating: row.get("rating")?,
            organized: row.get("organized")?,
            o_counter: row.get("o_counter")?,
            size: row.get("size")?,
            width: row.get("width")?,
            height: row.get("height")?,
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
            self.rating.into(),
            self.organized.into(),
            self.o_counter.into(),
            self.size.into(),
            self.width.into(),
            self.height.into(),
            self.studio_id.into(),
            self.created_at.clone().into(),
            self.updated_at.clone().into(),
        ]
    }
}

impl Changes for ImagePartial {
    fn id(&self) -> i64 {
        self.id
    }

    fn changes(&self) -> Vec<(&'static str, Value)> {
        let mut out = Vec::new();
        set(&mut out, "path", self.path.clone());
        set(&mut out, "title", self.title.clone());
        set(&mut out, "rating", self.rating);
        set(&mut out, "organized", self.organized);
        set(&mut out, "size", self.size);
        set(&mut out, "width", self.width);
        set(&mut out, "height", self.height);
        set(&mut out, "studio_id", self.studio_id);
        set(&mut out, "updated_at", self.updated_at.clone());
        out
    }
}

impl CriterionHandler for ImageCriterion {
    fn apply(&self, f: &mut FilterBuilder) -> Result<(), FilterError> {
        let count = |r: &Relation| relation_count_sql("images", r.join_table, r.id_column);
        match self {
            Self::Path(c) => string_criterion(f, "images.path", c),
            Self::Title(c) => string_criterion(f, "images.title", c),
            Self::Checksum(c) => string_criterion(f, "images.checksum", c),
            Self::Rating(c) => int_criterion(f, "images.rating", c),
            Self::OCounter(c) => int_criterion(f, "images.o_counter", c),
            Self::Organized(v) => {
                bool_criterion(f, "images.organized", *v);
                Ok(())
            }
            Self::Resolution(c) => resolution_criterion(f, c),
            Self::IsMissing(field) => {
                let relation = match field.as_str() {
                    "studio" => {
                        f.add_where("images.studio_id IS NULL", vec![]);
                        return Ok(());
                    }
                    "performers" => &IMAGE_PERFORMERS,
                    "tags" => &IMAGE_TAGS,
                    "galleries" => &IMAGE_GALLERIES,
                    other => return missing_scalar(f, other, MISSING_SCALARS),
                };
                missing_relation(f, field, relation);
                Ok(())
            }
            Self::Tags(c) => joined_multi_criterion(f, "tags", &IMAGE_TAGS, c),
            Self::TagCount(c) => count_criterion(f, "tag_count", &count(&IMAGE_TAGS), c),
            Self::Galleries(c) => joined_multi_criterion(f, "galleries", &IMAGE_GALLERIES, c),
            Self::Performers(c) => joined_multi_criterion(f, "performers", &IMAGE_PERFORMERS, c),
            Self::PerformerCount(c) => {
                count_criterion(f, "performer_count", &count(&IMAGE_PERFORMERS), c)
            }
            Self::Studios(c) => fk_multi_criterion(f, "images.studio_id", c),
            Self::PerformerTags(c) => performer_tags_criterion(f, &IMAGE_PERFORMERS, c),
        }
    }
}

pub struct ImageRepository<'c> {
    conn: &'c Connection,
}

impl<'c> Repository<'c> for ImageRepository<'c> {
    type Entity = Image;

    fn conn(&self) -> &'c Connection {
        self.conn
    }
}

impl<'c> Queryable<'c> for ImageRepository<'c> {
    type Criterion = ImageCriterion;

    const SEARCH_COLUMNS: &'static [&'static str] =
        &["images.title", "images.path", "images.checksum"];
    const SORT: SortSpec = SortSpec {
        default: "path",
        columns: &[
            ("path", "images.path"),
            ("title", "images.title COLLATE NOCASE"),
            ("rating", "images.rating"),
            ("o_counter", "images.o_counter"),
            ("filesize", "images.size"),
            ("created_at", "images.created_at"),
            ("updated_at", "images.updated_at"),
        ],
        counts: &[
            ("tags", "images_tags", "image_id"),
            ("performers", "performers_images", "image_id"),
        ],
    };
}

impl<'c> ImageRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn update(&self, partial: &ImagePartial) -> Result<Image, OperationError> {
        self.table().update(partial)
    }

    pub fn find_by_checksum(&self, checksum: &str) -> Result<Option<Image>, OperationError> {
        self.table()
            .find_by("checksum", Value::Text(checksum.to_string()), false)
    }

    pub fn find_by_path(&self, path: &str) -> Result<Option<Image>, OperationError> {
        self.table()
            .find_by("path", Value::Text(path.to_string()), false)
    }

    pub fn find_by_gallery_id(&self, gallery_id: i64) -> Result<Vec<Image>, OperationError> {
        self.table().select(
            "SELECT images.* FROM images
             JOIN galleries_images ON galleries_images.image_id = images.id
             WHERE galleries_images.gallery_id = ?1 ORDER BY images.path",
            vec![Value::Integer(gallery_id)],
        )
    }

    // ── Counters ──

    pub fn increment_o_counter(&self, id: i64) -> Result<i64, OperationError> {
        update_counter::<Image>(self.conn, "o_counter", id, CounterOp::Increment)
    }

    /// Decrement, never below zero.
    pub fn decrement_o_counter(&self, id: i64) -> Result<i64, OperationError> {
        update_counter::<Image>(self.conn, "o_counter", id, CounterOp::Decrement)
    }

    pub fn reset_o_counter(&self, id: i64) -> Result<i64, OperationError> {
        update_counter::<Image>(self.conn, "o_counter", id, CounterOp::Reset)
    }

    // ── Relations ──

    pub fn get_tag_ids(&self, id: i64) -> Result<Vec<i64>, OperationError> {
        JoinRepository::new(self.conn, IMAGE_TAGS).get_ids(id)
    }

    pub fn update_tags(&self, id: i64, tag_ids: &[i64]) -> Result<(), OperationError> {
        JoinRepository::new(self.conn, IMAGE_TAGS).replace(id, tag_ids)
    }

    pub fn get_performer_ids(&self, id: i64) -> Result<Vec<i64>, OperationError> {
        JoinRepository::new(self.conn, IMAGE_PERFORMERS).get_ids(id)
    }

    pub fn update_performers(&self, id: i64, performer_ids: &[i64]) -> Result<(), OperationError> {
        JoinRepository::new(self.conn, IMAGE_PERFORMERS).replace(id, performer_ids)
    }

    pub fn get_gallery_ids(&self, id: i64) -> Result<Vec<i64>, OperationError> {
        JoinRepository::new(self.conn, IMAGE_GALLERIES).get_ids(id)
    }

    pub fn update_galleries(&self, id: i64, gallery_ids: &[i64]) -> Result<(), OperationError> {
        JoinRepository::new(self.conn, IMAGE_GALLERIES).replace(id, gallery_ids)
    }
}
