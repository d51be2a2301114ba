use mediagraph_catalog::{Tag, TagCriterion, TagPartial};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};

use super::{Queryable, Repository};
use crate::criterion::{count_criterion, missing_relation, relation_count_sql, string_criterion};
use crate::filter::{CriterionHandler, FilterBuilder, FilterError};
use crate::query_builder::SortSpec;
use crate::repository::{Changes, Entity, OperationError, Relation, set};

const TAG_SCENES: Relation = Relation::new("scenes_tags", "tag_id", "scene_id");
const TAG_IMAGES: Relation = Relation::new("images_tags", "tag_id", "image_id");
const TAG_GALLERIES: Relation = Relation::new("galleries_tags", "tag_id", "gallery_id");
const TAG_PERFORMERS: Relation = Relation::new("performers_tags", "tag_id", "performer_id");

/// Markers using the tag either as primary tag or as a secondary tag.
const MARKER_COUNT_SQL: &str = "(SELECT COUNT(DISTINCT sm.id) FROM scene_markers AS sm \
     LEFT JOIN scene_markers_tags AS smt ON smt.scene_marker_id = sm.id \
     WHERE sm.primary_tag_id = tags.id OR smt.tag_id = tags.id)";

impl Entity for Tag {
    const TABLE: &'static str = "tags";
    const ENTITY_TYPE: &'static str = "tag";
    const COLUMNS: &'static [&'static str] = &["checksum", "name", "created_at", "updated_at"];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            checksum: row.get("checksum")?,
            name: row.get("name")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.checksum.clone().into(),
            self.name.clone().into(),
            self.created_at.clone().into(),
            self.updated_at.clone().into(),
        ]
    }
}

impl Changes for TagPartial {
    fn id(&self) -> i64 {
        self.id
    }

    fn changes(&self) -> Vec<(&'static str, Value)> {
        let mut out = Vec::new();
        set(&mut out, "name", self.name.clone());
        set(&mut out, "updated_at", self.updated_at.clone());
        out
    }
}

impl CriterionHandler for TagCriterion {
    fn apply(&self, f: &mut FilterBuilder) -> Result<(), FilterError> {
        let count = |r: &Relation| relation_count_sql("tags", r.join_table, r.id_column);
        match self {
            Self::Name(c) => string_criterion(f, "tags.name", c),
            Self::IsMissing(field) => {
                let relation = match field.as_str() {
                    "scenes" => &TAG_SCENES,
                    "images" => &TAG_IMAGES,
                    "galleries" => &TAG_GALLERIES,
                    "performers" => &TAG_PERFORMERS,
                    _ => {
                        return Err(FilterError::UnknownField {
                            field: field.clone(),
                        });
                    }
                };
                missing_relation(f, field, relation);
                Ok(())
            }
            Self::SceneCount(c) => count_criterion(f, "scene_count", &count(&TAG_SCENES), c),
            Self::ImageCount(c) => count_criterion(f, "image_count", &count(&TAG_IMAGES), c),
            Self::GalleryCount(c) => {
                count_criterion(f, "gallery_count", &count(&TAG_GALLERIES), c)
            }
            Self::PerformerCount(c) => {
                count_criterion(f, "performer_count", &count(&TAG_PERFORMERS), c)
            }
            Self::MarkerCount(c) => count_criterion(f, "marker_count", MARKER_COUNT_SQL, c),
        }
    }
}

pub struct TagRepository<'c> {
    conn: &'c Connection,
}

impl<'c> Repository<'c> for TagRepository<'c> {
    type Entity = Tag;

    fn conn(&self) -> &'c Connection {
        self.conn
    }
}

impl<'c> Queryable<'c> for TagRepository<'c> {
    type Criterion = TagCriterion;

    const SEARCH_COLUMNS: &'static [&'static str] = &["tags.name"];
    const SORT: SortSpec = SortSpec {
        default: "name",
        columns: &[
            ("name", "tags.name COLLATE NOCASE"),
            ("created_at", "tags.created_at"),
            ("updated_at", "tags.updated_at"),
        ],
        counts: &[
            ("scenes", "scenes_tags", "tag_id"),
            ("images", "images_tags", "tag_id"),
            ("galleries", "galleries_tags", "tag_id"),
            ("performers", "performers_tags", "tag_id"),
        ],
    };
}

impl<'c> TagRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Apply the fields set on `partial`; unset fields keep their value.
    pub fn update(&self, partial: &TagPartial) -> Result<Tag, OperationError> {
        self.table().update(partial)
    }

    pub fn find_by_checksum(&self, checksum: &str) -> Result<Option<Tag>, OperationError> {
        self.table()
            .find_by("checksum", Value::Text(checksum.to_string()), false)
    }

    pub fn find_by_name(&self, name: &str, nocase: bool) -> Result<Option<Tag>, OperationError> {
        self.table()
            .find_by("name", Value::Text(name.to_string()), nocase)
    }

    pub fn find_by_names(&self, names: &[String], nocase: bool) -> Result<Vec<Tag>, OperationError> {
        let values = names.iter().map(|n| Value::Text(n.clone())).collect();
        self.table().find_all_by("name", values, nocase)
    }

    pub fn find_by_scene_id(&self, scene_id: i64) -> Result<Vec<Tag>, OperationError> {
        self.table().select(
            "SELECT tags.* FROM tags JOIN scenes_tags ON scenes_tags.tag_id = tags.id
             WHERE scenes_tags.scene_id = ?1 ORDER BY tags.name",
            vec![Value::Integer(scene_id)],
        )
    }

    pub fn find_by_performer_id(&self, performer_id: i64) -> Result<Vec<Tag>, OperationError> {
        self.table().select(
            "SELECT tags.* FROM tags JOIN performers_tags ON performers_tags.tag_id = tags.id
             WHERE performers_tags.performer_id = ?1 ORDER BY tags.name",
            vec![Value::Integer(performer_id)],
        )
    }
}
