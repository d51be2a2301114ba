use mediagraph_catalog::{Studio, StudioCriterion, StudioPartial};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};

use super::{Queryable, Repository};
use crate::criterion::{
    count_criterion, fk_multi_criterion, int_criterion, missing_scalar, relation_count_sql,
    string_criterion,
};
use crate::filter::{CriterionHandler, FilterBuilder, FilterError};
use crate::query_builder::SortSpec;
use crate::repository::{Changes, Entity, OperationError, set};

const MISSING_SCALARS: &[&str] = &["url", "details", "rating", "parent_id"];

impl Entity for Studio {
    const TABLE: &'static str = "studios";
    const ENTITY_TYPE: &'static str = "studio";
    const COLUMNS: &'static [&'static str] = &[
        "checksum",
        "name",
        "url",
        "parent_id",
        "rating",
        "details",
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
            name: row.get("name")?,
            url: row.get("url")?,
            parent_id: row.get("parent_id")?,
            rating: row.get("rating")?,
            details: row.get("details")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.checksum.clone().into(),
            self.name.clone().into(),
            self.url.clone().into(),
            self.parent_id.into(),
            self.rating.into(),
            self.details.clone().into(),
            self.created_at.clone().into(),
            self.updated_at.clone().into(),
        ]
    }
}

impl Changes for StudioPartial {
    fn id(&self) -> i64 {
        self.id
    }

    fn changes(&self) -> Vec<(&'static str, Value)> {
        let mut out = Vec::new();
        set(&mut out, "name", self.name.clone());
        set(&mut out, "url", self.url.clone());
        set(&mut out, "parent_id", self.parent_id);
        set(&mut out, "rating", self.rating);
        set(&mut out, "details", self.details.clone());
        set(&mut out, "updated_at", self.updated_at.clone());
        out
    }
}

impl CriterionHandler for StudioCriterion {
    fn apply(&self, f: &mut FilterBuilder) -> Result<(), FilterError> {
        let count = |table: &str| relation_count_sql("studios", table, "studio_id");
        match self {
            Self::Name(c) => string_criterion(f, "studios.name", c),
            Self::Url(c) => string_criterion(f, "studios.url", c),
            Self::Details(c) => string_criterion(f, "studios.details", c),
            Self::Rating(c) => int_criterion(f, "studios.rating", c),
            Self::IsMissing(field) => missing_scalar(f, field, MISSING_SCALARS),
            Self::Parents(c) => fk_multi_criterion(f, "studios.parent_id", c),
            Self::SceneCount(c) => count_criterion(f, "scene_count", &count("scenes"), c),
            Self::ImageCount(c) => count_criterion(f, "image_count", &count("images"), c),
            Self::GalleryCount(c) => count_criterion(f, "gallery_count", &count("galleries"), c),
        }
    }
}

pub struct StudioRepository<'c> {
    conn: &'c Connection,
}

impl<'c> Repository<'c> for StudioRepository<'c> {
    type Entity = Studio;

    fn conn(&self) -> &'c Connection {
        self.conn
    }
}

impl<'c> Queryable<'c> for StudioRepository<'c> {
    type Criterion = StudioCriterion;

    const SEARCH_COLUMNS: &'static [&'static str] = &["studios.name", "studios.url"];
    const SORT: SortSpec = SortSpec {
        default: "name",
        columns: &[
            ("name", "studios.name COLLATE NOCASE"),
            ("rating", "studios.rating"),
            ("created_at", "studios.created_at"),
            ("updated_at", "studios.updated_at"),
        ],
        counts: &[
            ("scenes", "scenes", "studio_id"),
            ("images", "images", "studio_id"),
            ("galleries", "galleries", "studio_id"),
        ],
    };
}

impl<'c> StudioRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn update(&self, partial: &StudioPartial) -> Result<Studio, OperationError> {
        self.table().update(partial)
    }

    pub fn find_by_checksum(&self, checksum: &str) -> Result<Option<Studio>, OperationError> {
        self.table()
            .find_by("checksum", Value::Text(checksum.to_string()), false)
    }

    pub fn find_by_name(&self, name: &str, nocase: bool) -> Result<Option<Studio>, OperationError> {
        self.table()
            .find_by("name", Value::Text(name.to_string()), nocase)
    }

    pub fn find_by_names(
        &self,
        names: &[String],
        nocase: bool,
    ) -> Result<Vec<Studio>, OperationError> {
        let values = names.iter().map(|n| Value::Text(n.clone())).collect();
        self.table().find_all_by("name", values, nocase)
    }

    /// Direct children of a studio in the hierarchy.
    pub fn find_children(&self, parent_id: i64) -> Result<Vec<Studio>, OperationError> {
        self.table().select(
            "SELECT * FROM studios WHERE parent_id = ?1 ORDER BY name",
            vec![Value::Integer(parent_id)],
        )
    }
}
