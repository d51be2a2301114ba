use mediagraph_catalog::{Performer, PerformerCriterion, PerformerPartial};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};

use super::{Queryable, Repository};
use crate::criterion::{
    bool_criterion, count_criterion, int_criterion, joined_multi_criterion, missing_relation,
    missing_scalar, relation_count_sql, string_criterion,
};
use crate::filter::{CriterionHandler, FilterBuilder, FilterError};
use crate::query_builder::SortSpec;
use crate::repository::{Changes, Entity, JoinRepository, OperationError, Relation, set};

pub(crate) const PERFORMER_TAGS: Relation =
    Relation::new("performers_tags", "performer_id", "tag_id");
const PERFORMER_SCENES: Relation = Relation::new("performers_scenes", "performer_id", "scene_id");
const PERFORMER_IMAGES: Relation = Relation::new("performers_images", "performer_id", "image_id");
const PERFORMER_GALLERIES: Relation =
    Relation::new("performers_galleries", "performer_id", "gallery_id");

const MISSING_SCALARS: &[&str] = &[
    "gender",
    "url",
    "birthdate",
    "death_date",
    "ethnicity",
    "country",
    "career_length",
    "aliases",
    "rating",
    "details",
];

/// Whole years between birth and death date, or today.
const AGE_SQL: &str = "CAST(strftime('%Y.%m%d', COALESCE(performers.death_date, 'now')) \
     - strftime('%Y.%m%d', performers.birthdate) AS INTEGER)";

impl Entity for Performer {
    const TABLE: &'static str = "performers";
    const ENTITY_TYPE: &'static str = "performer";
    const COLUMNS: &'static [&'static str] = &[
        "checksum",
        "name",
        "gender",
        "url",
        "birthdate",
        "death_date",
        "ethnicity",
        "country",
        "career_length",
        "aliases",
        "favorite",
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
            gender: row.get("gender")?,
            url: row.get("url")?,
            birthdate: row.get("birthdate")?,
            death_date: row.get("death_date")?,
            ethnicity: row.get("ethnicity")?,
            country: row.get("country")?,
            career_length: row.get("career_length")?,
            aliases: row.get("aliases")?,
            favorite: row.get("favorite")?,
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
            self.gender.clone().into(),
            self.url.clone().into(),
            self.birthdate.clone().into(),
            self.death_date.clone().into(),
            self.ethnicity.clone().into(),
            self.country.clone().into(),
            self.career_length.clone().into(),
            self.aliases.clone().into(),
            self.favorite.into(),
            self.rating.into(),
            self.details.clone().into(),
            self.created_at.clone().into(),
            self.updated_at.clone().into(),
        ]
    }
}

impl Changes for PerformerPartial {
    fn id(&self) -> i64 {
        self.id
    }

    fn changes(&self) -> Vec<(&'static str, Value)> {
        let mut out = Vec::new();
        set(&mut out, "name", self.name.clone());
        set(&mut out, "gender", self.gender.clone());
        set(&mut out, "url", self.url.clone());
        set(&mut out, "birthdate", self.birthdate.clone());
        set(&mut out, "death_date", self.death_date.clone());
        set(&mut out, "ethnicity", self.ethnicity.clone());
        set(&mut out, "country", self.country.clone());
        set(&mut out, "career_length", self.career_length.clone());
        set(&mut out, "aliases", self.aliases.clone());
        set(&mut out, "favorite", self.favorite);
        set(&mut out, "rating", self.rating);
        set(&mut out, "details", self.details.clone());
        set(&mut out, "updated_at", self.updated_at.clone());
        out
    }
}

impl CriterionHandler for PerformerCriterion {
    fn apply(&self, f: &mut FilterBuilder) -> Result<(), FilterError> {
        let count = |r: &Relation| relation_count_sql("performers", r.join_table, r.id_column);
        match self {
            Self::Name(c) => string_criterion(f, "performers.name", c),
            Self::Aliases(c) => string_criterion(f, "performers.aliases", c),
            Self::Gender(c) => string_criterion(f, "performers.gender", c),
            Self::Url(c) => string_criterion(f, "performers.url", c),
            Self::CareerLength(c) => string_criterion(f, "performers.career_length", c),
            Self::Country(c) => string_criterion(f, "performers.country", c),
            Self::Ethnicity(c) => string_criterion(f, "performers.ethnicity", c),
            Self::Details(c) => string_criterion(f, "performers.details", c),
            Self::Favorite(v) => {
                bool_criterion(f, "performers.favorite", *v);
                Ok(())
            }
            Self::Rating(c) => int_criterion(f, "performers.rating", c),
            Self::Age(c) => int_criterion(f, AGE_SQL, c),
            Self::IsMissing(field) => match field.as_str() {
                "tags" => {
                    missing_relation(f, field, &PERFORMER_TAGS);
                    Ok(())
                }
                "scenes" => {
                    missing_relation(f, field, &PERFORMER_SCENES);
                    Ok(())
                }
                other => missing_scalar(f, other, MISSING_SCALARS),
            },
            Self::Tags(c) => joined_multi_criterion(f, "tags", &PERFORMER_TAGS, c),
            Self::TagCount(c) => count_criterion(f, "tag_count", &count(&PERFORMER_TAGS), c),
            Self::SceneCount(c) => {
                count_criterion(f, "scene_count", &count(&PERFORMER_SCENES), c)
            }
            Self::ImageCount(c) => {
                count_criterion(f, "image_count", &count(&PERFORMER_IMAGES), c)
            }
            Self::GalleryCount(c) => {
                count_criterion(f, "gallery_count", &count(&PERFORMER_GALLERIES), c)
            }
        }
    }
}

pub struct PerformerRepository<'c> {
    conn: &'c Connection,
}

impl<'c> Repository<'c> for PerformerRepository<'c> {
    type Entity = Performer;

    fn conn(&self) -> &'c Connection {
        self.conn
    }
}

impl<'c> Queryable<'c> for PerformerRepository<'c> {
    type Criterion = PerformerCriterion;

    const SEARCH_COLUMNS: &'static [&'static str] = &["performers.name", "performers.aliases"];
    const SORT: SortSpec = SortSpec {
        default: "name",
        columns: &[
            ("name", "performers.name COLLATE NOCASE"),
            ("birthdate", "performers.birthdate"),
            ("rating", "performers.rating"),
            ("created_at", "performers.created_at"),
            ("updated_at", "performers.updated_at"),
        ],
        counts: &[
            ("scenes", "performers_scenes", "performer_id"),
            ("images", "performers_images", "performer_id"),
            ("galleries", "performers_galleries", "performer_id"),
            ("tags", "performers_tags", "performer_id"),
        ],
    };
}

impl<'c> PerformerRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn update(&self, partial: &PerformerPartial) -> Result<Performer, OperationError> {
        self.table().update(partial)
    }

    pub fn find_by_checksum(&self, checksum: &str) -> Result<Option<Performer>, OperationError> {
        self.table()
            .find_by("checksum", Value::Text(checksum.to_string()), false)
    }

    pub fn find_by_name(
        &self,
        name: &str,
        nocase: bool,
    ) -> Result<Option<Performer>, OperationError> {
        self.table()
            .find_by("name", Value::Text(name.to_string()), nocase)
    }

    pub fn find_by_names(
        &self,
        names: &[String],
        nocase: bool,
    ) -> Result<Vec<Performer>, OperationError> {
        let values = names.iter().map(|n| Value::Text(n.clone())).collect();
        self.table().find_all_by("name", values, nocase)
    }

    pub fn find_by_scene_id(&self, scene_id: i64) -> Result<Vec<Performer>, OperationError> {
        self.table().select(
            "SELECT performers.* FROM performers
             JOIN performers_scenes ON performers_scenes.performer_id = performers.id
             WHERE performers_scenes.scene_id = ?1 ORDER BY performers.name",
            vec![Value::Integer(scene_id)],
        )
    }

    // ── Relations ──

    pub fn get_tag_ids(&self, id: i64) -> Result<Vec<i64>, OperationError> {
        JoinRepository::new(self.conn, PERFORMER_TAGS).get_ids(id)
    }

    pub fn update_tags(&self, id: i64, tag_ids: &[i64]) -> Result<(), OperationError> {
        JoinRepository::new(self.conn, PERFORMER_TAGS).replace(id, tag_ids)
    }
}
