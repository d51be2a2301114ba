use mediagraph_catalog::{Movie, MovieCriterion, MoviePartial};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};

use super::{Queryable, Repository};
use crate::criterion::{
    count_criterion, fk_multi_criterion, int_criterion, missing_relation, missing_scalar,
    relation_count_sql, string_criterion,
};
use crate::filter::{CriterionHandler, FilterBuilder, FilterError};
use crate::query_builder::SortSpec;
use crate::repository::{Changes, Entity, OperationError, Relation, set};

const MOVIE_SCENES: Relation = Relation::new("movies_scenes", "movie_id", "scene_id");

const MISSING_SCALARS: &[&str] = &[
    "aliases", "duration", "date", "rating", "director", "synopsis", "url",
];

impl Entity for Movie {
    const TABLE: &'static str = "movies";
    const ENTITY_TYPE: &'static str = "movie";
    const COLUMNS: &'static [&'static str] = &[
        "checksum",
        "name",
        "aliases",
        "duration",
        "date",
        "rating",
        "studio_id",
        "director",
        "synopsis",
        "url",
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
            aliases: row.get("aliases")?,
            duration: row.get("duration")?,
            date: row.get("date")?,
            rating: row.get("rating")?,
            studio_id: row.get("studio_id")?,
            director: row.get("director")?,
            synopsis: row.get("synopsis")?,
            url: row.get("url")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.checksum.clone().into(),
            self.name.clone().into(),
            self.aliases.clone().into(),
            self.duration.into(),
            self.date.clone().into(),
            self.rating.into(),
            self.studio_id.into(),
            self.director.clone().into(),
            self.synopsis.clone().into(),
            self.url.clone().into(),
            self.created_at.clone().into(),
            self.updated_at.clone().into(),
        ]
    }
}

impl Changes for MoviePartial {
    fn id(&self) -> i64 {
        self.id
    }

    fn changes(&self) -> Vec<(&'static str, Value)> {
        let mut out = Vec::new();
        set(&mut out, "name", self.name.clone());
        set(&mut out, "aliases", self.aliases.clone());
        set(&mut out, "duration", self.duration);
        set(&mut out, "date", self.date.clone());
        set(&mut out, "rating", self.rating);
        set(&mut out, "studio_id", self.studio_id);
        set(&mut out, "director", self.director.clone());
        set(&mut out, "synopsis", self.synopsis.clone());
        set(&mut out, "url", self.url.clone());
        set(&mut out, "updated_at", self.updated_at.clone());
        out
    }
}

impl CriterionHandler for MovieCriterion {
    fn apply(&self, f: &mut FilterBuilder) -> Result<(), FilterError> {
        match self {
            Self::Name(c) => string_criterion(f, "movies.name", c),
            Self::Director(c) => string_criterion(f, "movies.director", c),
            Self::Synopsis(c) => string_criterion(f, "movies.synopsis", c),
            Self::Url(c) => string_criterion(f, "movies.url", c),
            Self::Rating(c) => int_criterion(f, "movies.rating", c),
            Self::Duration(c) => int_criterion(f, "movies.duration", c),
            Self::IsMissing(field) => match field.as_str() {
                "studio" => {
                    f.add_where("movies.studio_id IS NULL", vec![]);
                    Ok(())
                }
                "scenes" => {
                    missing_relation(f, field, &MOVIE_SCENES);
                    Ok(())
                }
                other => missing_scalar(f, other, MISSING_SCALARS),
            },
            Self::Studios(c) => fk_multi_criterion(f, "movies.studio_id", c),
            Self::SceneCount(c) => count_criterion(
                f,
                "scene_count",
                &relation_count_sql("movies", MOVIE_SCENES.join_table, MOVIE_SCENES.id_column),
                c,
            ),
        }
    }
}

pub struct MovieRepository<'c> {
    conn: &'c Connection,
}

impl<'c> Repository<'c> for MovieRepository<'c> {
    type Entity = Movie;

    fn conn(&self) -> &'c Connection {
        self.conn
    }
}

impl<'c> Queryable<'c> for MovieRepository<'c> {
    type Criterion = MovieCriterion;

    const SEARCH_COLUMNS: &'static [&'static str] = &["movies.name", "movies.aliases"];
    const SORT: SortSpec = SortSpec {
        default: "name",
        columns: &[
            ("name", "movies.name COLLATE NOCASE"),
            ("date", "movies.date"),
            ("duration", "movies.duration"),
            ("rating", "movies.rating"),
            ("created_at", "movies.created_at"),
            ("updated_at", "movies.updated_at"),
        ],
        counts: &[("scenes", "movies_scenes", "movie_id")],
    };
}

impl<'c> MovieRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn update(&self, partial: &MoviePartial) -> Result<Movie, OperationError> {
        self.table().update(partial)
    }

    pub fn find_by_checksum(&self, checksum: &str) -> Result<Option<Movie>, OperationError> {
        self.table()
            .find_by("checksum", Value::Text(checksum.to_string()), false)
    }

    pub fn find_by_name(&self, name: &str, nocase: bool) -> Result<Option<Movie>, OperationError> {
        self.table()
            .find_by("name", Value::Text(name.to_string()), nocase)
    }

    pub fn find_by_names(
        &self,
        names: &[String],
        nocase: bool,
    ) -> Result<Vec<Movie>, OperationError> {
        let values = names.iter().map(|n| Value::Text(n.clone())).collect();
        self.table().find_all_by("name", values, nocase)
    }
}
