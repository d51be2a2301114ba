use mediagraph_catalog::{MovieScene, Scene, SceneCriterion, ScenePartial};
use rusqlite::types::Value;
use rusqlite::{Connection, Row, params};

use super::{Queryable, Repository};
use crate::criterion::{
    bool_criterion, count_criterion, fk_multi_criterion, int_criterion, joined_multi_criterion,
    missing_relation, missing_scalar, performer_tags_criterion, relation_count_sql,
    resolution_criterion, string_criterion,
};
use crate::filter::{CriterionHandler, FilterBuilder, FilterError};
use crate::query_builder::SortSpec;
use crate::repository::{
    Changes, CounterOp, Entity, JoinRepository, OperationError, Relation, atomically, set,
    update_counter,
};

const SCENE_TAGS: Relation = Relation::new("scenes_tags", "scene_id", "tag_id");
const SCENE_PERFORMERS: Relation = Relation::new("performers_scenes", "scene_id", "performer_id");
const SCENE_GALLERIES: Relation = Relation::new("scenes_galleries", "scene_id", "gallery_id");
const SCENE_MOVIES: Relation = Relation::new("movies_scenes", "scene_id", "movie_id");

const MISSING_SCALARS: &[&str] = &["title", "details", "url", "date", "rating", "oshash"];

impl Entity for Scene {
    const TABLE: &'static str = "scenes";
    const ENTITY_TYPE: &'static str = "scene";
    const COLUMNS: &'static [&'static str] = &[
        "checksum",
        "oshash",
        "path",
        "title",
        "details",
        "url",
        "date",
        "rating",
        "organized",
        "o_counter",
        "size",
        "duration",
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
            oshash: row.get("oshash")?,
            path: row.get("path")?,
            title: row.get("title")?,
            details: row.get("details")?,
            url: row.get("url")?,
            date: row.get("date")?,
            rating: row.get("rating")?,
            organized: row.get("organized")?,
            o_counter: row.get("o_counter")?,
            size: row.get("size")?,
            duration: row.get("duration")?,
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
            self.oshash.clone().into(),
            self.path.clone().into(),
            self.title.clone().into(),
            self.details.clone().into(),
            self.url.clone().into(),
            self.date.clone().into(),
            self.rating.into(),
            self.organized.into(),
            self.o_counter.into(),
            self.size.into(),
            self.duration.into(),
            self.width.into(),
            self.height.into(),
            self.studio_id.into(),
            self.created_at.clone().into(),
            self.updated_at.clone().into(),
        ]
    }
}

impl Changes for ScenePartial {
    fn id(&self) -> i64 {
        self.id
    }

    fn changes(&self) -> Vec<(&'static str, Value)> {
        let mut out = Vec::new();
        set(&mut out, "path", self.path.clone());
        set(&mut out, "title", self.title.clone());
        set(&mut out, "details", self.details.clone());
        set(&mut out, "url", self.url.clone());
        set(&mut out, "date", self.date.clone());
        set(&mut out, "rating", self.rating);
        set(&mut out, "organized", self.organized);
        set(&mut out, "size", self.size);
        set(&mut out, "duration", self.duration);
        set(&mut out, "width", self.width);
        set(&mut out, "height", self.height);
        set(&mut out, "studio_id", self.studio_id);
        set(&mut out, "updated_at", self.updated_at.clone());
        out
    }
}

impl CriterionHandler for SceneCriterion {
    fn apply(&self, f: &mut FilterBuilder) -> Result<(), FilterError> {
        let count = |r: &Relation| relation_count_sql("scenes", r.join_table, r.id_column);
        match self {
            Self::Path(c) => string_criterion(f, "scenes.path", c),
            Self::Title(c) => string_criterion(f, "scenes.title", c),
            Self::Details(c) => string_criterion(f, "scenes.details", c),
            Self::Checksum(c) => string_criterion(f, "scenes.checksum", c),
            Self::Rating(c) => int_criterion(f, "scenes.rating", c),
            Self::OCounter(c) => int_criterion(f, "scenes.o_counter", c),
            Self::Organized(v) => {
                bool_criterion(f, "scenes.organized", *v);
                Ok(())
            }
            Self::Duration(c) => int_criterion(f, "CAST(scenes.duration AS INTEGER)", c),
            Self::Resolution(c) => resolution_criterion(f, c),
            Self::HasMarkers(v) => {
                let exists = if *v { "EXISTS" } else { "NOT EXISTS" };
                f.add_where(
                    format!(
                        "{exists} (SELECT 1 FROM scene_markers WHERE scene_markers.scene_id = scenes.id)"
                    ),
                    vec![],
                );
                Ok(())
            }
            Self::IsMissing(field) => {
                let relation = match field.as_str() {
                    "studio" => {
                        f.add_where("scenes.studio_id IS NULL", vec![]);
                        return Ok(());
                    }
                    "performers" => &SCENE_PERFORMERS,
                    "tags" => &SCENE_TAGS,
                    "galleries" => &SCENE_GALLERIES,
                    "movie" | "movies" => &SCENE_MOVIES,
                    other => return missing_scalar(f, other, MISSING_SCALARS),
                };
                missing_relation(f, field, relation);
                Ok(())
            }
            Self::Tags(c) => joined_multi_criterion(f, "tags", &SCENE_TAGS, c),
            Self::TagCount(c) => count_criterion(f, "tag_count", &count(&SCENE_TAGS), c),
            Self::Performers(c) => joined_multi_criterion(f, "performers", &SCENE_PERFORMERS, c),
            Self::PerformerCount(c) => {
                count_criterion(f, "performer_count", &count(&SCENE_PERFORMERS), c)
            }
            Self::Studios(c) => fk_multi_criterion(f, "scenes.studio_id", c),
            Self::Movies(c) => joined_multi_criterion(f, "movies", &SCENE_MOVIES, c),
            Self::Galleries(c) => joined_multi_criterion(f, "galleries", &SCENE_GALLERIES, c),
            Self::PerformerTags(c) => performer_tags_criterion(f, &SCENE_PERFORMERS, c),
        }
    }
}

pub struct SceneRepository<'c> {
    conn: &'c Connection,
}

impl<'c> Repository<'c> for SceneRepository<'c> {
    type Entity = Scene;

    fn conn(&self) -> &'c Connection {
        self.conn
    }
}

impl<'c> Queryable<'c> for SceneRepository<'c> {
    type Criterion = SceneCriterion;

    const SEARCH_COLUMNS: &'static [&'static str] = &[
        "scenes.title",
        "scenes.details",
        "scenes.path",
        "scenes.checksum",
        "scenes.oshash",
    ];
    const SORT: SortSpec = SortSpec {
        default: "path",
        columns: &[
            ("path", "scenes.path"),
            ("title", "scenes.title COLLATE NOCASE"),
            ("date", "scenes.date"),
            ("rating", "scenes.rating"),
            ("o_counter", "scenes.o_counter"),
            ("duration", "scenes.duration"),
            ("filesize", "scenes.size"),
            ("created_at", "scenes.created_at"),
            ("updated_at", "scenes.updated_at"),
        ],
        counts: &[
            ("tags", "scenes_tags", "scene_id"),
            ("performers", "performers_scenes", "scene_id"),
            ("markers", "scene_markers", "scene_id"),
        ],
    };
}

impl<'c> SceneRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn update(&self, partial: &ScenePartial) -> Result<Scene, OperationError> {
        self.table().update(partial)
    }

    pub fn find_by_checksum(&self, checksum: &str) -> Result<Option<Scene>, OperationError> {
        self.table()
            .find_by("checksum", Value::Text(checksum.to_string()), false)
    }

    pub fn find_by_path(&self, path: &str) -> Result<Option<Scene>, OperationError> {
        self.table()
            .find_by("path", Value::Text(path.to_string()), false)
    }

    pub fn find_by_movie_id(&self, movie_id: i64) -> Result<Vec<Scene>, OperationError> {
        self.table().select(
            "SELECT scenes.* FROM scenes
             JOIN movies_scenes ON movies_scenes.scene_id = scenes.id
             WHERE movies_scenes.movie_id = ?1
             ORDER BY movies_scenes.scene_index, scenes.id",
            vec![Value::Integer(movie_id)],
        )
    }

    // ── Counters ──

    pub fn increment_o_counter(&self, id: i64) -> Result<i64, OperationError> {
        update_counter::<Scene>(self.conn, "o_counter", id, CounterOp::Increment)
    }

    /// Decrement, never below zero.
    pub fn decrement_o_counter(&self, id: i64) -> Result<i64, OperationError> {
        update_counter::<Scene>(self.conn, "o_counter", id, CounterOp::Decrement)
    }

    pub fn reset_o_counter(&self, id: i64) -> Result<i64, OperationError> {
        update_counter::<Scene>(self.conn, "o_counter", id, CounterOp::Reset)
    }

    // ── Relations ──

    pub fn get_tag_ids(&self, id: i64) -> Result<Vec<i64>, OperationError> {
        JoinRepository::new(self.conn, SCENE_TAGS).get_ids(id)
    }

    pub fn update_tags(&self, id: i64, tag_ids: &[i64]) -> Result<(), OperationError> {
        JoinRepository::new(self.conn, SCENE_TAGS).replace(id, tag_ids)
    }

    pub fn get_performer_ids(&self, id: i64) -> Result<Vec<i64>, OperationError> {
        JoinRepository::new(self.conn, SCENE_PERFORMERS).get_ids(id)
    }

    pub fn update_performers(&self, id: i64, performer_ids: &[i64]) -> Result<(), OperationError> {
        JoinRepository::new(self.conn, SCENE_PERFORMERS).replace(id, performer_ids)
    }

    pub fn get_gallery_ids(&self, id: i64) -> Result<Vec<i64>, OperationError> {
        JoinRepository::new(self.conn, SCENE_GALLERIES).get_ids(id)
    }

    pub fn update_galleries(&self, id: i64, gallery_ids: &[i64]) -> Result<(), OperationError> {
        JoinRepository::new(self.conn, SCENE_GALLERIES).replace(id, gallery_ids)
    }

    /// Movies the scene belongs to, with the scene's position in each.
    pub fn get_movies(&self, id: i64) -> Result<Vec<MovieScene>, OperationError> {
        let mut stmt = self.conn.prepare(
            "SELECT movie_id, scene_index FROM movies_scenes
             WHERE scene_id = ?1 ORDER BY movie_id",
        )?;
        let rows = stmt.query_map(params![id], |row| {
            Ok(MovieScene {
                movie_id: row.get(0)?,
                scene_index: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Replace the scene's movie memberships.
    pub fn update_movies(&self, id: i64, movies: &[MovieScene]) -> Result<(), OperationError> {
        atomically(self.conn, || {
            JoinRepository::new(self.conn, SCENE_MOVIES).destroy(id)?;
            for movie in movies {
                self.conn.execute(
                    "INSERT OR REPLACE INTO movies_scenes (movie_id, scene_id, scene_index)
                     VALUES (?1, ?2, ?3)",
                    params![movie.movie_id, id, movie.scene_index],
                )?;
            }
            Ok(())
        })
    }
}
