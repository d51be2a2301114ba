use mediagraph_catalog::{SceneMarker, SceneMarkerPartial};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};

use super::Repository;
use crate::repository::{Changes, Entity, JoinRepository, OperationError, Relation, set};

const MARKER_TAGS: Relation = Relation::new("scene_markers_tags", "scene_marker_id", "tag_id");

impl Entity for SceneMarker {
    const TABLE: &'static str = "scene_markers";
    const ENTITY_TYPE: &'static str = "scene marker";
    const COLUMNS: &'static [&'static str] = &[
        "scene_id",
        "title",
        "seconds",
        "primary_tag_id",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            scene_id: row.get("scene_id")?,
            title: row.get("title")?,
            seconds: row.get("seconds")?,
            primary_tag_id: row.get("primary_tag_id")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.scene_id.into(),
            self.title.clone().into(),
            self.seconds.into(),
            self.primary_tag_id.into(),
            self.created_at.clone().into(),
            self.updated_at.clone().into(),
        ]
    }
}

impl Changes for SceneMarkerPartial {
    fn id(&self) -> i64 {
        self.id
    }

    fn changes(&self) -> Vec<(&'static str, Value)> {
        let mut out = Vec::new();
        set(&mut out, "title", self.title.clone());
        set(&mut out, "seconds", self.seconds);
        set(&mut out, "primary_tag_id", self.primary_tag_id);
        set(&mut out, "updated_at", self.updated_at.clone());
        out
    }
}

pub struct SceneMarkerRepository<'c> {
    conn: &'c Connection,
}

impl<'c> Repository<'c> for SceneMarkerRepository<'c> {
    type Entity = SceneMarker;

    fn conn(&self) -> &'c Connection {
        self.conn
    }
}

impl<'c> SceneMarkerRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn update(&self, partial: &SceneMarkerPartial) -> Result<SceneMarker, OperationError> {
        self.table().update(partial)
    }

    /// Markers of a scene in playback order.
    pub fn find_by_scene_id(&self, scene_id: i64) -> Result<Vec<SceneMarker>, OperationError> {
        self.table().select(
            "SELECT * FROM scene_markers WHERE scene_id = ?1 ORDER BY seconds, id",
            vec![Value::Integer(scene_id)],
        )
    }

    pub fn get_tag_ids(&self, id: i64) -> Result<Vec<i64>, OperationError> {
        JoinRepository::new(self.conn, MARKER_TAGS).get_ids(id)
    }

    pub fn update_tags(&self, id: i64, tag_ids: &[i64]) -> Result<(), OperationError> {
        JoinRepository::new(self.conn, MARKER_TAGS).replace(id, tag_ids)
    }
}
