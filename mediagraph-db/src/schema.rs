//! SQLite schema creation, migration and connection setup.

use std::sync::Arc;

use regex::Regex;
use rusqlite::Connection;
use rusqlite::functions::FunctionFlags;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Migration error: expected version {expected}, found {found}")]
    VersionMismatch { expected: i32, found: i32 },
}

/// Version written by `create_schema`; each migration step bumps it by one.
pub const CURRENT_VERSION: i32 = 1;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Create every entity and join table, then record the current version.
///
/// Idempotent; safe to call on an existing database.
pub fn create_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(SCHEMA_SQL)?;
    if get_schema_version(conn)? == 0 {
        set_schema_version(conn, CURRENT_VERSION)?;
    }
    Ok(())
}

/// Drop every catalog table and recreate an empty schema.
pub fn reset_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch("PRAGMA foreign_keys=OFF;")?;
    let tables: Vec<String> = {
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        )?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>()?
    };
    for table in &tables {
        conn.execute_batch(&format!("DROP TABLE IF EXISTS \"{table}\";"))?;
    }
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    log::info!("Dropped {} tables, recreating schema", tables.len());
    create_schema(conn)
}

/// Open the store at `path`, creating or migrating its schema as needed.
pub fn open_database(path: &std::path::Path) -> Result<Connection, SchemaError> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    add_regexp_function(&conn)?;

    let version = get_schema_version(&conn)?;
    if version == 0 {
        create_schema(&conn)?;
    } else if version != CURRENT_VERSION {
        migrate(&conn, version)?;
    }

    Ok(conn)
}

/// A fresh in-memory store with the full schema.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    add_regexp_function(&conn)?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Register `regexp(pattern, value)`, which backs SQLite's `REGEXP` operator.
///
/// The compiled pattern is cached per statement as auxiliary data. NULL
/// values never match.
fn add_regexp_function(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "regexp",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        move |ctx| {
            let re: Arc<Regex> = ctx.get_or_create_aux(0, |vr| -> Result<_, BoxError> {
                Ok(Regex::new(vr.as_str()?)?)
            })?;
            let is_match = {
                let text = ctx
                    .get_raw(1)
                    .as_str_or_null()
                    .map_err(|e| rusqlite::Error::UserFunctionError(e.into()))?;
                text.is_some_and(|t| re.is_match(t))
            };
            Ok(is_match)
        },
    )
}

/// Stored schema version; 0 for an empty database.
fn get_schema_version(conn: &Connection) -> Result<i32, SchemaError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Append `version` to the version history.
fn set_schema_version(conn: &Connection, version: i32) -> Result<(), SchemaError> {
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Step an older store forward one version at a time.
fn migrate(conn: &Connection, from_version: i32) -> Result<(), SchemaError> {
    if from_version > CURRENT_VERSION {
        return Err(SchemaError::VersionMismatch {
            expected: CURRENT_VERSION,
            found: from_version,
        });
    }

    let mut version = from_version;
    while version < CURRENT_VERSION {
        version += 1;
        log::info!("Migrating catalog schema to version {version}");
        set_schema_version(conn, version)?;
    }

    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Applied versions, newest last
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    checksum TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS performers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    checksum TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    gender TEXT,
    url TEXT,
    birthdate TEXT,
    death_date TEXT,
    ethnicity TEXT,
    country TEXT,
    career_length TEXT,
    aliases TEXT,
    favorite BOOLEAN NOT NULL DEFAULT 0,
    rating INTEGER,
    details TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_performers_name ON performers(name);

-- Studios form a hierarchy through parent_id
CREATE TABLE IF NOT EXISTS studios (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    checksum TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    url TEXT,
    parent_id INTEGER REFERENCES studios(id) ON DELETE SET NULL,
    rating INTEGER,
    details TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_studios_name ON studios(name);
CREATE INDEX IF NOT EXISTS idx_studios_parent ON studios(parent_id);

CREATE TABLE IF NOT EXISTS movies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    checksum TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    aliases TEXT,
    duration INTEGER,
    date TEXT,
    rating INTEGER,
    studio_id INTEGER REFERENCES studios(id) ON DELETE SET NULL,
    director TEXT,
    synopsis TEXT,
    url TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_movies_name ON movies(name);

CREATE TABLE IF NOT EXISTS galleries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    checksum TEXT NOT NULL UNIQUE,
    path TEXT,
    title TEXT,
    url TEXT,
    date TEXT,
    details TEXT,
    rating INTEGER,
    organized BOOLEAN NOT NULL DEFAULT 0,
    studio_id INTEGER REFERENCES studios(id) ON DELETE SET NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_galleries_path ON galleries(path);

CREATE TABLE IF NOT EXISTS scenes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    checksum TEXT NOT NULL UNIQUE,
    oshash TEXT,
    path TEXT NOT NULL,
    title TEXT,
    details TEXT,
    url TEXT,
    date TEXT,
    rating INTEGER,
    organized BOOLEAN NOT NULL DEFAULT 0,
    o_counter INTEGER NOT NULL DEFAULT 0 CHECK (o_counter >= 0),
    size INTEGER,
    duration REAL,
    width INTEGER,
    height INTEGER,
    studio_id INTEGER REFERENCES studios(id) ON DELETE SET NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_scenes_path ON scenes(path);
CREATE INDEX IF NOT EXISTS idx_scenes_studio ON scenes(studio_id);

CREATE TABLE IF NOT EXISTS scene_markers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    scene_id INTEGER NOT NULL REFERENCES scenes(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    seconds REAL NOT NULL,
    primary_tag_id INTEGER NOT NULL REFERENCES tags(id),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_scene_markers_scene ON scene_markers(scene_id);

CREATE TABLE IF NOT EXISTS images (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    checksum TEXT NOT NULL UNIQUE,
    path TEXT NOT NULL,
    title TEXT,
    rating INTEGER,
    organized BOOLEAN NOT NULL DEFAULT 0,
    o_counter INTEGER NOT NULL DEFAULT 0 CHECK (o_counter >= 0),
    size INTEGER,
    width INTEGER,
    height INTEGER,
    studio_id INTEGER REFERENCES studios(id) ON DELETE SET NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_images_path ON images(path);
CREATE INDEX IF NOT EXISTS idx_images_studio ON images(studio_id);

CREATE TABLE IF NOT EXISTS scraped_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT,
    description TEXT,
    url TEXT,
    date TEXT,
    rating TEXT,
    tags TEXT,
    models TEXT,
    episode INTEGER,
    gallery_filename TEXT,
    gallery_url TEXT,
    video_filename TEXT,
    video_url TEXT,
    studio_id INTEGER REFERENCES studios(id) ON DELETE SET NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Join tables
CREATE TABLE IF NOT EXISTS performers_tags (
    performer_id INTEGER NOT NULL REFERENCES performers(id) ON DELETE CASCADE,
    tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    PRIMARY KEY (performer_id, tag_id)
);

CREATE TABLE IF NOT EXISTS performers_scenes (
    performer_id INTEGER NOT NULL REFERENCES performers(id) ON DELETE CASCADE,
    scene_id INTEGER NOT NULL REFERENCES scenes(id) ON DELETE CASCADE,
    PRIMARY KEY (performer_id, scene_id)
);
CREATE INDEX IF NOT EXISTS idx_performers_scenes_scene ON performers_scenes(scene_id);

CREATE TABLE IF NOT EXISTS performers_images (
    performer_id INTEGER NOT NULL REFERENCES performers(id) ON DELETE CASCADE,
    image_id INTEGER NOT NULL REFERENCES images(id) ON DELETE CASCADE,
    PRIMARY KEY (performer_id, image_id)
);
CREATE INDEX IF NOT EXISTS idx_performers_images_image ON performers_images(image_id);

CREATE TABLE IF NOT EXISTS performers_galleries (
    performer_id INTEGER NOT NULL REFERENCES performers(id) ON DELETE CASCADE,
    gallery_id INTEGER NOT NULL REFERENCES galleries(id) ON DELETE CASCADE,
    PRIMARY KEY (performer_id, gallery_id)
);
CREATE INDEX IF NOT EXISTS idx_performers_galleries_gallery ON performers_galleries(gallery_id);

CREATE TABLE IF NOT EXISTS scenes_tags (
    scene_id INTEGER NOT NULL REFERENCES scenes(id) ON DELETE CASCADE,
    tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    PRIMARY KEY (scene_id, tag_id)
);
CREATE INDEX IF NOT EXISTS idx_scenes_tags_tag ON scenes_tags(tag_id);

CREATE TABLE IF NOT EXISTS images_tags (
    image_id INTEGER NOT NULL REFERENCES images(id) ON DELETE CASCADE,
    tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    PRIMARY KEY (image_id, tag_id)
);
CREATE INDEX IF NOT EXISTS idx_images_tags_tag ON images_tags(tag_id);

CREATE TABLE IF NOT EXISTS galleries_tags (
    gallery_id INTEGER NOT NULL REFERENCES galleries(id) ON DELETE CASCADE,
    tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    PRIMARY KEY (gallery_id, tag_id)
);
CREATE INDEX IF NOT EXISTS idx_galleries_tags_tag ON galleries_tags(tag_id);

CREATE TABLE IF NOT EXISTS scene_markers_tags (
    scene_marker_id INTEGER NOT NULL REFERENCES scene_markers(id) ON DELETE CASCADE,
    tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    PRIMARY KEY (scene_marker_id, tag_id)
);

CREATE TABLE IF NOT EXISTS scenes_galleries (
    scene_id INTEGER NOT NULL REFERENCES scenes(id) ON DELETE CASCADE,
    gallery_id INTEGER NOT NULL REFERENCES galleries(id) ON DELETE CASCADE,
    PRIMARY KEY (scene_id, gallery_id)
);
CREATE INDEX IF NOT EXISTS idx_scenes_galleries_gallery ON scenes_galleries(gallery_id);

CREATE TABLE IF NOT EXISTS galleries_images (
    gallery_id INTEGER NOT NULL REFERENCES galleries(id) ON DELETE CASCADE,
    image_id INTEGER NOT NULL REFERENCES images(id) ON DELETE CASCADE,
    PRIMARY KEY (gallery_id, image_id)
);
CREATE INDEX IF NOT EXISTS idx_galleries_images_image ON galleries_images(image_id);

-- Scenes within a movie, with optional position
CREATE TABLE IF NOT EXISTS movies_scenes (
    movie_id INTEGER NOT NULL REFERENCES movies(id) ON DELETE CASCADE,
    scene_id INTEGER NOT NULL REFERENCES scenes(id) ON DELETE CASCADE,
    scene_index INTEGER,
    PRIMARY KEY (movie_id, scene_id)
);
CREATE INDEX IF NOT EXISTS idx_movies_scenes_scene ON movies_scenes(scene_id);
"#;
