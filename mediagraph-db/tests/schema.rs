use mediagraph_db::schema::{CURRENT_VERSION, create_schema};
use mediagraph_db::{Repository, TxnScope, open_database, open_memory, reset_schema};
use mediagraph_catalog::Tag;

#[test]
fn create_schema_in_memory() {
    let conn = open_memory().unwrap();
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(version, CURRENT_VERSION);
}

#[test]
fn schema_is_idempotent() {
    let conn = open_memory().unwrap();
    create_schema(&conn).unwrap();
}

#[test]
fn foreign_keys_enabled() {
    let conn = open_memory().unwrap();
    let fk: i32 = conn
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .unwrap();
    assert_eq!(fk, 1);
}

#[test]
fn all_tables_exist() {
    let conn = open_memory().unwrap();
    let tables = [
        "schema_version",
        "tags",
        "performers",
        "studios",
        "movies",
        "galleries",
        "scenes",
        "scene_markers",
        "images",
        "scraped_items",
        "performers_tags",
        "performers_scenes",
        "performers_images",
        "performers_galleries",
        "scenes_tags",
        "images_tags",
        "galleries_tags",
        "scene_markers_tags",
        "scenes_galleries",
        "galleries_images",
        "movies_scenes",
    ];
    for table in tables {
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
                [table],
                |row| row.get(0),
            )
            .unwrap();
        assert!(exists, "table '{}' should exist", table);
    }
}

#[test]
fn regexp_function_is_registered() {
    let conn = open_memory().unwrap();
    let matched: bool = conn
        .query_row("SELECT 'Blue Sky' REGEXP '^Blue\\s'", [], |row| row.get(0))
        .unwrap();
    assert!(matched);
    let null: Option<bool> = conn
        .query_row("SELECT NULL REGEXP 'x'", [], |row| row.get(0))
        .unwrap();
    assert_eq!(null, Some(false));
}

#[test]
fn o_counter_cannot_go_negative_at_store_level() {
    let conn = open_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO scenes (checksum, path, o_counter, created_at, updated_at)
         VALUES ('abc', '/a.mp4', -1, '', '')",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn reset_drops_all_rows() {
    let conn = open_memory().unwrap();
    let txn = TxnScope::begin(&conn).unwrap();
    txn.tags().create(&Tag::named("keep?")).unwrap();
    txn.commit().unwrap();

    reset_schema(&conn).unwrap();
    let txn = TxnScope::begin(&conn).unwrap();
    assert_eq!(txn.tags().count().unwrap(), 0);
}

#[test]
fn open_on_disk_database_twice() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.sqlite");
    {
        let conn = open_database(&path).unwrap();
        let txn = TxnScope::begin(&conn).unwrap();
        txn.tags().create(&Tag::named("persisted")).unwrap();
        txn.commit().unwrap();
    }
    let conn = open_database(&path).unwrap();
    let txn = TxnScope::begin(&conn).unwrap();
    assert!(txn.tags().find_by_name("persisted", false).unwrap().is_some());
}
