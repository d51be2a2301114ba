use std::fs;
use std::path::Path;

use mediagraph_catalog::{EntityKind, checksum_from_name};
use mediagraph_db::{Repository, TxnScope, open_memory};
use mediagraph_import::*;
use serde_json::{Value, json};
use tempfile::TempDir;

fn write_json(dir: &Path, rel: &str, value: &Value) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// Write an export holding only the given studios, in order.
fn studio_export(studios: &[(&str, Option<&str>)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let mut mappings = Vec::new();
    for (name, parent) in studios {
        let checksum = checksum_from_name(name);
        write_json(
            dir.path(),
            &format!("studios/{checksum}.json"),
            &json!({ "name": name, "parent_studio": parent }),
        );
        mappings.push(json!({ "name": name, "checksum": checksum }));
    }
    write_json(dir.path(), "mappings.json", &json!({ "studios": mappings }));
    write_json(dir.path(), "scraped.json", &json!([]));
    dir
}

fn import(conn: &rusqlite::Connection, dir: &Path, config: ImportConfig) -> ImportReport {
    ImportTask::new(conn, config).run(dir).unwrap()
}

/// Name of the stored parent of studio `name`.
fn parent_of(conn: &rusqlite::Connection, name: &str) -> Option<String> {
    let txn = TxnScope::begin(conn).unwrap();
    let studio = txn.studios().find_by_name(name, false).unwrap().unwrap();
    studio
        .parent_id
        .map(|id| txn.studios().find(id).unwrap().unwrap().name)
}

fn studio_result(report: &ImportReport, name: &str) -> ItemResult {
    report
        .find(EntityKind::Studio, &checksum_from_name(name))
        .cloned()
        .unwrap()
}

#[test]
fn child_before_parent_is_linked() {
    let conn = open_memory().unwrap();
    let export = studio_export(&[("B", Some("A")), ("A", None)]);
    let report = import(&conn, export.path(), ImportConfig::default());

    assert!(!report.has_failures());
    assert!(matches!(studio_result(&report, "A"), ItemResult::Created(_)));
    assert!(matches!(studio_result(&report, "B"), ItemResult::Created(_)));
    assert_eq!(parent_of(&conn, "B").as_deref(), Some("A"));
    assert_eq!(parent_of(&conn, "A"), None);
    assert!(report.warnings.is_empty());
}

#[test]
fn deep_chain_in_reverse_order() {
    let conn = open_memory().unwrap();
    let export = studio_export(&[
        ("D", Some("C")),
        ("C", Some("B")),
        ("B", Some("A")),
        ("A", None),
    ]);
    let report = import(&conn, export.path(), ImportConfig::default());

    assert!(!report.has_failures());
    assert_eq!(report.summary(EntityKind::Studio).created, 4);
    assert_eq!(parent_of(&conn, "D").as_deref(), Some("C"));
    assert_eq!(parent_of(&conn, "C").as_deref(), Some("B"));
    assert_eq!(parent_of(&conn, "B").as_deref(), Some("A"));
}

#[test]
fn siblings_wait_for_the_same_parent() {
    let conn = open_memory().unwrap();
    let export = studio_export(&[
        ("Kid One", Some("Parent")),
        ("Kid Two", Some("Parent")),
        ("Parent", None),
    ]);
    let report = import(&conn, export.path(), ImportConfig::default());

    assert!(!report.has_failures());
    assert_eq!(parent_of(&conn, "Kid One").as_deref(), Some("Parent"));
    assert_eq!(parent_of(&conn, "Kid Two").as_deref(), Some("Parent"));
}

#[test]
fn parent_already_stored_resolves_immediately() {
    let conn = open_memory().unwrap();
    {
        let txn = TxnScope::begin(&conn).unwrap();
        txn.studios()
            .create(&mediagraph_catalog::Studio::named("Existing"))
            .unwrap();
        txn.commit().unwrap();
    }
    let export = studio_export(&[("Child", Some("Existing"))]);
    let report = import(&conn, export.path(), ImportConfig::default());

    assert!(!report.has_failures());
    assert_eq!(parent_of(&conn, "Child").as_deref(), Some("Existing"));
}

#[test]
fn orphan_becomes_root_with_warning() {
    let conn = open_memory().unwrap();
    let export = studio_export(&[("Orphan", Some("Ghost"))]);
    let report = import(&conn, export.path(), ImportConfig::default());

    // The orphan is kept even under the Fail policy.
    assert!(!report.has_failures());
    assert!(matches!(studio_result(&report, "Orphan"), ItemResult::Created(_)));
    assert_eq!(parent_of(&conn, "Orphan"), None);
    assert!(report.warnings.iter().any(|w| w.contains("Ghost")));

    let txn = TxnScope::begin(&conn).unwrap();
    assert!(txn.studios().find_by_name("Ghost", false).unwrap().is_none());
}

#[test]
fn orphan_under_create_gets_placeholder_parent() {
    let conn = open_memory().unwrap();
    let export = studio_export(&[("Orphan", Some("Ghost"))]);
    let config = ImportConfig {
        missing_ref_behaviour: MissingRefBehaviour::Create,
        ..Default::default()
    };
    let report = import(&conn, export.path(), config);

    assert!(!report.has_failures());
    assert_eq!(parent_of(&conn, "Orphan").as_deref(), Some("Ghost"));
    // Only the manifest entry is reported; the placeholder is a warning.
    assert_eq!(report.items(EntityKind::Studio).len(), 1);
    assert!(report.warnings.iter().any(|w| w.contains("Ghost")));
}

#[test]
fn cycle_is_broken_deterministically() {
    let conn = open_memory().unwrap();
    let export = studio_export(&[("A", Some("B")), ("B", Some("A"))]);
    let report = import(&conn, export.path(), ImportConfig::default());

    assert!(!report.has_failures());
    assert_eq!(report.summary(EntityKind::Studio).created, 2);
    // "B" waits on the smallest parent name, so it is drained first as a
    // root and "A" then attaches to it.
    assert_eq!(parent_of(&conn, "B"), None);
    assert_eq!(parent_of(&conn, "A").as_deref(), Some("B"));
    assert!(!report.warnings.is_empty());
}

#[test]
fn self_parent_is_imported_as_root() {
    let conn = open_memory().unwrap();
    let export = studio_export(&[("Loop", Some("Loop"))]);
    let report = import(&conn, export.path(), ImportConfig::default());

    assert!(!report.has_failures());
    assert_eq!(parent_of(&conn, "Loop"), None);
    assert!(report.warnings.iter().any(|w| w.contains("Loop")));
}

#[test]
fn children_of_orphans_are_resolved() {
    let conn = open_memory().unwrap();
    let export = studio_export(&[("Grandchild", Some("Orphan")), ("Orphan", Some("Ghost"))]);
    let report = import(&conn, export.path(), ImportConfig::default());

    assert!(!report.has_failures());
    assert_eq!(parent_of(&conn, "Orphan"), None);
    assert_eq!(parent_of(&conn, "Grandchild").as_deref(), Some("Orphan"));
}
