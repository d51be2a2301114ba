use mediagraph_catalog::*;
use std::fs;

fn write(dir: &std::path::Path, rel: &str, contents: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn load_manifest_and_records() {
    let tmp = tempfile::tempdir().unwrap();
    write(
        tmp.path(),
        "mappings.json",
        r#"{
            "studios": [{"name": "Acme", "checksum": "abc"}],
            "scenes": [{"path": "/media/a.mp4", "checksum": "s1"}]
        }"#,
    );
    write(
        tmp.path(),
        "studios/abc.json",
        r#"{"name": "Acme", "parent_studio": "Acme Group", "rating": 4}"#,
    );

    let manifest = load_manifest(tmp.path()).unwrap();
    assert_eq!(manifest.entries(EntityKind::Studio).len(), 1);
    assert!(manifest.entries(EntityKind::Tag).is_empty());
    assert_eq!(
        manifest.entries(EntityKind::Scene)[0].path.as_deref(),
        Some("/media/a.mp4")
    );

    let studio: StudioRecord = load_record(tmp.path(), EntityKind::Studio, "abc").unwrap();
    assert_eq!(studio.name, "Acme");
    assert_eq!(studio.parent_studio.as_deref(), Some("Acme Group"));
    assert_eq!(studio.rating, Some(4));
}

#[test]
fn missing_manifest_is_io_error() {
    let tmp = tempfile::tempdir().unwrap();
    let err = load_manifest(tmp.path()).unwrap_err();
    assert!(matches!(err, JsonError::Io { .. }));
}

#[test]
fn missing_scraped_is_none() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(load_scraped(tmp.path()).unwrap().is_none());

    write(tmp.path(), "scraped.json", r#"[{"title": "t", "studio": "Acme"}]"#);
    let scraped = load_scraped(tmp.path()).unwrap().unwrap();
    assert_eq!(scraped.len(), 1);
    assert_eq!(scraped[0].studio.as_deref(), Some("Acme"));
}

#[test]
fn malformed_record_is_parse_error() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "tags/t1.json", "{not json");
    let err = load_record::<TagRecord>(tmp.path(), EntityKind::Tag, "t1").unwrap_err();
    assert!(matches!(err, JsonError::Parse { .. }));
}

#[test]
fn checksum_from_name_is_md5_hex() {
    assert_eq!(checksum_from_name("abc"), "900150983cd24fb0d6963f7d28e17f72");
    assert_eq!(Tag::named("abc").checksum, checksum_from_name("abc"));
}
