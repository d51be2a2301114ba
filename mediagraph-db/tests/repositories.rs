use mediagraph_catalog::*;
use mediagraph_db::{OperationError, Repository, TxnScope, open_memory};

fn scene(checksum: &str, path: &str) -> Scene {
    Scene {
        id: 0,
        checksum: checksum.to_string(),
        oshash: None,
        path: path.to_string(),
        title: None,
        details: None,
        url: None,
        date: None,
        rating: None,
        organized: false,
        o_counter: 0,
        size: None,
        duration: None,
        width: None,
        height: None,
        studio_id: None,
        created_at: "2024-01-01T00:00:00+00:00".to_string(),
        updated_at: "2024-01-01T00:00:00+00:00".to_string(),
    }
}

#[test]
fn create_find_and_destroy() {
    let conn = open_memory().unwrap();
    let txn = TxnScope::begin(&conn).unwrap();
    let tags = txn.tags();

    let created = tags.create(&Tag::named("Outdoor")).unwrap();
    assert!(created.id > 0);
    assert_eq!(created.checksum, checksum_from_name("Outdoor"));
    assert_eq!(tags.find(created.id).unwrap(), Some(created.clone()));

    tags.destroy(created.id).unwrap();
    assert_eq!(tags.find(created.id).unwrap(), None);
    assert!(matches!(
        tags.destroy(created.id),
        Err(OperationError::NotFound { .. })
    ));
}

#[test]
fn find_many_fails_on_missing_id() {
    let conn = open_memory().unwrap();
    let txn = TxnScope::begin(&conn).unwrap();
    let a = txn.tags().create(&Tag::named("a")).unwrap();
    let b = txn.tags().create(&Tag::named("b")).unwrap();

    let found = txn.tags().find_many(&[b.id, a.id]).unwrap();
    assert_eq!(found, vec![b.clone(), a.clone()]);

    let err = txn.tags().find_many(&[a.id, 999]).unwrap_err();
    assert!(matches!(err, OperationError::MissingRequired { id: 999, .. }));
}

#[test]
fn partial_update_only_touches_set_fields() {
    let conn = open_memory().unwrap();
    let txn = TxnScope::begin(&conn).unwrap();
    let performers = txn.performers();

    let mut p = Performer::named("Jane");
    p.country = Some("NZ".into());
    p.rating = Some(4);
    let p = performers.create(&p).unwrap();

    let updated = performers
        .update(&PerformerPartial {
            id: p.id,
            rating: Some(None),
            favorite: Some(true),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(updated.rating, None);
    assert!(updated.favorite);
    assert_eq!(updated.country.as_deref(), Some("NZ"));
    assert_eq!(updated.name, "Jane");
}

#[test]
fn full_update_clears_absent_fields() {
    let conn = open_memory().unwrap();
    let txn = TxnScope::begin(&conn).unwrap();
    let studios = txn.studios();

    let mut s = Studio::named("Acme");
    s.url = Some("https://acme.example".into());
    let mut s = studios.create(&s).unwrap();

    s.url = None;
    s.details = Some("details".into());
    let stored = studios.update_full(&s).unwrap();
    assert_eq!(stored.url, None);
    assert_eq!(stored.details.as_deref(), Some("details"));
}

#[test]
fn update_of_missing_row_is_not_found() {
    let conn = open_memory().unwrap();
    let txn = TxnScope::begin(&conn).unwrap();
    let err = txn
        .tags()
        .update(&TagPartial {
            id: 42,
            name: Some("x".into()),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, OperationError::NotFound { id: 42, .. }));
}

#[test]
fn find_by_name_case_sensitivity() {
    let conn = open_memory().unwrap();
    let txn = TxnScope::begin(&conn).unwrap();
    txn.tags().create(&Tag::named("Blonde")).unwrap();
    txn.tags().create(&Tag::named("Red")).unwrap();

    assert!(txn.tags().find_by_name("blonde", false).unwrap().is_none());
    assert!(txn.tags().find_by_name("blonde", true).unwrap().is_some());

    let names = vec!["RED".to_string(), "blonde".to_string(), "green".to_string()];
    assert_eq!(txn.tags().find_by_names(&names, true).unwrap().len(), 2);
    assert!(txn.tags().find_by_names(&names, false).unwrap().is_empty());
}

#[test]
fn relation_replace_is_exact_set() {
    let conn = open_memory().unwrap();
    let txn = TxnScope::begin(&conn).unwrap();
    let t: Vec<i64> = ["a", "b", "c", "d"]
        .iter()
        .map(|n| txn.tags().create(&Tag::named(n)).unwrap().id)
        .collect();
    let s = txn.scenes().create(&scene("s1", "/s1.mp4")).unwrap();

    txn.scenes().update_tags(s.id, &[t[0], t[1], t[2]]).unwrap();
    txn.scenes().update_tags(s.id, &[t[3], t[1]]).unwrap();
    let mut ids = txn.scenes().get_tag_ids(s.id).unwrap();
    ids.sort();
    assert_eq!(ids, vec![t[1], t[3]]);

    txn.scenes().update_tags(s.id, &[]).unwrap();
    assert!(txn.scenes().get_tag_ids(s.id).unwrap().is_empty());
}

#[test]
fn failed_replace_keeps_previous_links() {
    let conn = open_memory().unwrap();
    let txn = TxnScope::begin(&conn).unwrap();
    let tag = txn.tags().create(&Tag::named("a")).unwrap();
    let s = txn.scenes().create(&scene("s1", "/s1.mp4")).unwrap();
    txn.scenes().update_tags(s.id, &[tag.id]).unwrap();

    // 999 violates the foreign key.
    assert!(txn.scenes().update_tags(s.id, &[999]).is_err());
    assert_eq!(txn.scenes().get_tag_ids(s.id).unwrap(), vec![tag.id]);
}

#[test]
fn scene_movies_keep_index() {
    let conn = open_memory().unwrap();
    let txn = TxnScope::begin(&conn).unwrap();
    let m1 = txn.movies().create(&Movie::named("First")).unwrap();
    let m2 = txn.movies().create(&Movie::named("Second")).unwrap();
    let s = txn.scenes().create(&scene("s1", "/s1.mp4")).unwrap();

    let movies = vec![
        MovieScene {
            movie_id: m1.id,
            scene_index: Some(2),
        },
        MovieScene {
            movie_id: m2.id,
            scene_index: None,
        },
    ];
    txn.scenes().update_movies(s.id, &movies).unwrap();
    assert_eq!(txn.scenes().get_movies(s.id).unwrap(), movies);
    assert_eq!(txn.scenes().find_by_movie_id(m1.id).unwrap().len(), 1);
}

#[test]
fn o_counter_never_negative() {
    let conn = open_memory().unwrap();
    let txn = TxnScope::begin(&conn).unwrap();
    let s = txn.scenes().create(&scene("s1", "/s1.mp4")).unwrap();
    let scenes = txn.scenes();

    assert_eq!(scenes.decrement_o_counter(s.id).unwrap(), 0);
    assert_eq!(scenes.increment_o_counter(s.id).unwrap(), 1);
    assert_eq!(scenes.increment_o_counter(s.id).unwrap(), 2);
    assert_eq!(scenes.decrement_o_counter(s.id).unwrap(), 1);
    assert_eq!(scenes.decrement_o_counter(s.id).unwrap(), 0);
    assert_eq!(scenes.decrement_o_counter(s.id).unwrap(), 0);
    assert_eq!(scenes.increment_o_counter(s.id).unwrap(), 1);
    assert_eq!(scenes.reset_o_counter(s.id).unwrap(), 0);

    assert!(matches!(
        scenes.increment_o_counter(999),
        Err(OperationError::NotFound { .. })
    ));
}

#[test]
fn image_counters_and_galleries() {
    let conn = open_memory().unwrap();
    let txn = TxnScope::begin(&conn).unwrap();
    let gallery = txn.galleries().create(&Gallery::with_checksum("g1")).unwrap();
    let image = txn
        .images()
        .create(&Image {
            id: 0,
            checksum: "i1".into(),
            path: "/i1.jpg".into(),
            title: None,
            rating: None,
            organized: false,
            o_counter: 0,
            size: None,
            width: Some(800),
            height: Some(600),
            studio_id: None,
            created_at: String::new(),
            updated_at: String::new(),
        })
        .unwrap();

    assert_eq!(txn.images().increment_o_counter(image.id).unwrap(), 1);
    assert_eq!(txn.images().decrement_o_counter(image.id).unwrap(), 0);
    assert_eq!(txn.images().decrement_o_counter(image.id).unwrap(), 0);

    txn.images().update_galleries(image.id, &[gallery.id]).unwrap();
    assert_eq!(txn.galleries().get_image_ids(gallery.id).unwrap(), vec![image.id]);
    assert_eq!(txn.images().find_by_gallery_id(gallery.id).unwrap().len(), 1);
    assert_eq!(txn.images().find_by_path("/i1.jpg").unwrap(), Some(image));
}

#[test]
fn studio_children() {
    let conn = open_memory().unwrap();
    let txn = TxnScope::begin(&conn).unwrap();
    let parent = txn.studios().create(&Studio::named("Parent")).unwrap();
    let mut child = Studio::named("Child");
    child.parent_id = Some(parent.id);
    let child = txn.studios().create(&child).unwrap();

    let children = txn.studios().find_children(parent.id).unwrap();
    assert_eq!(children, vec![child.clone()]);

    // Deleting the parent detaches the child.
    txn.studios().destroy(parent.id).unwrap();
    let child = txn.studios().find(child.id).unwrap().unwrap();
    assert_eq!(child.parent_id, None);
}

#[test]
fn scene_markers_by_scene() {
    let conn = open_memory().unwrap();
    let txn = TxnScope::begin(&conn).unwrap();
    let tag = txn.tags().create(&Tag::named("Intro")).unwrap();
    let s = txn.scenes().create(&scene("s1", "/s1.mp4")).unwrap();

    for (title, seconds) in [("later", 90.0), ("first", 5.5)] {
        txn.scene_markers()
            .create(&SceneMarker {
                id: 0,
                scene_id: s.id,
                title: title.into(),
                seconds,
                primary_tag_id: tag.id,
                created_at: String::new(),
                updated_at: String::new(),
            })
            .unwrap();
    }
    let markers = txn.scene_markers().find_by_scene_id(s.id).unwrap();
    let titles: Vec<&str> = markers.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["first", "later"]);

    txn.scene_markers().update_tags(markers[0].id, &[tag.id]).unwrap();
    assert_eq!(txn.scene_markers().get_tag_ids(markers[0].id).unwrap(), vec![tag.id]);

    // Markers go with their scene.
    txn.scenes().destroy(s.id).unwrap();
    assert_eq!(txn.scene_markers().count().unwrap(), 0);
}

#[test]
fn scraped_items_create_and_list() {
    let conn = open_memory().unwrap();
    let txn = TxnScope::begin(&conn).unwrap();
    let item = ScrapedItem {
        id: 0,
        title: Some("Episode".into()),
        description: None,
        url: Some("https://example.com/e1".into()),
        date: None,
        rating: Some("4.5".into()),
        tags: Some("a,b".into()),
        models: None,
        episode: Some(1),
        gallery_filename: None,
        gallery_url: None,
        video_filename: None,
        video_url: None,
        studio_id: None,
        created_at: String::new(),
        updated_at: String::new(),
    };
    let stored = txn.scraped_items().create(&item).unwrap();
    assert_eq!(txn.scraped_items().all().unwrap(), vec![stored]);
}

#[test]
fn dropped_scope_rolls_back() {
    let conn = open_memory().unwrap();
    {
        let txn = TxnScope::begin(&conn).unwrap();
        txn.tags().create(&Tag::named("temporary")).unwrap();
    }
    let txn = TxnScope::begin(&conn).unwrap();
    assert_eq!(txn.tags().count().unwrap(), 0);
}
