use mediagraph_catalog::*;
use mediagraph_db::{
    FilterError, OperationError, Queryable, Repository, TxnScope, open_memory,
};
use rusqlite::Connection;

use CriterionModifier::*;

struct Fixture {
    conn: Connection,
    tags: [i64; 3],
    scenes: [i64; 4],
    studio: i64,
    performer: i64,
}

/// Four scenes:
///
/// | scene | title | tags   | studio | size      | rating |
/// |-------|-------|--------|--------|-----------|--------|
/// | 0     | one   | a, b   | acme   | 1920x1080 | 5      |
/// | 1     | two   | a      | -      | 1280x720  | 3      |
/// | 2     | three | b, c   | acme   | 640x480   | -      |
/// | 3     | four  | -      | -      | -         | 1      |
///
/// Performer "p" (tag c) appears in scene 1.
fn fixture() -> Fixture {
    let conn = open_memory().unwrap();
    let txn = TxnScope::begin(&conn).unwrap();
    let tag = |n: &str| txn.tags().create(&Tag::named(n)).unwrap().id;
    let tags = [tag("a"), tag("b"), tag("c")];
    let studio = txn.studios().create(&Studio::named("acme")).unwrap().id;

    let rows = [
        ("one", vec![tags[0], tags[1]], Some(studio), Some((1920, 1080)), Some(5)),
        ("two", vec![tags[0]], None, Some((1280, 720)), Some(3)),
        ("three", vec![tags[1], tags[2]], Some(studio), Some((640, 480)), None),
        ("four", vec![], None, None, Some(1)),
    ];
    let mut scenes = [0; 4];
    for (i, (title, scene_tags, studio_id, size, rating)) in rows.into_iter().enumerate() {
        let s = txn
            .scenes()
            .create(&Scene {
                id: 0,
                checksum: format!("c{i}"),
                oshash: None,
                path: format!("/media/{title}.mp4"),
                title: Some(title.to_string()),
                details: None,
                url: None,
                date: None,
                rating,
                organized: i % 2 == 0,
                o_counter: 0,
                size: None,
                duration: Some(60.0 * (i as f64 + 1.0)),
                width: size.map(|(w, _)| w),
                height: size.map(|(_, h)| h),
                studio_id,
                created_at: String::new(),
                updated_at: String::new(),
            })
            .unwrap();
        txn.scenes().update_tags(s.id, &scene_tags).unwrap();
        scenes[i] = s.id;
    }

    let p = txn.performers().create(&Performer::named("p")).unwrap();
    txn.performers().update_tags(p.id, &[tags[2]]).unwrap();
    txn.scenes().update_performers(scenes[1], &[p.id]).unwrap();

    txn.commit().unwrap();
    Fixture {
        conn,
        tags,
        scenes,
        studio,
        performer: p.id,
    }
}

/// Ids of matching scenes (sorted) after checking that find and count agree.
fn matching(fx: &Fixture, filter: &SceneFilter) -> Vec<i64> {
    let txn = TxnScope::begin(&fx.conn).unwrap();
    let (scenes, total) = txn.scenes().query(Some(filter), &FindFilter::all()).unwrap();
    let count = txn.scenes().query_count(Some(filter), &FindFilter::all()).unwrap();
    assert_eq!(scenes.len() as i64, total);
    assert_eq!(count, total);
    let mut ids: Vec<i64> = scenes.iter().map(|s| s.id).collect();
    ids.sort();
    ids
}

fn one(c: SceneCriterion) -> SceneFilter {
    FilterNode::new(vec![c])
}

fn tags(fx: &Fixture, idx: &[usize], modifier: CriterionModifier) -> SceneCriterion {
    SceneCriterion::Tags(MultiCriterion::new(
        idx.iter().map(|&i| fx.tags[i]).collect(),
        modifier,
    ))
}

fn scenes(fx: &Fixture, idx: &[usize]) -> Vec<i64> {
    idx.iter().map(|&i| fx.scenes[i]).collect()
}

#[test]
fn includes_any() {
    let fx = fixture();
    assert_eq!(matching(&fx, &one(tags(&fx, &[0, 2], Includes))), scenes(&fx, &[0, 1, 2]));
}

#[test]
fn includes_all_is_superset() {
    let fx = fixture();
    assert_eq!(matching(&fx, &one(tags(&fx, &[0, 1], IncludesAll))), scenes(&fx, &[0]));
    assert_eq!(matching(&fx, &one(tags(&fx, &[1], IncludesAll))), scenes(&fx, &[0, 2]));
    assert!(matching(&fx, &one(tags(&fx, &[0, 1, 2], IncludesAll))).is_empty());
}

#[test]
fn excludes_is_disjoint() {
    let fx = fixture();
    assert_eq!(matching(&fx, &one(tags(&fx, &[0], Excludes))), scenes(&fx, &[2, 3]));
    assert_eq!(matching(&fx, &one(tags(&fx, &[2], Excludes))), scenes(&fx, &[0, 1, 3]));
}

#[test]
fn count_criteria() {
    let fx = fixture();
    let c = SceneCriterion::TagCount(IntCriterion::new(1, GreaterThan));
    assert_eq!(matching(&fx, &one(c)), scenes(&fx, &[0, 2]));
    let c = SceneCriterion::TagCount(IntCriterion::new(0, Equals));
    assert_eq!(matching(&fx, &one(c)), scenes(&fx, &[3]));
    let c = SceneCriterion::PerformerCount(IntCriterion::new(1, Equals));
    assert_eq!(matching(&fx, &one(c)), scenes(&fx, &[1]));
}

#[test]
fn is_missing_relation_and_scalar() {
    let fx = fixture();
    let c = SceneCriterion::IsMissing("tags".into());
    assert_eq!(matching(&fx, &one(c)), scenes(&fx, &[3]));
    let c = SceneCriterion::IsMissing("studio".into());
    assert_eq!(matching(&fx, &one(c)), scenes(&fx, &[1, 3]));
    let c = SceneCriterion::IsMissing("rating".into());
    assert_eq!(matching(&fx, &one(c)), scenes(&fx, &[2]));
    let c = SceneCriterion::IsMissing("details".into());
    assert_eq!(matching(&fx, &one(c)).len(), 4);
}

#[test]
fn string_and_regex_criteria() {
    let fx = fixture();
    let c = SceneCriterion::Title(StringCriterion::new("ONE", Equals));
    assert_eq!(matching(&fx, &one(c)), scenes(&fx, &[0]));
    let c = SceneCriterion::Title(StringCriterion::new("^t", MatchesRegex));
    assert_eq!(matching(&fx, &one(c)), scenes(&fx, &[1, 2]));
    let c = SceneCriterion::Title(StringCriterion::new("^t", NotMatchesRegex));
    assert_eq!(matching(&fx, &one(c)), scenes(&fx, &[0, 3]));
    let c = SceneCriterion::Path(StringCriterion::new("%/t%", Equals));
    assert_eq!(matching(&fx, &one(c)), scenes(&fx, &[1, 2]));
}

#[test]
fn numeric_bool_and_resolution_criteria() {
    let fx = fixture();
    let c = SceneCriterion::Rating(IntCriterion::new(2, GreaterThan));
    assert_eq!(matching(&fx, &one(c)), scenes(&fx, &[0, 1]));
    let c = SceneCriterion::Rating(IntCriterion::new(0, IsNull));
    assert_eq!(matching(&fx, &one(c)), scenes(&fx, &[2]));
    let c = SceneCriterion::Organized(true);
    assert_eq!(matching(&fx, &one(c)), scenes(&fx, &[0, 2]));
    let c = SceneCriterion::Duration(IntCriterion::new(120, LessThan));
    assert_eq!(matching(&fx, &one(c)), scenes(&fx, &[0]));

    let res = |value, modifier| SceneCriterion::Resolution(ResolutionCriterion { value, modifier });
    assert_eq!(
        matching(&fx, &one(res(Resolution::StandardHd, Equals))),
        scenes(&fx, &[1])
    );
    assert_eq!(
        matching(&fx, &one(res(Resolution::StandardHd, GreaterThan))),
        scenes(&fx, &[0])
    );
    assert_eq!(
        matching(&fx, &one(res(Resolution::StandardHd, LessThan))),
        scenes(&fx, &[2])
    );
}

#[test]
fn studio_and_performer_tag_criteria() {
    let fx = fixture();
    let c = SceneCriterion::Studios(MultiCriterion::new(vec![fx.studio], Includes));
    assert_eq!(matching(&fx, &one(c)), scenes(&fx, &[0, 2]));
    let c = SceneCriterion::Studios(MultiCriterion::new(vec![fx.studio], Excludes));
    assert_eq!(matching(&fx, &one(c)), scenes(&fx, &[1, 3]));

    let c = SceneCriterion::PerformerTags(MultiCriterion::new(vec![fx.tags[2]], Includes));
    assert_eq!(matching(&fx, &one(c)), scenes(&fx, &[1]));
    let c = SceneCriterion::PerformerTags(MultiCriterion::new(vec![fx.tags[2]], Excludes));
    assert_eq!(matching(&fx, &one(c)), scenes(&fx, &[0, 2, 3]));
}

#[test]
fn boolean_composition() {
    let fx = fixture();
    let title = |t: &str| SceneCriterion::Title(StringCriterion::new(t, Equals));

    let or = one(title("one")).with_or(one(tags(&fx, &[2], Includes)));
    assert_eq!(matching(&fx, &or), scenes(&fx, &[0, 2]));

    let and = one(tags(&fx, &[1], Includes)).with_and(one(title("three")));
    assert_eq!(matching(&fx, &and), scenes(&fx, &[2]));

    let not = SceneFilter::default().with_not(one(title("one")));
    assert_eq!(matching(&fx, &not), scenes(&fx, &[1, 2, 3]));

    let and_not = one(SceneCriterion::Organized(true)).with_not(one(title("one")));
    assert_eq!(matching(&fx, &and_not), scenes(&fx, &[2]));

    // Deep nesting: (one) OR ((two) OR (four))
    let deep = one(title("one")).with_or(one(title("two")).with_or(one(title("four"))));
    assert_eq!(matching(&fx, &deep), scenes(&fx, &[0, 1, 3]));
}

#[test]
fn relation_criteria_hold_per_scene_under_not() {
    let fx = fixture();
    let not_a = SceneFilter::default().with_not(one(tags(&fx, &[0], Includes)));
    assert_eq!(matching(&fx, &not_a), scenes(&fx, &[2, 3]));

    let not_ab = SceneFilter::default().with_not(one(tags(&fx, &[0, 1], IncludesAll)));
    assert_eq!(matching(&fx, &not_ab), scenes(&fx, &[1, 2, 3]));

    let not_c = SceneFilter::default().with_not(one(tags(&fx, &[2], Excludes)));
    assert_eq!(matching(&fx, &not_c), scenes(&fx, &[2]));

    let performers = |m| SceneCriterion::Performers(MultiCriterion::new(vec![fx.performer], m));
    let not_p = SceneFilter::default().with_not(one(performers(Includes)));
    assert_eq!(matching(&fx, &not_p), scenes(&fx, &[0, 2, 3]));

    let missing = SceneFilter::default()
        .with_not(one(SceneCriterion::IsMissing("performers".to_string())));
    assert_eq!(matching(&fx, &missing), scenes(&fx, &[1]));
}

#[test]
fn relation_criteria_combine_with_and() {
    let fx = fixture();
    let a_and_b = one(tags(&fx, &[0], Includes)).with_and(one(tags(&fx, &[1], Includes)));
    assert_eq!(matching(&fx, &a_and_b), scenes(&fx, &[0]));

    let b_and_not_c = one(tags(&fx, &[1], Includes)).with_not(one(tags(&fx, &[2], Includes)));
    assert_eq!(matching(&fx, &b_and_not_c), scenes(&fx, &[0]));

    let p = SceneCriterion::Performers(MultiCriterion::new(vec![fx.performer], IncludesAll));
    let a_and_p = one(tags(&fx, &[0], Includes)).with_and(one(p));
    assert_eq!(matching(&fx, &a_and_p), scenes(&fx, &[1]));
}

#[test]
fn relation_criteria_combine_with_or() {
    let fx = fixture();
    let four = SceneCriterion::Title(StringCriterion::new("four", Equals));
    let ab_or_four = one(tags(&fx, &[0, 1], IncludesAll)).with_or(one(four.clone()));
    assert_eq!(matching(&fx, &ab_or_four), scenes(&fx, &[0, 3]));

    let four_or_ab = one(four).with_or(one(tags(&fx, &[0, 1], IncludesAll)));
    assert_eq!(matching(&fx, &four_or_ab), scenes(&fx, &[0, 3]));

    let c_or_p = one(tags(&fx, &[2], Includes)).with_or(one(SceneCriterion::Performers(
        MultiCriterion::new(vec![fx.performer], Includes),
    )));
    assert_eq!(matching(&fx, &c_or_p), scenes(&fx, &[1, 2]));
}

#[test]
fn huge_page_is_empty_not_an_overflow() {
    let fx = fixture();
    let txn = TxnScope::begin(&fx.conn).unwrap();
    let find = FindFilter {
        page: Some(i64::MAX),
        per_page: Some(25),
        ..Default::default()
    };
    let (rows, total) = txn.scenes().query(None, &find).unwrap();
    assert!(rows.is_empty());
    assert_eq!(total, 4);
}

#[test]
fn illegal_combination_fails_the_query() {
    let fx = fixture();
    let filter = SceneFilter::default()
        .with_and(SceneFilter::default())
        .with_or(SceneFilter::default());
    let txn = TxnScope::begin(&fx.conn).unwrap();
    let err = txn
        .scenes()
        .query(Some(&filter), &FindFilter::default())
        .unwrap_err();
    assert!(matches!(
        err,
        OperationError::Filter(FilterError::IllegalFilterCombination { .. })
    ));
}

#[test]
fn invalid_criteria_are_rejected() {
    let fx = fixture();
    let txn = TxnScope::begin(&fx.conn).unwrap();
    let run = |c: SceneCriterion| {
        txn.scenes()
            .query_count(Some(&one(c)), &FindFilter::default())
            .unwrap_err()
    };

    assert!(matches!(
        run(SceneCriterion::Tags(MultiCriterion::new(vec![], IncludesAll))),
        OperationError::Filter(FilterError::EmptyMultiValue { .. })
    ));
    assert!(matches!(
        run(SceneCriterion::IsMissing("checksum = '' OR 1".into())),
        OperationError::Filter(FilterError::UnknownField { .. })
    ));
    assert!(matches!(
        run(SceneCriterion::Rating(IntCriterion::new(1, Includes))),
        OperationError::Filter(FilterError::UnsupportedModifier { .. })
    ));
}

#[test]
fn search_sort_and_pagination() {
    let fx = fixture();
    let txn = TxnScope::begin(&fx.conn).unwrap();

    let find = FindFilter {
        q: Some("thr".into()),
        ..FindFilter::default()
    };
    let (found, total) = txn.scenes().query(None, &find).unwrap();
    assert_eq!(total, 1);
    assert_eq!(found[0].id, fx.scenes[2]);

    let find = FindFilter {
        sort: Some("title".into()),
        direction: Some(SortDirection::Desc),
        page: Some(2),
        per_page: Some(3),
        ..FindFilter::default()
    };
    let (page, total) = txn.scenes().query(None, &find).unwrap();
    assert_eq!(total, 4);
    let titles: Vec<_> = page.iter().filter_map(|s| s.title.clone()).collect();
    assert_eq!(titles, vec!["four"]);

    let find = FindFilter {
        sort: Some("tags_count".into()),
        direction: Some(SortDirection::Desc),
        ..FindFilter::default()
    };
    let (sorted, _) = txn.scenes().query(None, &find).unwrap();
    assert_eq!(sorted.last().map(|s| s.id), Some(fx.scenes[3]));

    let find = FindFilter {
        sort: Some("id; DROP TABLE scenes".into()),
        ..FindFilter::default()
    };
    assert!(matches!(
        txn.scenes().query(None, &find),
        Err(OperationError::Filter(FilterError::UnknownSort { .. }))
    ));
}

#[test]
fn empty_result_counts_zero() {
    let fx = fixture();
    let c = SceneCriterion::Title(StringCriterion::new("nothing", Equals));
    assert!(matching(&fx, &one(c)).is_empty());
}

#[test]
fn other_entity_filters() {
    let fx = fixture();
    let txn = TxnScope::begin(&fx.conn).unwrap();

    let filter = FilterNode::new(vec![TagCriterion::SceneCount(IntCriterion::new(
        2,
        Equals,
    ))]);
    let (found, total) = txn.tags().query(Some(&filter), &FindFilter::all()).unwrap();
    let names: Vec<_> = found.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(total, 2);

    let filter = FilterNode::new(vec![StudioCriterion::SceneCount(IntCriterion::new(
        1,
        GreaterThan,
    ))]);
    assert_eq!(txn.studios().query_count(Some(&filter), &FindFilter::all()).unwrap(), 1);

    let filter = FilterNode::new(vec![PerformerCriterion::Tags(MultiCriterion::new(
        vec![fx.tags[2]],
        Includes,
    ))]);
    let (performers, _) = txn.performers().query(Some(&filter), &FindFilter::all()).unwrap();
    assert_eq!(performers.len(), 1);
    assert_eq!(txn.performers().count().unwrap(), 1);
}
