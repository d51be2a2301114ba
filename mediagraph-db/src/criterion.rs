//! Reusable criterion handlers.
//!
//! Each handler appends WHERE/HAVING fragments (and joins where needed) to a
//! [`FilterBuilder`]. Column names passed in are always compile-time
//! constants; user input only ever reaches the query as a bound argument.

use mediagraph_catalog::{
    CriterionModifier, IntCriterion, MultiCriterion, ResolutionCriterion, StringCriterion,
};
use rusqlite::types::Value;

use crate::filter::{FilterBuilder, FilterError};
use crate::repository::{Relation, placeholders};

type Modifier = CriterionModifier;

fn unsupported(field: &str, modifier: Modifier) -> FilterError {
    FilterError::UnsupportedModifier {
        field: field.to_string(),
        modifier,
    }
}

fn id_args(ids: &[i64]) -> Vec<Value> {
    ids.iter().map(|&id| Value::Integer(id)).collect()
}

/// Deduplicated, non-empty operand list of a multi-value criterion.
fn multi_values(field: &str, c: &MultiCriterion) -> Result<Vec<i64>, FilterError> {
    let mut ids = c.value.clone();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Err(FilterError::EmptyMultiValue {
            field: field.to_string(),
        });
    }
    Ok(ids)
}

// ── Scalar Columns ──────────────────────────────────────────────────────────

pub fn string_criterion(
    f: &mut FilterBuilder,
    column: &str,
    c: &StringCriterion,
) -> Result<(), FilterError> {
    let value = || vec![Value::Text(c.value.clone())];
    match c.modifier {
        Modifier::Equals => f.add_where(format!("{column} LIKE ?"), value()),
        Modifier::NotEquals => f.add_where(format!("{column} NOT LIKE ?"), value()),
        Modifier::MatchesRegex => f.add_where(
            format!("({column} IS NOT NULL AND {column} regexp ?)"),
            value(),
        ),
        Modifier::NotMatchesRegex => f.add_where(
            format!("({column} IS NULL OR {column} NOT regexp ?)"),
            value(),
        ),
        Modifier::IsNull => {
            f.add_where(format!("({column} IS NULL OR TRIM({column}) = '')"), vec![])
        }
        Modifier::NotNull => f.add_where(
            format!("({column} IS NOT NULL AND TRIM({column}) != '')"),
            vec![],
        ),
        other => return Err(unsupported(column, other)),
    }
    Ok(())
}

/// Numeric comparison against a column or any scalar SQL expression.
pub fn int_criterion(
    f: &mut FilterBuilder,
    expr: &str,
    c: &IntCriterion,
) -> Result<(), FilterError> {
    let value = vec![Value::Integer(c.value)];
    match c.modifier {
        Modifier::Equals => f.add_where(format!("{expr} = ?"), value),
        Modifier::NotEquals => f.add_where(format!("{expr} != ?"), value),
        Modifier::GreaterThan => f.add_where(format!("{expr} > ?"), value),
        Modifier::LessThan => f.add_where(format!("{expr} < ?"), value),
        Modifier::IsNull => f.add_where(format!("{expr} IS NULL"), vec![]),
        Modifier::NotNull => f.add_where(format!("{expr} IS NOT NULL"), vec![]),
        other => return Err(unsupported(expr, other)),
    }
    Ok(())
}

pub fn bool_criterion(f: &mut FilterBuilder, column: &str, value: bool) {
    f.add_where(format!("{column} = ?"), vec![Value::Integer(value as i64)]);
}

/// Compare `MIN(width, height)` against a resolution bucket.
pub fn resolution_criterion(
    f: &mut FilterBuilder,
    c: &ResolutionCriterion,
) -> Result<(), FilterError> {
    let table = f.table();
    let expr = format!("MIN({table}.width, {table}.height)");
    let (min, max) = c.value.range();
    match (c.modifier, max) {
        (Modifier::Equals, Some(max)) => f.add_where(
            format!("({expr} >= ? AND {expr} < ?)"),
            vec![Value::Integer(min), Value::Integer(max)],
        ),
        (Modifier::Equals, None) => f.add_where(format!("{expr} >= ?"), vec![Value::Integer(min)]),
        (Modifier::NotEquals, Some(max)) => f.add_where(
            format!("({expr} < ? OR {expr} >= ?)"),
            vec![Value::Integer(min), Value::Integer(max)],
        ),
        (Modifier::NotEquals, None) => f.add_where(format!("{expr} < ?"), vec![Value::Integer(min)]),
        (Modifier::GreaterThan, Some(max)) => {
            f.add_where(format!("{expr} >= ?"), vec![Value::Integer(max)])
        }
        // Nothing is above the top bucket.
        (Modifier::GreaterThan, None) => f.add_where("0 = 1", vec![]),
        (Modifier::LessThan, _) => f.add_where(format!("{expr} < ?"), vec![Value::Integer(min)]),
        (other, _) => return Err(unsupported("resolution", other)),
    }
    Ok(())
}

// ── Relations ───────────────────────────────────────────────────────────────

/// Multi-value criterion over a join table.
///
/// Every modifier compiles to a self-contained subquery over the join table,
/// so the predicate holds per entity and composes under `AND`/`OR`/`NOT`.
/// `Includes` matches any linked id, `IncludesAll` requires the number of
/// distinct matched ids to equal the operand count, and `Excludes` rejects
/// entities linked to any of them.
pub fn joined_multi_criterion(
    f: &mut FilterBuilder,
    field: &str,
    relation: &Relation,
    c: &MultiCriterion,
) -> Result<(), FilterError> {
    let table = f.table();
    let Relation {
        join_table,
        id_column,
        fk_column,
    } = *relation;

    match c.modifier {
        Modifier::IsNull => {
            f.add_where(
                format!(
                    "NOT EXISTS (SELECT 1 FROM {join_table} WHERE {join_table}.{id_column} = {table}.id)"
                ),
                vec![],
            );
            return Ok(());
        }
        Modifier::NotNull => {
            f.add_where(
                format!(
                    "EXISTS (SELECT 1 FROM {join_table} WHERE {join_table}.{id_column} = {table}.id)"
                ),
                vec![],
            );
            return Ok(());
        }
        _ => {}
    }

    let ids = multi_values(field, c)?;
    let list = placeholders(ids.len());
    let linked = format!("SELECT {id_column} FROM {join_table} WHERE {fk_column} IN ({list})");
    match c.modifier {
        Modifier::Includes => f.add_where(format!("{table}.id IN ({linked})"), id_args(&ids)),
        Modifier::IncludesAll => {
            let mut args = id_args(&ids);
            args.push(Value::Integer(ids.len() as i64));
            f.add_where(
                format!(
                    "{table}.id IN ({linked} GROUP BY {id_column} HAVING COUNT(DISTINCT {fk_column}) = ?)"
                ),
                args,
            );
        }
        Modifier::Excludes => f.add_where(format!("{table}.id NOT IN ({linked})"), id_args(&ids)),
        other => return Err(unsupported(field, other)),
    }
    Ok(())
}

/// Multi-value criterion over a single foreign-key column, such as a studio.
pub fn fk_multi_criterion(
    f: &mut FilterBuilder,
    column: &str,
    c: &MultiCriterion,
) -> Result<(), FilterError> {
    match c.modifier {
        Modifier::IsNull => {
            f.add_where(format!("{column} IS NULL"), vec![]);
            return Ok(());
        }
        Modifier::NotNull => {
            f.add_where(format!("{column} IS NOT NULL"), vec![]);
            return Ok(());
        }
        _ => {}
    }

    let ids = multi_values(column, c)?;
    let list = placeholders(ids.len());
    match c.modifier {
        Modifier::Includes => f.add_where(format!("{column} IN ({list})"), id_args(&ids)),
        Modifier::Excludes => f.add_where(
            format!("({column} IS NULL OR {column} NOT IN ({list}))"),
            id_args(&ids),
        ),
        other => return Err(unsupported(column, other)),
    }
    Ok(())
}

/// Entities linked to performers carrying the given tags.
pub fn performer_tags_criterion(
    f: &mut FilterBuilder,
    performers: &Relation,
    c: &MultiCriterion,
) -> Result<(), FilterError> {
    let table = f.table();
    let ids = multi_values("performer_tags", c)?;
    let list = placeholders(ids.len());
    let Relation {
        join_table,
        id_column,
        ..
    } = *performers;
    let linked = format!(
        "SELECT pj.{id_column} FROM {join_table} AS pj \
         JOIN performers_tags AS pt ON pt.performer_id = pj.performer_id \
         WHERE pt.tag_id IN ({list})"
    );

    match c.modifier {
        Modifier::Includes => f.add_where(format!("{table}.id IN ({linked})"), id_args(&ids)),
        Modifier::IncludesAll => {
            let mut args = id_args(&ids);
            args.push(Value::Integer(ids.len() as i64));
            f.add_where(
                format!(
                    "{table}.id IN ({linked} GROUP BY pj.{id_column} HAVING COUNT(DISTINCT pt.tag_id) = ?)"
                ),
                args,
            );
        }
        Modifier::Excludes => {
            f.add_where(format!("{table}.id NOT IN ({linked})"), id_args(&ids))
        }
        other => return Err(unsupported("performer_tags", other)),
    }
    Ok(())
}

/// Correlated count of the rows in `join_table` pointing at the filtered row.
pub fn relation_count_sql(table: &str, join_table: &str, id_column: &str) -> String {
    format!("(SELECT COUNT(*) FROM {join_table} WHERE {join_table}.{id_column} = {table}.id)")
}

/// Numeric criterion against a correlated count expression.
pub fn count_criterion(
    f: &mut FilterBuilder,
    field: &str,
    count_sql: &str,
    c: &IntCriterion,
) -> Result<(), FilterError> {
    match c.modifier {
        Modifier::Equals | Modifier::NotEquals | Modifier::GreaterThan | Modifier::LessThan => {
            int_criterion(f, count_sql, c)
        }
        other => Err(unsupported(field, other)),
    }
}

// ── Missing Values ──────────────────────────────────────────────────────────

/// Rows with no link in `relation`, via a LEFT JOIN whose key comes back NULL.
pub fn missing_relation(f: &mut FilterBuilder, field: &str, relation: &Relation) {
    let table = f.table();
    let alias = format!("{field}_join");
    f.add_join(
        relation.join_table,
        &alias,
        format!("{alias}.{} = {table}.id", relation.id_column),
    );
    f.add_where(format!("{alias}.{} IS NULL", relation.id_column), vec![]);
}

/// Rows where a scalar column is NULL or blank. Only whitelisted columns
/// are accepted.
pub fn missing_scalar(
    f: &mut FilterBuilder,
    field: &str,
    allowed: &[&str],
) -> Result<(), FilterError> {
    let Some(column) = allowed.iter().find(|c| **c == field) else {
        return Err(FilterError::UnknownField {
            field: field.to_string(),
        });
    };
    let table = f.table();
    f.add_where(
        format!("({table}.{column} IS NULL OR TRIM({table}.{column}) = '')"),
        vec![],
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediagraph_catalog::Resolution;

    const TAGS: Relation = Relation::new("scenes_tags", "scene_id", "tag_id");

    #[test]
    fn includes_all_groups_inside_subquery() {
        let mut f = FilterBuilder::new("scenes");
        let c = MultiCriterion::new(vec![3, 1, 3], Modifier::IncludesAll);
        joined_multi_criterion(&mut f, "tags", &TAGS, &c).unwrap();

        let w = f.where_clause();
        assert_eq!(
            w.sql,
            "(scenes.id IN (SELECT scene_id FROM scenes_tags WHERE tag_id IN (?, ?) \
             GROUP BY scene_id HAVING COUNT(DISTINCT tag_id) = ?))"
        );
        assert_eq!(
            w.args,
            vec![Value::Integer(1), Value::Integer(3), Value::Integer(2)]
        );
        assert!(f.having_clause().sql.is_empty());
        assert!(f.joins().is_empty());
    }

    #[test]
    fn relation_modifiers_never_join() {
        for modifier in [Modifier::Includes, Modifier::Excludes] {
            let mut f = FilterBuilder::new("scenes");
            let c = MultiCriterion::new(vec![7], modifier);
            joined_multi_criterion(&mut f, "tags", &TAGS, &c).unwrap();
            assert!(f.joins().is_empty());
            assert!(f.where_clause().sql.contains("FROM scenes_tags WHERE tag_id IN (?)"));
        }
    }

    #[test]
    fn empty_multi_value_is_rejected() {
        let mut f = FilterBuilder::new("scenes");
        let c = MultiCriterion::new(vec![], Modifier::Includes);
        let err = joined_multi_criterion(&mut f, "tags", &TAGS, &c).unwrap_err();
        assert_eq!(
            err,
            FilterError::EmptyMultiValue {
                field: "tags".into()
            }
        );
    }

    #[test]
    fn string_modifiers() {
        let mut f = FilterBuilder::new("scenes");
        let c = StringCriterion::new("", Modifier::IsNull);
        string_criterion(&mut f, "scenes.title", &c).unwrap();
        assert_eq!(
            f.where_clause().sql,
            "((scenes.title IS NULL OR TRIM(scenes.title) = ''))"
        );

        let c = StringCriterion::new("x", Modifier::IncludesAll);
        assert!(matches!(
            string_criterion(&mut f, "scenes.title", &c),
            Err(FilterError::UnsupportedModifier { .. })
        ));
    }

    #[test]
    fn missing_scalar_rejects_unknown_columns() {
        let mut f = FilterBuilder::new("scenes");
        assert!(missing_scalar(&mut f, "title", &["title", "url"]).is_ok());
        assert_eq!(
            missing_scalar(&mut f, "id; DROP TABLE scenes", &["title"]),
            Err(FilterError::UnknownField {
                field: "id; DROP TABLE scenes".into()
            })
        );
    }

    #[test]
    fn resolution_greater_than_uses_next_bucket() {
        let mut f = FilterBuilder::new("images");
        let c = ResolutionCriterion {
            value: Resolution::StandardHd,
            modifier: Modifier::GreaterThan,
        };
        resolution_criterion(&mut f, &c).unwrap();
        let w = f.where_clause();
        assert_eq!(w.sql, "(MIN(images.width, images.height) >= ?)");
        assert_eq!(w.args, vec![Value::Integer(1080)]);
    }
}
