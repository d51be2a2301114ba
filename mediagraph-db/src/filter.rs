//! Compilation of filter trees into SQL fragments.
//!
//! A [`FilterBuilder`] collects the WHERE and HAVING fragments, bound
//! arguments and joins produced by one [`FilterNode`]. Nested nodes become
//! sub-filters combined with `AND`, `OR` or `AND NOT`.

use mediagraph_catalog::{CriterionModifier, FilterNode};
use rusqlite::types::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("Illegal filter combination: {first} and {second} cannot both be set")]
    IllegalFilterCombination {
        first: &'static str,
        second: &'static str,
    },
    #[error("Criterion on '{field}' requires at least one value")]
    EmptyMultiValue { field: String },
    #[error("Modifier {modifier} is not supported for '{field}'")]
    UnsupportedModifier {
        field: String,
        modifier: CriterionModifier,
    },
    #[error("Unknown field '{field}'")]
    UnknownField { field: String },
    #[error("Unknown sort '{sort}'")]
    UnknownSort { sort: String },
}

/// A `LEFT JOIN` registered by a criterion. Joins are identified by alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub table: String,
    pub alias: String,
    pub on: String,
}

impl Join {
    pub fn new(table: &str, alias: &str, on: impl Into<String>) -> Self {
        Self {
            table: table.to_string(),
            alias: alias.to_string(),
            on: on.into(),
        }
    }

    pub fn to_sql(&self) -> String {
        if self.table == self.alias {
            format!("LEFT JOIN {} ON {}", self.table, self.on)
        } else {
            format!("LEFT JOIN {} AS {} ON {}", self.table, self.alias, self.on)
        }
    }
}

/// Add `join` unless a join with the same alias is already present.
pub(crate) fn push_join(joins: &mut Vec<Join>, join: Join) {
    if !joins.iter().any(|j| j.alias == join.alias) {
        joins.push(join);
    }
}

/// A SQL fragment together with the arguments for its placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlClause {
    pub sql: String,
    pub args: Vec<Value>,
}

impl SqlClause {
    pub fn new(sql: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubFilterOp {
    And,
    Or,
    Not,
}

impl SubFilterOp {
    fn as_sql(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "AND NOT",
        }
    }
}

/// Accumulates the clauses of one filter node.
#[derive(Debug)]
pub struct FilterBuilder {
    table: &'static str,
    where_clauses: Vec<SqlClause>,
    having_clauses: Vec<SqlClause>,
    joins: Vec<Join>,
    sub_filter: Option<(SubFilterOp, Box<FilterBuilder>)>,
}

impl FilterBuilder {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            where_clauses: Vec::new(),
            having_clauses: Vec::new(),
            joins: Vec::new(),
            sub_filter: None,
        }
    }

    /// The table the filter applies to.
    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn add_where(&mut self, sql: impl Into<String>, args: Vec<Value>) {
        self.where_clauses.push(SqlClause::new(sql, args));
    }

    pub fn add_having(&mut self, sql: impl Into<String>, args: Vec<Value>) {
        self.having_clauses.push(SqlClause::new(sql, args));
    }

    pub fn add_join(&mut self, table: &str, alias: &str, on: impl Into<String>) {
        push_join(&mut self.joins, Join::new(table, alias, on));
    }

    pub fn and(&mut self, sub: FilterBuilder) {
        self.sub_filter = Some((SubFilterOp::And, Box::new(sub)));
    }

    pub fn or(&mut self, sub: FilterBuilder) {
        self.sub_filter = Some((SubFilterOp::Or, Box::new(sub)));
    }

    pub fn not(&mut self, sub: FilterBuilder) {
        self.sub_filter = Some((SubFilterOp::Not, Box::new(sub)));
    }

    /// Joins of this node and every nested node, deduplicated by alias.
    pub fn joins(&self) -> Vec<Join> {
        let mut joins = self.joins.clone();
        if let Some((_, sub)) = &self.sub_filter {
            for join in sub.joins() {
                push_join(&mut joins, join);
            }
        }
        joins
    }

    pub fn where_clause(&self) -> SqlClause {
        self.generate(|f| &f.where_clauses)
    }

    pub fn having_clause(&self) -> SqlClause {
        self.generate(|f| &f.having_clauses)
    }

    fn generate(&self, select: fn(&FilterBuilder) -> &Vec<SqlClause>) -> SqlClause {
        let mut clause = and_clauses(select(self));
        let Some((op, sub)) = &self.sub_filter else {
            return clause;
        };
        let sub_clause = sub.generate(select);
        if sub_clause.is_empty() {
            return clause;
        }

        if clause.is_empty() {
            clause.sql = match op {
                SubFilterOp::Not => format!("NOT ({})", sub_clause.sql),
                _ => format!("({})", sub_clause.sql),
            };
        } else {
            clause.sql = format!("{} {} ({})", clause.sql, op.as_sql(), sub_clause.sql);
        }
        clause.args.extend(sub_clause.args);
        clause
    }
}

fn and_clauses(clauses: &[SqlClause]) -> SqlClause {
    let mut out = SqlClause::default();
    let parts: Vec<String> = clauses.iter().map(|c| format!("({})", c.sql)).collect();
    out.sql = parts.join(" AND ");
    for c in clauses {
        out.args.extend(c.args.iter().cloned());
    }
    out
}

// ── Compilation ─────────────────────────────────────────────────────────────

/// A criterion that knows how to add itself to a filter.
///
/// Implemented by each entity's closed criterion enum with an exhaustive
/// match, so every filterable field has exactly one handler.
pub trait CriterionHandler {
    fn apply(&self, f: &mut FilterBuilder) -> Result<(), FilterError>;
}

/// Reject any node in the tree that sets more than one of AND, OR and NOT.
pub fn validate_filter<C>(node: &FilterNode<C>) -> Result<(), FilterError> {
    let set = [
        ("AND", node.and.as_deref()),
        ("OR", node.or.as_deref()),
        ("NOT", node.not.as_deref()),
    ];
    let mut populated = set.iter().filter(|(_, n)| n.is_some()).map(|(name, _)| *name);
    if let (Some(first), Some(second)) = (populated.next(), populated.next()) {
        return Err(FilterError::IllegalFilterCombination { first, second });
    }
    for (_, child) in set {
        if let Some(child) = child {
            validate_filter(child)?;
        }
    }
    Ok(())
}

/// Validate and compile a filter tree for `table`.
pub fn compile_filter<C: CriterionHandler>(
    table: &'static str,
    node: &FilterNode<C>,
) -> Result<FilterBuilder, FilterError> {
    validate_filter(node)?;
    make_filter(table, node)
}

fn make_filter<C: CriterionHandler>(
    table: &'static str,
    node: &FilterNode<C>,
) -> Result<FilterBuilder, FilterError> {
    let mut f = FilterBuilder::new(table);
    if let Some(sub) = &node.and {
        f.and(make_filter(table, sub)?);
    }
    if let Some(sub) = &node.or {
        f.or(make_filter(table, sub)?);
    }
    if let Some(sub) = &node.not {
        f.not(make_filter(table, sub)?);
    }
    for criterion in &node.criteria {
        criterion.apply(&mut f)?;
    }
    Ok(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Raw(&'static str);

    impl CriterionHandler for Raw {
        fn apply(&self, f: &mut FilterBuilder) -> Result<(), FilterError> {
            f.add_where(self.0, vec![Value::Integer(1)]);
            Ok(())
        }
    }

    #[test]
    fn two_operators_are_rejected() {
        let node = FilterNode::new(vec![Raw("a = ?")])
            .with_and(FilterNode::default())
            .with_not(FilterNode::default());
        let err = compile_filter("scenes", &node).unwrap_err();
        assert_eq!(
            err,
            FilterError::IllegalFilterCombination {
                first: "AND",
                second: "NOT"
            }
        );
    }

    #[test]
    fn nested_illegal_node_is_rejected() {
        let inner = FilterNode::<Raw>::default()
            .with_or(FilterNode::default())
            .with_and(FilterNode::default());
        let node = FilterNode::new(vec![Raw("a = ?")]).with_or(inner);
        assert!(matches!(
            compile_filter("scenes", &node),
            Err(FilterError::IllegalFilterCombination { .. })
        ));
    }

    #[test]
    fn sub_filter_operators() {
        let node = FilterNode::new(vec![Raw("a = ?")]).with_or(FilterNode::new(vec![Raw("b = ?")]));
        let f = compile_filter("scenes", &node).unwrap();
        let clause = f.where_clause();
        assert_eq!(clause.sql, "(a = ?) OR ((b = ?))");
        assert_eq!(clause.args.len(), 2);

        let node = FilterNode::default().with_not(FilterNode::new(vec![Raw("b = ?")]));
        let f = compile_filter("scenes", &node).unwrap();
        assert_eq!(f.where_clause().sql, "NOT ((b = ?))");

        let node = FilterNode::new(vec![Raw("a = ?")]).with_not(FilterNode::new(vec![Raw("b = ?")]));
        let f = compile_filter("scenes", &node).unwrap();
        assert_eq!(f.where_clause().sql, "(a = ?) AND NOT ((b = ?))");
    }

    #[test]
    fn joins_are_deduplicated_by_alias() {
        let mut f = FilterBuilder::new("scenes");
        f.add_join("scenes_tags", "scenes_tags", "scenes_tags.scene_id = scenes.id");
        let mut sub = FilterBuilder::new("scenes");
        sub.add_join("scenes_tags", "scenes_tags", "scenes_tags.scene_id = scenes.id");
        sub.add_join("performers_scenes", "performers_join", "performers_join.scene_id = scenes.id");
        f.and(sub);
        let joins = f.joins();
        assert_eq!(joins.len(), 2);
        assert_eq!(
            joins[1].to_sql(),
            "LEFT JOIN performers_scenes AS performers_join ON performers_join.scene_id = scenes.id"
        );
    }
}
