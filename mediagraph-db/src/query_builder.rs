//! Assembly and execution of find/count queries.

use std::sync::LazyLock;

use mediagraph_catalog::{FindFilter, SortDirection};
use regex::Regex;
use rusqlite::types::Value;
use rusqlite::{Connection, params_from_iter};

use crate::filter::{FilterBuilder, FilterError, Join, push_join};
use crate::repository::OperationError;

/// Quoted phrases or bare words.
static SEARCH_TERM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]*)"|(\S+)"#).expect("static pattern"));

/// Split a free-text query into terms, keeping double-quoted phrases whole.
pub fn search_terms(q: &str) -> Vec<String> {
    SEARCH_TERM
        .captures_iter(q)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Single-use accumulator for one find or count query against `table`.
pub struct QueryBuilder<'c> {
    conn: &'c Connection,
    table: &'static str,
    joins: Vec<Join>,
    where_clauses: Vec<String>,
    where_args: Vec<Value>,
    having_clauses: Vec<String>,
    having_args: Vec<Value>,
    sort: Option<String>,
    limit: Option<(i64, i64)>,
}

impl<'c> QueryBuilder<'c> {
    pub fn new(conn: &'c Connection, table: &'static str) -> Self {
        Self {
            conn,
            table,
            joins: Vec::new(),
            where_clauses: Vec::new(),
            where_args: Vec::new(),
            having_clauses: Vec::new(),
            having_args: Vec::new(),
            sort: None,
            limit: None,
        }
    }

    pub fn add_where(&mut self, sql: impl Into<String>, args: Vec<Value>) {
        self.where_clauses.push(sql.into());
        self.where_args.extend(args);
    }

    pub fn add_having(&mut self, sql: impl Into<String>, args: Vec<Value>) {
        self.having_clauses.push(sql.into());
        self.having_args.extend(args);
    }

    pub fn add_join(&mut self, join: Join) {
        push_join(&mut self.joins, join);
    }

    /// Merge a compiled filter's joins and clauses.
    pub fn apply_filter(&mut self, filter: &FilterBuilder) {
        for join in filter.joins() {
            self.add_join(join);
        }
        let clause = filter.where_clause();
        if !clause.is_empty() {
            self.add_where(clause.sql, clause.args);
        }
        let clause = filter.having_clause();
        if !clause.is_empty() {
            self.add_having(clause.sql, clause.args);
        }
    }

    /// Require every search term to match at least one of `columns`.
    pub fn apply_search(&mut self, columns: &[&str], q: &str) {
        if columns.is_empty() {
            return;
        }
        for term in search_terms(q) {
            let like = format!("%{term}%");
            let ors: Vec<String> = columns.iter().map(|c| format!("{c} LIKE ?")).collect();
            let args = columns.iter().map(|_| Value::Text(like.clone())).collect();
            self.add_where(ors.join(" OR "), args);
        }
    }

    /// Order by an SQL expression, with the id as tie-breaker.
    pub fn set_sort(&mut self, expr: &str, direction: SortDirection) {
        let dir = direction.as_sql();
        self.sort = Some(format!("{expr} {dir}, {}.id {dir}", self.table));
    }

    pub fn set_random_sort(&mut self) {
        self.sort = Some("RANDOM()".to_string());
    }

    pub fn set_pagination(&mut self, find: &FindFilter) {
        self.limit = find
            .page_size()
            .map(|size| (size, (find.page() - 1).saturating_mul(size)));
    }

    fn filtered_sql(&self) -> String {
        let table = self.table;
        let mut sql = format!("SELECT DISTINCT {table}.id FROM {table}");
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.to_sql());
        }
        if !self.where_clauses.is_empty() {
            let parts: Vec<String> = self.where_clauses.iter().map(|c| format!("({c})")).collect();
            sql.push_str(" WHERE ");
            sql.push_str(&parts.join(" AND "));
        }
        sql.push_str(&format!(" GROUP BY {table}.id"));
        if !self.having_clauses.is_empty() {
            let parts: Vec<String> = self.having_clauses.iter().map(|c| format!("({c})")).collect();
            sql.push_str(" HAVING ");
            sql.push_str(&parts.join(" AND "));
        }
        sql
    }

    pub fn find_sql(&self) -> String {
        let mut sql = self.filtered_sql();
        if let Some(sort) = &self.sort {
            sql.push_str(" ORDER BY ");
            sql.push_str(sort);
        }
        if let Some((limit, offset)) = self.limit {
            sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));
        }
        sql
    }

    pub fn count_sql(&self) -> String {
        format!("SELECT COUNT(*) FROM ({}) AS filtered", self.filtered_sql())
    }

    /// Arguments in placeholder order: WHERE first, then HAVING.
    pub fn args(&self) -> Vec<Value> {
        let mut args = self.where_args.clone();
        args.extend(self.having_args.iter().cloned());
        args
    }

    /// Matching ids for the requested page, and the total match count.
    pub fn execute_find(&self) -> Result<(Vec<i64>, i64), OperationError> {
        let count = self.execute_count()?;

        let sql = self.find_sql();
        log::debug!("find: {sql}");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(self.args()), |row| row.get(0))?;
        let ids = rows.collect::<Result<Vec<i64>, _>>()?;
        Ok((ids, count))
    }

    pub fn execute_count(&self) -> Result<i64, OperationError> {
        let sql = self.count_sql();
        log::debug!("count: {sql}");
        let count = self
            .conn
            .query_row(&sql, params_from_iter(self.args()), |row| row.get(0))?;
        Ok(count)
    }
}

// ── Sorting ─────────────────────────────────────────────────────────────────

/// Sortable columns of an entity type.
pub struct SortSpec {
    pub default: &'static str,
    /// Sort name and the SQL expression it orders by.
    pub columns: &'static [(&'static str, &'static str)],
    /// `<name>_count` sorts: name, join table and the column pointing back
    /// at the sorted entity.
    pub counts: &'static [(&'static str, &'static str, &'static str)],
}

impl SortSpec {
    /// Apply the sort requested by `find`, rejecting names outside the
    /// whitelist.
    pub fn apply(&self, qb: &mut QueryBuilder<'_>, find: &FindFilter) -> Result<(), FilterError> {
        let sort = find.sort_or(self.default);
        let direction = find.direction();
        if sort == "random" {
            qb.set_random_sort();
            return Ok(());
        }
        if let Some((_, expr)) = self.columns.iter().find(|(name, _)| *name == sort) {
            qb.set_sort(expr, direction);
            return Ok(());
        }
        if let Some((_, join_table, id_column)) = sort
            .strip_suffix("_count")
            .and_then(|rel| self.counts.iter().find(|(name, _, _)| *name == rel))
        {
            let table = qb.table;
            let expr = crate::criterion::relation_count_sql(table, join_table, id_column);
            qb.set_sort(&expr, direction);
            return Ok(());
        }
        Err(FilterError::UnknownSort {
            sort: sort.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_terms_keep_quoted_phrases() {
        assert_eq!(
            search_terms(r#"red "blue sky" green"#),
            vec!["red", "blue sky", "green"]
        );
        assert!(search_terms("   ").is_empty());
    }
}
