//! Generic table and join-table access shared by the per-entity repositories.

use std::marker::PhantomData;

use rusqlite::types::Value;
use rusqlite::{Connection, Row, params, params_from_iter};
use thiserror::Error;

use crate::filter::FilterError;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Invalid filter: {0}")]
    Filter(#[from] FilterError),
    #[error("Required {entity_type} with id {id} does not exist")]
    MissingRequired { entity_type: String, id: i64 },
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: i64 },
}

impl OperationError {
    pub(crate) fn not_found<E: Entity>(id: i64) -> Self {
        Self::NotFound {
            entity_type: E::ENTITY_TYPE.to_string(),
            id,
        }
    }
}

/// A row type stored in its own table with an integer `id` primary key.
pub trait Entity: Sized {
    /// Table name.
    const TABLE: &'static str;
    /// Singular name used in error messages.
    const ENTITY_TYPE: &'static str;
    /// Every column except `id`, in the order produced by [`Entity::values`].
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> i64;
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
    fn values(&self) -> Vec<Value>;
}

/// A partial update: only the listed columns are written.
pub trait Changes {
    fn id(&self) -> i64;
    fn changes(&self) -> Vec<(&'static str, Value)>;
}

/// Push `column = value` when the field was provided.
pub(crate) fn set<T: Into<Value>>(
    out: &mut Vec<(&'static str, Value)>,
    column: &'static str,
    value: Option<T>,
) {
    if let Some(v) = value {
        out.push((column, v.into()));
    }
}

pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

// ── Table Repository ────────────────────────────────────────────────────────

/// Row-level CRUD against one entity table.
pub struct TableRepository<'c, E> {
    conn: &'c Connection,
    _entity: PhantomData<E>,
}

impl<'c, E: Entity> TableRepository<'c, E> {
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            _entity: PhantomData,
        }
    }

    /// Insert a new row and return it as stored, with its assigned id.
    pub fn insert(&self, entity: &E) -> Result<E, OperationError> {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            E::TABLE,
            E::COLUMNS.join(", "),
            placeholders(E::COLUMNS.len())
        );
        self.conn.execute(&sql, params_from_iter(entity.values()))?;
        let id = self.conn.last_insert_rowid();
        self.find(id)?.ok_or_else(|| OperationError::not_found::<E>(id))
    }

    /// Overwrite every column of an existing row, clearing absent values.
    pub fn update_full(&self, entity: &E) -> Result<E, OperationError> {
        let assignments: Vec<String> = E::COLUMNS.iter().map(|c| format!("{c} = ?")).collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?",
            E::TABLE,
            assignments.join(", ")
        );
        let mut args = entity.values();
        args.push(Value::Integer(entity.id()));
        let changed = self.conn.execute(&sql, params_from_iter(args))?;
        if changed == 0 {
            return Err(OperationError::not_found::<E>(entity.id()));
        }
        self.find(entity.id())?
            .ok_or_else(|| OperationError::not_found::<E>(entity.id()))
    }

    /// Write only the given columns of an existing row.
    pub fn update_columns(
        &self,
        id: i64,
        changes: Vec<(&'static str, Value)>,
    ) -> Result<E, OperationError> {
        if !changes.is_empty() {
            let assignments: Vec<String> =
                changes.iter().map(|(c, _)| format!("{c} = ?")).collect();
            let sql = format!(
                "UPDATE {} SET {} WHERE id = ?",
                E::TABLE,
                assignments.join(", ")
            );
            let mut args: Vec<Value> = changes.into_iter().map(|(_, v)| v).collect();
            args.push(Value::Integer(id));
            let changed = self.conn.execute(&sql, params_from_iter(args))?;
            if changed == 0 {
                return Err(OperationError::not_found::<E>(id));
            }
        }
        self.find(id)?.ok_or_else(|| OperationError::not_found::<E>(id))
    }

    pub fn update<P: Changes>(&self, partial: &P) -> Result<E, OperationError> {
        self.update_columns(partial.id(), partial.changes())
    }

    pub fn destroy(&self, id: i64) -> Result<(), OperationError> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", E::TABLE);
        let changed = self.conn.execute(&sql, params![id])?;
        if changed == 0 {
            return Err(OperationError::not_found::<E>(id));
        }
        Ok(())
    }

    /// Look up a row by id. A missing row is `Ok(None)`, not an error.
    pub fn find(&self, id: i64) -> Result<Option<E>, OperationError> {
        let sql = format!("SELECT * FROM {} WHERE id = ?1", E::TABLE);
        let result = self.conn.query_row(&sql, params![id], E::from_row);
        match result {
            Ok(e) => Ok(Some(e)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Look up every id, in order. Fails if any id is absent.
    pub fn find_many(&self, ids: &[i64]) -> Result<Vec<E>, OperationError> {
        let mut out = Vec::with_capacity(ids.len());
        for &id in ids {
            match self.find(id)? {
                Some(e) => out.push(e),
                None => {
                    return Err(OperationError::MissingRequired {
                        entity_type: E::ENTITY_TYPE.to_string(),
                        id,
                    });
                }
            }
        }
        Ok(out)
    }

    /// First row whose `column` equals `value`.
    pub fn find_by(
        &self,
        column: &str,
        value: Value,
        nocase: bool,
    ) -> Result<Option<E>, OperationError> {
        let collate = if nocase { " COLLATE NOCASE" } else { "" };
        let sql = format!(
            "SELECT * FROM {} WHERE {column} = ?1{collate} ORDER BY id LIMIT 1",
            E::TABLE
        );
        let result = self.conn.query_row(&sql, params![value], E::from_row);
        match result {
            Ok(e) => Ok(Some(e)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Every row whose `column` matches one of `values`.
    pub fn find_all_by(
        &self,
        column: &str,
        values: Vec<Value>,
        nocase: bool,
    ) -> Result<Vec<E>, OperationError> {
        if values.is_empty() {
            return Ok(Vec::new());
        }
        let collate = if nocase { " COLLATE NOCASE" } else { "" };
        let sql = format!(
            "SELECT * FROM {} WHERE {column}{collate} IN ({}) ORDER BY id",
            E::TABLE,
            placeholders(values.len())
        );
        self.select(&sql, values)
    }

    /// Rows of an arbitrary `SELECT * FROM <table> ...` statement.
    pub fn select(&self, sql: &str, args: Vec<Value>) -> Result<Vec<E>, OperationError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(args), E::from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn count(&self) -> Result<i64, OperationError> {
        let sql = format!("SELECT COUNT(*) FROM {}", E::TABLE);
        let n = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(n)
    }

    pub fn all(&self) -> Result<Vec<E>, OperationError> {
        let sql = format!("SELECT * FROM {} ORDER BY id", E::TABLE);
        self.select(&sql, Vec::new())
    }
}

// ── Join Repository ─────────────────────────────────────────────────────────

/// A many-to-many link table seen from one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub join_table: &'static str,
    /// Column holding the id of the owning entity.
    pub id_column: &'static str,
    /// Column holding the id of the related entity.
    pub fk_column: &'static str,
}

impl Relation {
    pub const fn new(
        join_table: &'static str,
        id_column: &'static str,
        fk_column: &'static str,
    ) -> Self {
        Self {
            join_table,
            id_column,
            fk_column,
        }
    }
}

pub struct JoinRepository<'c> {
    conn: &'c Connection,
    relation: Relation,
}

impl<'c> JoinRepository<'c> {
    pub fn new(conn: &'c Connection, relation: Relation) -> Self {
        Self { conn, relation }
    }

    pub fn get_ids(&self, id: i64) -> Result<Vec<i64>, OperationError> {
        let Relation {
            join_table,
            id_column,
            fk_column,
        } = self.relation;
        let sql = format!(
            "SELECT {fk_column} FROM {join_table} WHERE {id_column} = ?1 ORDER BY {fk_column}"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![id], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Owning-side ids linked to the given related id.
    pub fn get_owner_ids(&self, fk: i64) -> Result<Vec<i64>, OperationError> {
        let Relation {
            join_table,
            id_column,
            fk_column,
        } = self.relation;
        let sql = format!(
            "SELECT {id_column} FROM {join_table} WHERE {fk_column} = ?1 ORDER BY {id_column}"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![fk], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn add(&self, id: i64, fk: i64) -> Result<(), OperationError> {
        let Relation {
            join_table,
            id_column,
            fk_column,
        } = self.relation;
        let sql =
            format!("INSERT OR IGNORE INTO {join_table} ({id_column}, {fk_column}) VALUES (?1, ?2)");
        self.conn.execute(&sql, params![id, fk])?;
        Ok(())
    }

    pub fn destroy(&self, id: i64) -> Result<(), OperationError> {
        let Relation {
            join_table,
            id_column,
            ..
        } = self.relation;
        let sql = format!("DELETE FROM {join_table} WHERE {id_column} = ?1");
        self.conn.execute(&sql, params![id])?;
        Ok(())
    }

    /// Replace every link of `id` with exactly `fks`.
    pub fn replace(&self, id: i64, fks: &[i64]) -> Result<(), OperationError> {
        atomically(self.conn, || {
            self.destroy(id)?;
            for &fk in fks {
                self.add(id, fk)?;
            }
            Ok(())
        })
    }
}

/// Run `f` inside a savepoint, so a partial write is never visible whether
/// or not an outer transaction is open.
pub(crate) fn atomically<T>(
    conn: &Connection,
    f: impl FnOnce() -> Result<T, OperationError>,
) -> Result<T, OperationError> {
    conn.execute_batch("SAVEPOINT mediagraph_replace")?;
    match f() {
        Ok(v) => {
            conn.execute_batch("RELEASE mediagraph_replace")?;
            Ok(v)
        }
        Err(e) => {
            conn.execute_batch("ROLLBACK TO mediagraph_replace; RELEASE mediagraph_replace")?;
            Err(e)
        }
    }
}

// ── Counters ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CounterOp {
    Increment,
    Decrement,
    Reset,
}

/// Apply a counter operation and return the stored value.
///
/// Decrement only matches rows whose counter is positive, so the stored
/// value never drops below zero.
pub(crate) fn update_counter<E: Entity>(
    conn: &Connection,
    column: &str,
    id: i64,
    op: CounterOp,
) -> Result<i64, OperationError> {
    let table = E::TABLE;
    let sql = match op {
        CounterOp::Increment => {
            format!("UPDATE {table} SET {column} = {column} + 1 WHERE id = ?1")
        }
        CounterOp::Decrement => {
            format!("UPDATE {table} SET {column} = {column} - 1 WHERE id = ?1 AND {column} > 0")
        }
        CounterOp::Reset => format!("UPDATE {table} SET {column} = 0 WHERE id = ?1"),
    };
    conn.execute(&sql, params![id])?;

    let sql = format!("SELECT {column} FROM {table} WHERE id = ?1");
    match conn.query_row(&sql, params![id], |row| row.get(0)) {
        Ok(v) => Ok(v),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(OperationError::not_found::<E>(id)),
        Err(e) => Err(e.into()),
    }
}
