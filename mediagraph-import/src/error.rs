use mediagraph_catalog::{EntityKind, JsonError};
use mediagraph_db::{OperationError, SchemaError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Database error: {0}")]
    Db(#[from] OperationError),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Json(#[from] JsonError),
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("Invalid import config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("Invalid time zone '{0}', expected a UTC offset such as +02:00")]
    InvalidTimeZone(String),
    #[error("Missing mappings file: {0}")]
    MissingManifest(String),
    #[error("existing {kind} object with name '{name}'")]
    DuplicateConflict { kind: EntityKind, name: String },
    #[error("{kind} '{name}' not found")]
    MissingReferenceConflict { kind: EntityKind, name: String },
    #[error("parent studio '{0}' does not exist")]
    ParentNotExist(String),
}

impl ImportError {
    /// Whether this error is a policy conflict rather than a data or I/O
    /// failure.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::DuplicateConflict { .. } | Self::MissingReferenceConflict { .. }
        )
    }
}
