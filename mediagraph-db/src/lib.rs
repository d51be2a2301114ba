//! SQLite persistence layer for the media catalog.
//!
//! Provides schema creation, per-entity repositories with relation
//! management, and a filter compiler that turns [`FilterNode`] trees into
//! find/count queries, backed by SQLite (via rusqlite with bundled feature).
//!
//! [`FilterNode`]: mediagraph_catalog::FilterNode

pub mod criterion;
pub mod filter;
pub mod query_builder;
pub mod repo;
pub mod repository;
pub mod schema;
pub mod txn;

pub use filter::{CriterionHandler, FilterBuilder, FilterError, Join, SqlClause, compile_filter};
pub use query_builder::{QueryBuilder, SortSpec};
pub use repo::{
    GalleryRepository, ImageRepository, MovieRepository, PerformerRepository, Queryable,
    Repository, SceneMarkerRepository, SceneRepository, ScrapedItemRepository, StudioRepository,
    TagRepository,
};
pub use repository::{Changes, Entity, JoinRepository, OperationError, Relation, TableRepository};
pub use schema::{SchemaError, open_database, open_memory, reset_schema};
pub use txn::TxnScope;
