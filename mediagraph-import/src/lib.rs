//! Import exported catalog snapshots into a media catalog database.
//!
//! An export is a directory (or a zip of one) holding a `mappings.json`
//! manifest and one JSON record per entity. [`ImportTask`] imports it type by
//! type in dependency order, one transaction per record, applying the
//! configured duplicate and missing-reference policies. Studios whose parent
//! has not been imported yet are deferred until it has.

pub mod archive;
pub mod config;
pub mod error;
pub mod importer;
pub mod importers;
pub mod pending;
pub mod progress;
pub mod references;
pub mod report;
pub mod task;

pub use config::{DuplicateBehaviour, ImportConfig, ImportContext, MissingRefBehaviour, parse_offset};
pub use error::ImportError;
pub use importer::{Importer, Outcome, perform_import};
pub use progress::{ImportProgress, LogProgress, SilentProgress};
pub use report::{FailureKind, ImportReport, ItemOutcome, ItemResult, KindSummary};
pub use task::ImportTask;
