//! Media catalog data model, filter input types and export-snapshot I/O.
//!
//! This crate defines the entity types and the filter language without any
//! database dependencies. `mediagraph-db` persists and queries them;
//! `mediagraph-import` loads exported snapshots back into a store.

pub mod filter;
pub mod json;
pub mod jsonschema;
pub mod types;

pub use filter::*;
pub use json::{JsonError, load_manifest, load_record, load_scraped, record_path};
pub use jsonschema::*;
pub use types::*;
