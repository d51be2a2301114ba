//! JSON loading for exported catalog snapshots.
//!
//! Expected structure:
//! ```text
//! export_dir/
//!   mappings.json
//!   scraped.json        (optional)
//!   tags/<checksum>.json
//!   performers/<checksum>.json
//!   studios/<checksum>.json
//!   movies/<checksum>.json
//!   galleries/<checksum>.json
//!   scenes/<checksum>.json
//!   images/<checksum>.json
//! ```

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::jsonschema::{EntityKind, ImportManifest, ScrapedItemRecord};

pub const MAPPINGS_FILE: &str = "mappings.json";
pub const SCRAPED_FILE: &str = "scraped.json";

#[derive(Debug, Error)]
pub enum JsonError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("JSON parse error in {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("No record directory for {0}")]
    NoRecordDir(EntityKind),
}

/// Path of the record file for `checksum` within an export directory.
pub fn record_path(base: &Path, kind: EntityKind, checksum: &str) -> Result<PathBuf, JsonError> {
    let dir = kind.dir_name().ok_or(JsonError::NoRecordDir(kind))?;
    Ok(base.join(dir).join(format!("{checksum}.json")))
}

/// Load the manifest of an export directory.
pub fn load_manifest(base: &Path) -> Result<ImportManifest, JsonError> {
    load_json_file(&base.join(MAPPINGS_FILE))
}

/// Load the scraped-item list, or `None` when the export has none.
pub fn load_scraped(base: &Path) -> Result<Option<Vec<ScrapedItemRecord>>, JsonError> {
    let path = base.join(SCRAPED_FILE);
    if !path.exists() {
        return Ok(None);
    }
    load_json_file(&path).map(Some)
}

/// Load the serialized record of one entity by checksum.
pub fn load_record<T: DeserializeOwned>(
    base: &Path,
    kind: EntityKind,
    checksum: &str,
) -> Result<T, JsonError> {
    load_json_file(&record_path(base, kind, checksum)?)
}

/// Generic helper: read and parse a single JSON file.
fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, JsonError> {
    let contents = std::fs::read_to_string(path).map_err(|e| JsonError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_json::from_str(&contents).map_err(|e| JsonError::Parse {
        path: path.display().to_string(),
        source: e,
    })
}
