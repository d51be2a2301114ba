pub(crate) mod import;
pub(crate) mod query;

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::error::CliError;

fn app_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("mediagraph")
}

pub(crate) fn default_db_path() -> PathBuf {
    app_config_dir().join("mediagraph.sqlite")
}

/// Default import config; a missing file means built-in defaults.
pub(crate) fn default_config_path() -> PathBuf {
    app_config_dir().join("import.toml")
}

/// Open (creating if needed) the catalog database at `db_path`.
pub(crate) fn open_catalog(db_path: Option<PathBuf>) -> Result<Connection, CliError> {
    let db_path = db_path.unwrap_or_else(default_db_path);
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    open_at(&db_path)
}

fn open_at(db_path: &Path) -> Result<Connection, CliError> {
    log::debug!("Opening catalog database at {}", db_path.display());
    mediagraph_db::open_database(db_path).map_err(|e| {
        CliError::database(format!(
            "failed to open catalog database at {}: {}",
            db_path.display(),
            e
        ))
    })
}
