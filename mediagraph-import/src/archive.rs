//! Unpacking of zipped exports.

use std::fs::File;
use std::io;
use std::path::Path;

use tempfile::TempDir;

use crate::error::ImportError;

/// Whether `path` looks like a zipped export rather than a directory.
pub fn is_archive(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}

/// Extract a zip archive into a fresh temporary directory. The directory
/// is removed when the returned handle is dropped.
///
/// Entries whose names would escape the target directory are skipped.
pub fn unpack(path: &Path) -> Result<TempDir, ImportError> {
    let dir = tempfile::Builder::new().prefix("mediagraph-import").tempdir()?;
    let mut archive = zip::ZipArchive::new(File::open(path)?)?;
    log::info!(
        "Unpacking {} ({} entries) into {}",
        path.display(),
        archive.len(),
        dir.path().display()
    );

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(relative) = entry.enclosed_name() else {
            log::warn!("Skipping archive entry with unsafe name: {}", entry.name());
            continue;
        };
        let target = dir.path().join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        io::copy(&mut entry, &mut out)?;
    }

    Ok(dir)
}
