//! The import run: unpack, read the manifest, then import every entity type
//! in dependency order, one transaction per instance.

use std::path::Path;

use mediagraph_catalog::{
    EntityKind, ImportManifest, MappingEntry, ScrapedItemRecord, SceneMarkerRecord, SceneRecord,
    StudioRecord, load_manifest, load_record, load_scraped,
};
use mediagraph_db::{TxnScope, reset_schema};
use rusqlite::Connection;
use serde::de::DeserializeOwned;

use crate::archive;
use crate::config::{ImportConfig, ImportContext, MissingRefBehaviour};
use crate::error::ImportError;
use crate::importer::{Importer, Outcome, perform_import};
use crate::importers::{
    GalleryImporter, ImageImporter, MovieImporter, ParentResolution, PerformerImporter,
    SceneImporter, SceneMarkerImporter, StudioImporter, TagImporter, import_scraped_item,
    scraped_key,
};
use crate::pending::{PendingParents, PendingStudio};
use crate::progress::{ImportProgress, SilentProgress};
use crate::references::References;
use crate::report::ImportReport;

pub struct ImportTask<'a> {
    conn: &'a Connection,
    config: ImportConfig,
    progress: &'a dyn ImportProgress,
}

impl<'a> ImportTask<'a> {
    pub fn new(conn: &'a Connection, config: ImportConfig) -> Self {
        Self {
            conn,
            config,
            progress: &SilentProgress,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn ImportProgress) -> Self {
        self.progress = progress;
        self
    }

    /// Import the export at `input`, a directory or a `.zip` of one.
    ///
    /// Returns `Err` only when the run cannot start: a bad config, an
    /// archive that cannot be unpacked, an unreadable manifest or a failed
    /// reset. Failures of individual records are recorded in the report.
    pub fn run(&self, input: &Path) -> Result<ImportReport, ImportError> {
        let ctx = ImportContext::new(&self.config)?;

        let unpacked;
        let base = if archive::is_archive(input) {
            unpacked = archive::unpack(input)?;
            unpacked.path()
        } else {
            input
        };

        let manifest =
            load_manifest(base).map_err(|e| ImportError::MissingManifest(e.to_string()))?;

        let mut report = ImportReport::default();
        let scraped = match load_scraped(base) {
            Ok(Some(items)) => items,
            Ok(None) => {
                report.warn(format!("[{}] no scraped items in export", EntityKind::ScrapedItem));
                Vec::new()
            }
            Err(e) => {
                report.warn(format!("[{}] {}", EntityKind::ScrapedItem, e));
                Vec::new()
            }
        };

        if self.config.reset {
            log::info!("Resetting database before import");
            reset_schema(self.conn)?;
        }

        let mut run = Run {
            conn: self.conn,
            ctx,
            base,
            progress: self.progress,
            report,
        };
        run.import_all(&manifest, scraped);

        let report = run.report;
        let failed: usize = report.kinds().map(|k| report.summary(k).failed).sum();
        self.progress.on_complete(&format!(
            "Import complete: {} failed, {} warnings",
            failed,
            report.warnings.len()
        ));
        Ok(report)
    }
}

/// State of one run.
struct Run<'a> {
    conn: &'a Connection,
    ctx: ImportContext,
    base: &'a Path,
    progress: &'a dyn ImportProgress,
    report: ImportReport,
}

impl Run<'_> {
    fn import_all(&mut self, manifest: &ImportManifest, scraped: Vec<ScrapedItemRecord>) {
        self.import_entries(EntityKind::Tag, manifest.entries(EntityKind::Tag), |r, _, ctx| {
            TagImporter::new(r, ctx)
        });
        self.import_entries(
            EntityKind::Performer,
            manifest.entries(EntityKind::Performer),
            |r, _, ctx| PerformerImporter::new(r, ctx),
        );
        self.import_studios(manifest.entries(EntityKind::Studio));
        self.import_entries(EntityKind::Movie, manifest.entries(EntityKind::Movie), |r, _, ctx| {
            MovieImporter::new(r, ctx)
        });
        self.import_entries(
            EntityKind::Gallery,
            manifest.entries(EntityKind::Gallery),
            |r, entry, ctx| GalleryImporter::new(r, entry.path.clone(), ctx),
        );
        self.import_scraped(scraped);
        self.import_scenes(manifest.entries(EntityKind::Scene));
        self.import_entries(EntityKind::Image, manifest.entries(EntityKind::Image), |r, entry, ctx| {
            ImageImporter::new(entry.checksum.clone(), entry.path.clone(), r, ctx)
        });

        for kind in self.report.kinds().collect::<Vec<_>>() {
            log::info!("[{}] {}", kind, self.report.summary(kind));
        }
    }

    /// Import every manifest entry of one kind with the importer `make`
    /// builds from its record.
    fn import_entries<R, I, F>(&mut self, kind: EntityKind, entries: &[MappingEntry], make: F)
    where
        R: DeserializeOwned,
        I: Importer,
        F: Fn(R, &MappingEntry, &ImportContext) -> I,
    {
        self.progress.on_phase(&format!("[{kind}] importing"));
        for (i, entry) in entries.iter().enumerate() {
            self.progress.on_item(kind, i + 1, entries.len(), &entry.checksum);
            let Some(record) = self.load::<R>(kind, entry) else {
                continue;
            };
            let mut importer = make(record, entry, &self.ctx);
            let result = self.run_importer(&mut importer);
            self.finish(kind, &entry.checksum, result);
        }
        self.progress.on_phase(&format!("[{kind}] import complete"));
    }

    fn load<R: DeserializeOwned>(&mut self, kind: EntityKind, entry: &MappingEntry) -> Option<R> {
        match load_record(self.base, kind, &entry.checksum) {
            Ok(record) => Some(record),
            Err(e) => {
                self.finish(kind, &entry.checksum, Err(e.into()));
                None
            }
        }
    }

    /// Run one importer in its own transaction, committing only when a row
    /// was created or updated. A skipped record rolls back, discarding any
    /// placeholders its references created along with their warnings.
    fn run_importer<I: Importer>(&mut self, importer: &mut I) -> Result<Outcome, ImportError> {
        let txn = TxnScope::begin(self.conn)?;
        let result = perform_import(importer, &txn, self.ctx.duplicate);
        let warnings = importer.take_warnings();
        if let Ok(outcome @ Outcome::Skipped(_)) = result {
            txn.rollback()?;
            return Ok(outcome);
        }
        for warning in warnings {
            self.report.warn(warning);
        }
        let outcome = result?;
        txn.commit()?;
        Ok(outcome)
    }

    fn finish(
        &mut self,
        kind: EntityKind,
        key: &str,
        result: Result<Outcome, ImportError>,
    ) -> Option<Outcome> {
        match result {
            Ok(outcome) => {
                log::debug!("[{}] {} {:?}", kind, key, outcome);
                self.report.record(kind, key, outcome.into());
                Some(outcome)
            }
            Err(e) => {
                log::error!("[{}] {} import failed: {}", kind, key, e);
                self.report.record(kind, key, (&e).into());
                None
            }
        }
    }

    fn import_studios(&mut self, entries: &[MappingEntry]) {
        let kind = EntityKind::Studio;
        self.progress.on_phase(&format!("[{kind}] importing"));

        let mut pending = PendingParents::default();
        for (i, entry) in entries.iter().enumerate() {
            self.progress.on_item(kind, i + 1, entries.len(), &entry.checksum);
            let Some(record) = self.load::<StudioRecord>(kind, entry) else {
                continue;
            };
            let studio = PendingStudio {
                key: entry.checksum.clone(),
                record,
            };
            self.import_studio(studio, ParentResolution::Defer, &mut pending);
        }

        if !pending.is_empty() {
            log::info!("[{}] {} studios still waiting for a parent", kind, pending.len());
            let policy = match self.ctx.missing_refs {
                MissingRefBehaviour::Create => MissingRefBehaviour::Create,
                _ => MissingRefBehaviour::Ignore,
            };
            while let Some((parent, orphans)) = pending.pop_first() {
                for orphan in orphans {
                    self.report.warn(format!(
                        "[{}] '{}' still waiting for parent '{}' after all studios were processed",
                        kind, orphan.record.name, parent
                    ));
                    self.import_studio(orphan, ParentResolution::Policy(policy), &mut pending);
                }
            }
        }

        self.progress.on_phase(&format!("[{kind}] import complete"));
    }

    /// Import one studio; once it exists, import every studio that was
    /// waiting on it, recursively.
    fn import_studio(
        &mut self,
        studio: PendingStudio,
        parent: ParentResolution,
        pending: &mut PendingParents,
    ) {
        let mut importer = StudioImporter::new(studio.record.clone(), &self.ctx, parent);
        match self.run_importer(&mut importer) {
            Err(ImportError::ParentNotExist(parent_name)) => {
                log::debug!(
                    "[{}] {} waiting for parent '{}'",
                    EntityKind::Studio,
                    studio.record.name,
                    parent_name
                );
                pending.defer(parent_name, studio);
            }
            result => {
                if self.finish(EntityKind::Studio, &studio.key, result).is_some() {
                    for child in pending.take_children(&studio.record.name) {
                        self.import_studio(child, ParentResolution::Defer, pending);
                    }
                }
            }
        }
    }

    fn import_scraped(&mut self, items: Vec<ScrapedItemRecord>) {
        let kind = EntityKind::ScrapedItem;
        self.progress.on_phase(&format!("[{kind}] importing"));
        let total = items.len();
        for (i, record) in items.into_iter().enumerate() {
            let key = scraped_key(&record, i);
            self.progress.on_item(kind, i + 1, total, &key);

            let mut refs = References::new(self.ctx, kind);
            let result = TxnScope::begin(self.conn)
                .map_err(ImportError::from)
                .and_then(|txn| {
                    let id = import_scraped_item(&txn, record, &mut refs)?;
                    txn.commit()?;
                    Ok(Outcome::Created(id))
                });
            for warning in refs.take_warnings() {
                self.report.warn(warning);
            }
            self.finish(kind, &key, result);
        }
        self.progress.on_phase(&format!("[{kind}] import complete"));
    }

    fn import_scenes(&mut self, entries: &[MappingEntry]) {
        let kind = EntityKind::Scene;
        self.progress.on_phase(&format!("[{kind}] importing"));
        for (i, entry) in entries.iter().enumerate() {
            self.progress.on_item(kind, i + 1, entries.len(), &entry.checksum);
            let Some(record) = self.load::<SceneRecord>(kind, entry) else {
                continue;
            };
            let (mut importer, markers) =
                SceneImporter::new(entry.checksum.clone(), entry.path.clone(), record, &self.ctx);
            let result = self.run_importer(&mut importer);
            match self.finish(kind, &entry.checksum, result) {
                Some(Outcome::Created(id) | Outcome::Updated(id)) => {
                    self.import_markers(&entry.checksum, id, markers);
                }
                // A skipped scene keeps its stored markers.
                Some(Outcome::Skipped(_)) | None => {}
            }
        }
        self.progress.on_phase(&format!("[{kind}] import complete"));
    }

    /// Markers of a committed scene, each in its own transaction; a failed
    /// marker leaves the scene and its other markers in place.
    fn import_markers(&mut self, scene_key: &str, scene_id: i64, markers: Vec<SceneMarkerRecord>) {
        for marker in markers {
            let key = format!("{}@{}", scene_key, marker.seconds);
            let mut importer = SceneMarkerImporter::new(scene_id, marker, &self.ctx);
            let result = self.run_importer(&mut importer);
            self.finish(EntityKind::SceneMarker, &key, result);
        }
    }
}
