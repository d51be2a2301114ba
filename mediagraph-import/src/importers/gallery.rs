use mediagraph_catalog::{EntityKind, Gallery, GalleryRecord};
use mediagraph_db::{Repository, TxnScope};

use crate::config::ImportContext;
use crate::error::ImportError;
use crate::importer::Importer;
use crate::references::References;

pub struct GalleryImporter {
    gallery: Gallery,
    studio_name: Option<String>,
    performer_names: Vec<String>,
    tag_names: Vec<String>,
    performer_ids: Vec<i64>,
    tag_ids: Vec<i64>,
    refs: References,
}

impl GalleryImporter {
    /// `path` is the manifest's path for the gallery, used when the record
    /// carries none.
    pub fn new(record: GalleryRecord, path: Option<String>, ctx: &ImportContext) -> Self {
        let gallery = Gallery {
            id: 0,
            checksum: record.checksum,
            path: record.path.or(path),
            title: record.title,
            url: record.url,
            date: record.date,
            details: record.details,
            rating: record.rating,
            organized: record.organized,
            studio_id: None,
            created_at: ctx.timestamp(record.created_at.as_deref()),
            updated_at: ctx.timestamp(record.updated_at.as_deref()),
        };
        Self {
            gallery,
            studio_name: record.studio,
            performer_names: record.performers,
            tag_names: record.tags,
            performer_ids: Vec::new(),
            tag_ids: Vec::new(),
            refs: References::new(*ctx, EntityKind::Gallery),
        }
    }
}

impl Importer for GalleryImporter {
    const KIND: EntityKind = EntityKind::Gallery;

    fn pre_import(&mut self, txn: &TxnScope<'_>) -> Result<(), ImportError> {
        if let Some(studio) = self.studio_name.as_deref() {
            self.gallery.studio_id = self.refs.studio(txn, studio)?;
        }
        self.performer_ids = self.refs.performers(txn, &self.performer_names)?;
        self.tag_ids = self.refs.tags(txn, &self.tag_names)?;
        Ok(())
    }

    fn name(&self) -> String {
        self.gallery
            .path
            .clone()
            .unwrap_or_else(|| self.gallery.checksum.clone())
    }

    fn find_existing_id(&self, txn: &TxnScope<'_>) -> Result<Option<i64>, ImportError> {
        Ok(txn
            .galleries()
            .find_by_checksum(&self.gallery.checksum)?
            .map(|g| g.id))
    }

    fn create(&mut self, txn: &TxnScope<'_>) -> Result<i64, ImportError> {
        Ok(txn.galleries().create(&self.gallery)?.id)
    }

    fn update(&mut self, txn: &TxnScope<'_>, id: i64) -> Result<(), ImportError> {
        let gallery = Gallery {
            id,
            ..self.gallery.clone()
        };
        txn.galleries().update_full(&gallery)?;
        Ok(())
    }

    fn post_import(&mut self, txn: &TxnScope<'_>, id: i64) -> Result<(), ImportError> {
        let galleries = txn.galleries();
        galleries.update_performers(id, &self.performer_ids)?;
        galleries.update_tags(id, &self.tag_ids)?;
        Ok(())
    }

    fn take_warnings(&mut self) -> Vec<String> {
        self.refs.take_warnings()
    }
}
