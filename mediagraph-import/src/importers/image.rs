use mediagraph_catalog::{EntityKind, Image, ImageRecord};
use mediagraph_db::{Repository, TxnScope};

use crate::config::ImportContext;
use crate::error::ImportError;
use crate::importer::Importer;
use crate::references::References;

pub struct ImageImporter {
    image: Image,
    studio_name: Option<String>,
    gallery_checksums: Vec<String>,
    performer_names: Vec<String>,
    tag_names: Vec<String>,
    gallery_ids: Vec<i64>,
    performer_ids: Vec<i64>,
    tag_ids: Vec<i64>,
    refs: References,
}

impl ImageImporter {
    pub fn new(
        checksum: String,
        path: Option<String>,
        record: ImageRecord,
        ctx: &ImportContext,
    ) -> Self {
        let file = record.file.unwrap_or_default();
        let image = Image {
            id: 0,
            checksum,
            path: path.unwrap_or_default(),
            title: record.title,
            rating: record.rating,
            organized: record.organized,
            o_counter: record.o_counter.max(0),
            size: file.size,
            width: file.width,
            height: file.height,
            studio_id: None,
            created_at: ctx.timestamp(record.created_at.as_deref()),
            updated_at: ctx.timestamp(record.updated_at.as_deref()),
        };
        Self {
            image,
            studio_name: record.studio,
            gallery_checksums: record.galleries,
            performer_names: record.performers,
            tag_names: record.tags,
            gallery_ids: Vec::new(),
            performer_ids: Vec::new(),
            tag_ids: Vec::new(),
            refs: References::new(*ctx, EntityKind::Image),
        }
    }
}

impl Importer for ImageImporter {
    const KIND: EntityKind = EntityKind::Image;

    fn pre_import(&mut self, txn: &TxnScope<'_>) -> Result<(), ImportError> {
        if let Some(studio) = self.studio_name.as_deref() {
            self.image.studio_id = self.refs.studio(txn, studio)?;
        }
        self.gallery_ids = self.refs.galleries(txn, &self.gallery_checksums)?;
        self.performer_ids = self.refs.performers(txn, &self.performer_names)?;
        self.tag_ids = self.refs.tags(txn, &self.tag_names)?;
        Ok(())
    }

    fn name(&self) -> String {
        if self.image.path.is_empty() {
            self.image.checksum.clone()
        } else {
            self.image.path.clone()
        }
    }

    fn find_existing_id(&self, txn: &TxnScope<'_>) -> Result<Option<i64>, ImportError> {
        Ok(txn
            .images()
            .find_by_checksum(&self.image.checksum)?
            .map(|i| i.id))
    }

    fn create(&mut self, txn: &TxnScope<'_>) -> Result<i64, ImportError> {
        Ok(txn.images().create(&self.image)?.id)
    }

    fn update(&mut self, txn: &TxnScope<'_>, id: i64) -> Result<(), ImportError> {
        let image = Image {
            id,
            ..self.image.clone()
        };
        txn.images().update_full(&image)?;
        Ok(())
    }

    fn post_import(&mut self, txn: &TxnScope<'_>, id: i64) -> Result<(), ImportError> {
        let images = txn.images();
        images.update_galleries(id, &self.gallery_ids)?;
        images.update_performers(id, &self.performer_ids)?;
        images.update_tags(id, &self.tag_ids)?;
        Ok(())
    }

    fn take_warnings(&mut self) -> Vec<String> {
        self.refs.take_warnings()
    }
}
