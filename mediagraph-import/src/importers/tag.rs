use mediagraph_catalog::{EntityKind, Tag, TagRecord, checksum_from_name};
use mediagraph_db::{Repository, TxnScope};

use crate::config::ImportContext;
use crate::error::ImportError;
use crate::importer::Importer;

pub struct TagImporter {
    tag: Tag,
}

impl TagImporter {
    pub fn new(record: TagRecord, ctx: &ImportContext) -> Self {
        let tag = Tag {
            id: 0,
            checksum: checksum_from_name(&record.name),
            created_at: ctx.timestamp(record.created_at.as_deref()),
            updated_at: ctx.timestamp(record.updated_at.as_deref()),
            name: record.name,
        };
        Self { tag }
    }
}

impl Importer for TagImporter {
    const KIND: EntityKind = EntityKind::Tag;

    fn pre_import(&mut self, _txn: &TxnScope<'_>) -> Result<(), ImportError> {
        Ok(())
    }

    fn name(&self) -> String {
        self.tag.name.clone()
    }

    fn find_existing_id(&self, txn: &TxnScope<'_>) -> Result<Option<i64>, ImportError> {
        Ok(txn.tags().find_by_checksum(&self.tag.checksum)?.map(|t| t.id))
    }

    fn create(&mut self, txn: &TxnScope<'_>) -> Result<i64, ImportError> {
        Ok(txn.tags().create(&self.tag)?.id)
    }

    fn update(&mut self, txn: &TxnScope<'_>, id: i64) -> Result<(), ImportError> {
        let tag = Tag {
            id,
            ..self.tag.clone()
        };
        txn.tags().update_full(&tag)?;
        Ok(())
    }

    fn post_import(&mut self, _txn: &TxnScope<'_>, _id: i64) -> Result<(), ImportError> {
        Ok(())
    }

    fn take_warnings(&mut self) -> Vec<String> {
        Vec::new()
    }
}
