use mediagraph_catalog::{EntityKind, Performer, PerformerRecord, checksum_from_name};
use mediagraph_db::{Repository, TxnScope};

use crate::config::ImportContext;
use crate::error::ImportError;
use crate::importer::Importer;
use crate::references::References;

pub struct PerformerImporter {
    performer: Performer,
    tag_names: Vec<String>,
    tag_ids: Vec<i64>,
    refs: References,
}

impl PerformerImporter {
    pub fn new(record: PerformerRecord, ctx: &ImportContext) -> Self {
        let performer = Performer {
            id: 0,
            checksum: checksum_from_name(&record.name),
            name: record.name,
            gender: record.gender,
            url: record.url,
            birthdate: record.birthdate,
            death_date: record.death_date,
            ethnicity: record.ethnicity,
            country: record.country,
            career_length: record.career_length,
            aliases: record.aliases,
            favorite: record.favorite,
            rating: record.rating,
            details: record.details,
            created_at: ctx.timestamp(record.created_at.as_deref()),
            updated_at: ctx.timestamp(record.updated_at.as_deref()),
        };
        Self {
            performer,
            tag_names: record.tags,
            tag_ids: Vec::new(),
            refs: References::new(*ctx, EntityKind::Performer),
        }
    }
}

impl Importer for PerformerImporter {
    const KIND: EntityKind = EntityKind::Performer;

    fn pre_import(&mut self, txn: &TxnScope<'_>) -> Result<(), ImportError> {
        self.tag_ids = self.refs.tags(txn, &self.tag_names)?;
        Ok(())
    }

    fn name(&self) -> String {
        self.performer.name.clone()
    }

    fn find_existing_id(&self, txn: &TxnScope<'_>) -> Result<Option<i64>, ImportError> {
        Ok(txn
            .performers()
            .find_by_checksum(&self.performer.checksum)?
            .map(|p| p.id))
    }

    fn create(&mut self, txn: &TxnScope<'_>) -> Result<i64, ImportError> {
        Ok(txn.performers().create(&self.performer)?.id)
    }

    fn update(&mut self, txn: &TxnScope<'_>, id: i64) -> Result<(), ImportError> {
        let performer = Performer {
            id,
            ..self.performer.clone()
        };
        txn.performers().update_full(&performer)?;
        Ok(())
    }

    fn post_import(&mut self, txn: &TxnScope<'_>, id: i64) -> Result<(), ImportError> {
        txn.performers().update_tags(id, &self.tag_ids)?;
        Ok(())
    }

    fn take_warnings(&mut self) -> Vec<String> {
        self.refs.take_warnings()
    }
}
