use mediagraph_catalog::{EntityKind, Studio, StudioRecord, checksum_from_name};
use mediagraph_db::{Repository, TxnScope};

use crate::config::{ImportContext, MissingRefBehaviour};
use crate::error::ImportError;
use crate::importer::Importer;
use crate::references::References;

/// How a studio's parent reference is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentResolution {
    /// An absent parent yields [`ImportError::ParentNotExist`] so the caller
    /// can queue the studio until the parent has been imported.
    Defer,
    /// An absent parent is handled by the given policy.
    Policy(MissingRefBehaviour),
}

pub struct StudioImporter {
    studio: Studio,
    parent_name: Option<String>,
    parent: ParentResolution,
    refs: References,
}

impl StudioImporter {
    pub fn new(record: StudioRecord, ctx: &ImportContext, parent: ParentResolution) -> Self {
        let studio = Studio {
            id: 0,
            checksum: checksum_from_name(&record.name),
            name: record.name,
            url: record.url,
            parent_id: None,
            rating: record.rating,
            details: record.details,
            created_at: ctx.timestamp(record.created_at.as_deref()),
            updated_at: ctx.timestamp(record.updated_at.as_deref()),
        };
        Self {
            studio,
            parent_name: record.parent_studio,
            parent,
            refs: References::new(*ctx, EntityKind::Studio),
        }
    }
}

impl Importer for StudioImporter {
    const KIND: EntityKind = EntityKind::Studio;

    fn pre_import(&mut self, txn: &TxnScope<'_>) -> Result<(), ImportError> {
        let Some(parent_name) = self.parent_name.as_deref() else {
            return Ok(());
        };
        if parent_name == self.studio.name {
            self.refs.warn(format!(
                "studio '{}' names itself as parent, imported without one",
                parent_name
            ));
            return Ok(());
        }

        self.studio.parent_id = match self.parent {
            ParentResolution::Defer => match txn.studios().find_by_name(parent_name, false)? {
                Some(parent) => Some(parent.id),
                None => return Err(ImportError::ParentNotExist(parent_name.to_string())),
            },
            ParentResolution::Policy(policy) => {
                self.refs.studio_with(txn, parent_name, policy)?
            }
        };
        Ok(())
    }

    fn name(&self) -> String {
        self.studio.name.clone()
    }

    fn find_existing_id(&self, txn: &TxnScope<'_>) -> Result<Option<i64>, ImportError> {
        Ok(txn
            .studios()
            .find_by_checksum(&self.studio.checksum)?
            .map(|s| s.id))
    }

    fn create(&mut self, txn: &TxnScope<'_>) -> Result<i64, ImportError> {
        Ok(txn.studios().create(&self.studio)?.id)
    }

    fn update(&mut self, txn: &TxnScope<'_>, id: i64) -> Result<(), ImportError> {
        let studio = Studio {
            id,
            ..self.studio.clone()
        };
        txn.studios().update_full(&studio)?;
        Ok(())
    }

    fn post_import(&mut self, _txn: &TxnScope<'_>, _id: i64) -> Result<(), ImportError> {
        Ok(())
    }

    fn take_warnings(&mut self) -> Vec<String> {
        self.refs.take_warnings()
    }
}
