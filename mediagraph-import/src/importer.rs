//! The per-entity import protocol and the duplicate policy that drives it.

use mediagraph_catalog::EntityKind;
use mediagraph_db::TxnScope;

use crate::config::DuplicateBehaviour;
use crate::error::ImportError;

/// What happened to one imported record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created(i64),
    Updated(i64),
    Skipped(i64),
}

impl Outcome {
    pub fn id(&self) -> i64 {
        match self {
            Self::Created(id) | Self::Updated(id) | Self::Skipped(id) => *id,
        }
    }
}

/// Imports one serialized record of a single entity type.
///
/// Every method runs inside the transaction of the instance being imported.
/// `pre_import` resolves references (and may create placeholders);
/// `post_import` writes relation rows once the row id is known.
pub trait Importer {
    const KIND: EntityKind;

    fn pre_import(&mut self, txn: &TxnScope<'_>) -> Result<(), ImportError>;

    /// Human-readable identity used in conflict messages.
    fn name(&self) -> String;

    fn find_existing_id(&self, txn: &TxnScope<'_>) -> Result<Option<i64>, ImportError>;

    fn create(&mut self, txn: &TxnScope<'_>) -> Result<i64, ImportError>;

    fn update(&mut self, txn: &TxnScope<'_>, id: i64) -> Result<(), ImportError>;

    fn post_import(&mut self, txn: &TxnScope<'_>, id: i64) -> Result<(), ImportError>;

    /// Warnings collected while resolving references.
    fn take_warnings(&mut self) -> Vec<String>;
}

/// Run one importer to completion under `duplicate`.
///
/// A `Skip` returns before `post_import`, so the stored row and its
/// relations stay untouched.
pub fn perform_import<I: Importer>(
    importer: &mut I,
    txn: &TxnScope<'_>,
    duplicate: DuplicateBehaviour,
) -> Result<Outcome, ImportError> {
    importer.pre_import(txn)?;

    let outcome = match importer.find_existing_id(txn)? {
        Some(id) => match duplicate {
            DuplicateBehaviour::Fail => {
                return Err(ImportError::DuplicateConflict {
                    kind: I::KIND,
                    name: importer.name(),
                });
            }
            DuplicateBehaviour::Skip => return Ok(Outcome::Skipped(id)),
            DuplicateBehaviour::Overwrite => {
                importer.update(txn, id)?;
                Outcome::Updated(id)
            }
        },
        None => Outcome::Created(importer.create(txn)?),
    };

    importer.post_import(txn, outcome.id())?;
    Ok(outcome)
}
