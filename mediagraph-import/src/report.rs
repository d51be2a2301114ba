//! Per-instance outcome log of an import run.

use std::collections::BTreeMap;
use std::fmt;

use mediagraph_catalog::EntityKind;

use crate::error::ImportError;
use crate::importer::Outcome;

/// Why an instance failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Duplicate,
    MissingReference,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemResult {
    Created(i64),
    Updated(i64),
    Skipped(i64),
    Failed(FailureKind, String),
}

impl ItemResult {
    pub fn id(&self) -> Option<i64> {
        match self {
            Self::Created(id) | Self::Updated(id) | Self::Skipped(id) => Some(*id),
            Self::Failed(..) => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(..))
    }
}

impl From<Outcome> for ItemResult {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Created(id) => Self::Created(id),
            Outcome::Updated(id) => Self::Updated(id),
            Outcome::Skipped(id) => Self::Skipped(id),
        }
    }
}

impl From<&ImportError> for ItemResult {
    fn from(err: &ImportError) -> Self {
        let kind = match err {
            ImportError::DuplicateConflict { .. } => FailureKind::Duplicate,
            ImportError::MissingReferenceConflict { .. } => FailureKind::MissingReference,
            _ => FailureKind::Other,
        };
        Self::Failed(kind, err.to_string())
    }
}

/// One manifest entry (or embedded record) and what became of it.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemOutcome {
    pub key: String,
    pub result: ItemResult,
}

/// Counts for one entity type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct KindSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl fmt::Display for KindSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} skipped, {} failed",
            self.created, self.updated, self.skipped, self.failed
        )
    }
}

#[derive(Debug, Default)]
pub struct ImportReport {
    items: BTreeMap<EntityKind, Vec<ItemOutcome>>,
    pub warnings: Vec<String>,
}

impl ImportReport {
    pub fn record(&mut self, kind: EntityKind, key: impl Into<String>, result: ItemResult) {
        self.items.entry(kind).or_default().push(ItemOutcome {
            key: key.into(),
            result,
        });
    }

    pub fn warn(&mut self, message: String) {
        log::warn!("{}", message);
        self.warnings.push(message);
    }

    /// Outcomes for one type, in import order.
    pub fn items(&self, kind: EntityKind) -> &[ItemOutcome] {
        self.items.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Look up the outcome recorded under `key`.
    pub fn find(&self, kind: EntityKind, key: &str) -> Option<&ItemResult> {
        self.items(kind)
            .iter()
            .find(|item| item.key == key)
            .map(|item| &item.result)
    }

    pub fn kinds(&self) -> impl Iterator<Item = EntityKind> + '_ {
        self.items.keys().copied()
    }

    pub fn summary(&self, kind: EntityKind) -> KindSummary {
        let mut summary = KindSummary::default();
        for item in self.items(kind) {
            match item.result {
                ItemResult::Created(_) => summary.created += 1,
                ItemResult::Updated(_) => summary.updated += 1,
                ItemResult::Skipped(_) => summary.skipped += 1,
                ItemResult::Failed(..) => summary.failed += 1,
            }
        }
        summary
    }

    pub fn has_failures(&self) -> bool {
        self.items
            .values()
            .flatten()
            .any(|item| item.result.is_failure())
    }

    /// Failures caused by the duplicate or missing-reference policy.
    pub fn conflicts(&self) -> Vec<(EntityKind, &ItemOutcome)> {
        self.items
            .iter()
            .flat_map(|(kind, items)| items.iter().map(move |item| (*kind, item)))
            .filter(|(_, item)| {
                matches!(
                    item.result,
                    ItemResult::Failed(FailureKind::Duplicate | FailureKind::MissingReference, _)
                )
            })
            .collect()
    }
}
