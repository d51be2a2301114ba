//! Resolution of by-name (and by-checksum) references to stored ids under
//! the missing-reference policy.

use std::collections::{HashMap, HashSet};

use mediagraph_catalog::{EntityKind, Gallery, Movie, Performer, Studio, Tag};
use mediagraph_db::{Repository, TxnScope};

use crate::config::{ImportContext, MissingRefBehaviour};
use crate::error::ImportError;

/// Resolves the references of one record. Placeholders created under
/// [`MissingRefBehaviour::Create`] belong to the importing transaction, so
/// they vanish with it if the instance fails.
pub struct References {
    ctx: ImportContext,
    owner: EntityKind,
    warnings: Vec<String>,
}

impl References {
    pub fn new(ctx: ImportContext, owner: EntityKind) -> Self {
        Self {
            ctx,
            owner,
            warnings: Vec::new(),
        }
    }

    pub fn ctx(&self) -> &ImportContext {
        &self.ctx
    }

    pub fn warn(&mut self, message: String) {
        self.warnings.push(format!("[{}] {}", self.owner, message));
    }

    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    /// Apply `policy` to an unresolved reference. `Ok(true)` means the
    /// caller should create a placeholder.
    fn unresolved(
        &mut self,
        policy: MissingRefBehaviour,
        kind: EntityKind,
        name: &str,
    ) -> Result<bool, ImportError> {
        match policy {
            MissingRefBehaviour::Fail => Err(ImportError::MissingReferenceConflict {
                kind,
                name: name.to_string(),
            }),
            MissingRefBehaviour::Ignore => {
                self.warn(format!("{kind} '{name}' not found, reference dropped"));
                Ok(false)
            }
            MissingRefBehaviour::Create => {
                self.warn(format!("{kind} '{name}' not found, created"));
                Ok(true)
            }
        }
    }

    /// Resolve each name in `wanted` (deduplicated, order kept) against the
    /// `found` pairs, applying the configured policy to the rest.
    fn resolve_all(
        &mut self,
        kind: EntityKind,
        wanted: &[String],
        found: Vec<(String, i64)>,
        mut create: impl FnMut(&str) -> Result<i64, ImportError>,
    ) -> Result<Vec<i64>, ImportError> {
        let found: HashMap<String, i64> = found.into_iter().collect();
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for name in wanted {
            if !seen.insert(name.as_str()) {
                continue;
            }
            if let Some(&id) = found.get(name) {
                ids.push(id);
            } else if self.unresolved(self.ctx.missing_refs, kind, name)? {
                ids.push(create(name)?);
            }
        }
        Ok(ids)
    }

    pub fn studio(&mut self, txn: &TxnScope<'_>, name: &str) -> Result<Option<i64>, ImportError> {
        self.studio_with(txn, name, self.ctx.missing_refs)
    }

    /// Resolve a studio name under an explicit policy rather than the
    /// configured one.
    pub fn studio_with(
        &mut self,
        txn: &TxnScope<'_>,
        name: &str,
        policy: MissingRefBehaviour,
    ) -> Result<Option<i64>, ImportError> {
        if let Some(studio) = txn.studios().find_by_name(name, false)? {
            return Ok(Some(studio.id));
        }
        if !self.unresolved(policy, EntityKind::Studio, name)? {
            return Ok(None);
        }
        let mut studio = Studio::named(name);
        (studio.created_at, studio.updated_at) = (self.ctx.now(), self.ctx.now());
        Ok(Some(txn.studios().create(&studio)?.id))
    }

    pub fn movie(&mut self, txn: &TxnScope<'_>, name: &str) -> Result<Option<i64>, ImportError> {
        if let Some(movie) = txn.movies().find_by_name(name, false)? {
            return Ok(Some(movie.id));
        }
        if !self.unresolved(self.ctx.missing_refs, EntityKind::Movie, name)? {
            return Ok(None);
        }
        let mut movie = Movie::named(name);
        (movie.created_at, movie.updated_at) = (self.ctx.now(), self.ctx.now());
        Ok(Some(txn.movies().create(&movie)?.id))
    }

    /// Resolve a single tag name under an explicit policy.
    pub fn tag_with(
        &mut self,
        txn: &TxnScope<'_>,
        name: &str,
        policy: MissingRefBehaviour,
    ) -> Result<Option<i64>, ImportError> {
        if let Some(tag) = txn.tags().find_by_name(name, false)? {
            return Ok(Some(tag.id));
        }
        if !self.unresolved(policy, EntityKind::Tag, name)? {
            return Ok(None);
        }
        let mut tag = Tag::named(name);
        (tag.created_at, tag.updated_at) = (self.ctx.now(), self.ctx.now());
        Ok(Some(txn.tags().create(&tag)?.id))
    }

    pub fn tags(&mut self, txn: &TxnScope<'_>, names: &[String]) -> Result<Vec<i64>, ImportError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let found = txn
            .tags()
            .find_by_names(names, false)?
            .into_iter()
            .map(|t| (t.name, t.id))
            .collect();
        let now = self.ctx.now();
        self.resolve_all(EntityKind::Tag, names, found, |name| {
            let mut tag = Tag::named(name);
            (tag.created_at, tag.updated_at) = (now.clone(), now.clone());
            Ok(txn.tags().create(&tag)?.id)
        })
    }

    pub fn performers(
        &mut self,
        txn: &TxnScope<'_>,
        names: &[String],
    ) -> Result<Vec<i64>, ImportError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let found = txn
            .performers()
            .find_by_names(names, false)?
            .into_iter()
            .map(|p| (p.name, p.id))
            .collect();
        let now = self.ctx.now();
        self.resolve_all(EntityKind::Performer, names, found, |name| {
            let mut performer = Performer::named(name);
            (performer.created_at, performer.updated_at) = (now.clone(), now.clone());
            Ok(txn.performers().create(&performer)?.id)
        })
    }

    /// Galleries are referenced by checksum.
    pub fn galleries(
        &mut self,
        txn: &TxnScope<'_>,
        checksums: &[String],
    ) -> Result<Vec<i64>, ImportError> {
        if checksums.is_empty() {
            return Ok(Vec::new());
        }
        let found = txn
            .galleries()
            .find_by_checksums(checksums)?
            .into_iter()
            .map(|g| (g.checksum, g.id))
            .collect();
        let now = self.ctx.now();
        self.resolve_all(EntityKind::Gallery, checksums, found, |checksum| {
            let mut gallery = Gallery::with_checksum(checksum);
            (gallery.created_at, gallery.updated_at) = (now.clone(), now.clone());
            Ok(txn.galleries().create(&gallery)?.id)
        })
    }
}
