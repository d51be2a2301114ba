use mediagraph_catalog::{EntityKind, Movie, MovieRecord, checksum_from_name};
use mediagraph_db::{Repository, TxnScope};

use crate::config::ImportContext;
use crate::error::ImportError;
use crate::importer::Importer;
use crate::references::References;

pub struct MovieImporter {
    movie: Movie,
    studio_name: Option<String>,
    refs: References,
}

impl MovieImporter {
    pub fn new(record: MovieRecord, ctx: &ImportContext) -> Self {
        let movie = Movie {
            id: 0,
            checksum: checksum_from_name(&record.name),
            name: record.name,
            aliases: record.aliases,
            duration: record.duration,
            date: record.date,
            rating: record.rating,
            studio_id: None,
            director: record.director,
            synopsis: record.synopsis,
            url: record.url,
            created_at: ctx.timestamp(record.created_at.as_deref()),
            updated_at: ctx.timestamp(record.updated_at.as_deref()),
        };
        Self {
            movie,
            studio_name: record.studio,
            refs: References::new(*ctx, EntityKind::Movie),
        }
    }
}

impl Importer for MovieImporter {
    const KIND: EntityKind = EntityKind::Movie;

    fn pre_import(&mut self, txn: &TxnScope<'_>) -> Result<(), ImportError> {
        if let Some(studio) = self.studio_name.as_deref() {
            self.movie.studio_id = self.refs.studio(txn, studio)?;
        }
        Ok(())
    }

    fn name(&self) -> String {
        self.movie.name.clone()
    }

    fn find_existing_id(&self, txn: &TxnScope<'_>) -> Result<Option<i64>, ImportError> {
        Ok(txn
            .movies()
            .find_by_checksum(&self.movie.checksum)?
            .map(|m| m.id))
    }

    fn create(&mut self, txn: &TxnScope<'_>) -> Result<i64, ImportError> {
        Ok(txn.movies().create(&self.movie)?.id)
    }

    fn update(&mut self, txn: &TxnScope<'_>, id: i64) -> Result<(), ImportError> {
        let movie = Movie {
            id,
            ..self.movie.clone()
        };
        txn.movies().update_full(&movie)?;
        Ok(())
    }

    fn post_import(&mut self, _txn: &TxnScope<'_>, _id: i64) -> Result<(), ImportError> {
        Ok(())
    }

    fn take_warnings(&mut self) -> Vec<String> {
        self.refs.take_warnings()
    }
}
