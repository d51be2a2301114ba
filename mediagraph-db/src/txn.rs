//! Transaction scope handing out repositories bound to one transaction.

use rusqlite::{Connection, Transaction};

use crate::repo::{
    GalleryRepository, ImageRepository, MovieRepository, PerformerRepository, SceneMarkerRepository,
    SceneRepository, ScrapedItemRepository, StudioRepository, TagRepository,
};
use crate::repository::OperationError;

/// An open transaction. Dropping it without [`commit`](Self::commit) rolls
/// back every write made through its repositories.
pub struct TxnScope<'c> {
    tx: Transaction<'c>,
}

impl<'c> TxnScope<'c> {
    pub fn begin(conn: &'c Connection) -> Result<Self, OperationError> {
        Ok(Self {
            tx: conn.unchecked_transaction()?,
        })
    }

    pub fn commit(self) -> Result<(), OperationError> {
        self.tx.commit()?;
        Ok(())
    }

    pub fn rollback(self) -> Result<(), OperationError> {
        self.tx.rollback()?;
        Ok(())
    }

    pub fn conn(&self) -> &Connection {
        &self.tx
    }

    pub fn tags(&self) -> TagRepository<'_> {
        TagRepository::new(&self.tx)
    }

    pub fn performers(&self) -> PerformerRepository<'_> {
        PerformerRepository::new(&self.tx)
    }

    pub fn studios(&self) -> StudioRepository<'_> {
        StudioRepository::new(&self.tx)
    }

    pub fn movies(&self) -> MovieRepository<'_> {
        MovieRepository::new(&self.tx)
    }

    pub fn galleries(&self) -> GalleryRepository<'_> {
        GalleryRepository::new(&self.tx)
    }

    pub fn scenes(&self) -> SceneRepository<'_> {
        SceneRepository::new(&self.tx)
    }

    pub fn scene_markers(&self) -> SceneMarkerRepository<'_> {
        SceneMarkerRepository::new(&self.tx)
    }

    pub fn images(&self) -> ImageRepository<'_> {
        ImageRepository::new(&self.tx)
    }

    pub fn scraped_items(&self) -> ScrapedItemRepository<'_> {
        ScrapedItemRepository::new(&self.tx)
    }
}
