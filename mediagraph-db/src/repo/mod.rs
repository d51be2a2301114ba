//! Per-entity repositories.
//!
//! Every repository borrows a connection (usually the transaction of a
//! [`TxnScope`](crate::TxnScope)) and layers entity-specific lookups,
//! relations and filtered queries over [`TableRepository`].

mod gallery;
mod image;
mod movie;
mod performer;
mod scene;
mod scene_marker;
mod scraped_item;
mod studio;
mod tag;

pub use gallery::GalleryRepository;
pub use image::ImageRepository;
pub use movie::MovieRepository;
pub use performer::PerformerRepository;
pub use scene::SceneRepository;
pub use scene_marker::SceneMarkerRepository;
pub use scraped_item::ScrapedItemRepository;
pub use studio::StudioRepository;
pub use tag::TagRepository;

use mediagraph_catalog::{FilterNode, FindFilter};
use rusqlite::Connection;

use crate::filter::{CriterionHandler, compile_filter};
use crate::query_builder::{QueryBuilder, SortSpec};
use crate::repository::{Entity, OperationError, TableRepository};

/// Row-level operations common to every entity type.
pub trait Repository<'c> {
    type Entity: Entity;

    fn conn(&self) -> &'c Connection;

    fn table(&self) -> TableRepository<'c, Self::Entity> {
        TableRepository::new(self.conn())
    }

    /// Insert a new row and return it with its assigned id.
    fn create(&self, entity: &Self::Entity) -> Result<Self::Entity, OperationError> {
        self.table().insert(entity)
    }

    /// Overwrite every column, including clearing nullable ones.
    fn update_full(&self, entity: &Self::Entity) -> Result<Self::Entity, OperationError> {
        self.table().update_full(entity)
    }

    fn destroy(&self, id: i64) -> Result<(), OperationError> {
        self.table().destroy(id)
    }

    /// `Ok(None)` when no row has this id.
    fn find(&self, id: i64) -> Result<Option<Self::Entity>, OperationError> {
        self.table().find(id)
    }

    /// Every requested row, in request order; any absent id is an error.
    fn find_many(&self, ids: &[i64]) -> Result<Vec<Self::Entity>, OperationError> {
        self.table().find_many(ids)
    }

    fn count(&self) -> Result<i64, OperationError> {
        self.table().count()
    }

    fn all(&self) -> Result<Vec<Self::Entity>, OperationError> {
        self.table().all()
    }
}

/// Filtered, sorted and paginated queries.
pub trait Queryable<'c>: Repository<'c> {
    type Criterion: CriterionHandler;

    /// Columns matched by the free-text `q` parameter.
    const SEARCH_COLUMNS: &'static [&'static str];
    const SORT: SortSpec;

    /// Build the query shared by [`query`](Self::query) and
    /// [`query_count`](Self::query_count).
    fn build_query(
        &self,
        filter: Option<&FilterNode<Self::Criterion>>,
        find: &FindFilter,
    ) -> Result<QueryBuilder<'c>, OperationError> {
        let table = <Self::Entity as Entity>::TABLE;
        let mut qb = QueryBuilder::new(self.conn(), table);
        if let Some(q) = find.q.as_deref() {
            qb.apply_search(Self::SEARCH_COLUMNS, q);
        }
        if let Some(filter) = filter {
            let f = compile_filter(table, filter)?;
            qb.apply_filter(&f);
        }
        Self::SORT.apply(&mut qb, find)?;
        qb.set_pagination(find);
        Ok(qb)
    }

    /// One page of matching entities and the total number of matches.
    fn query(
        &self,
        filter: Option<&FilterNode<Self::Criterion>>,
        find: &FindFilter,
    ) -> Result<(Vec<Self::Entity>, i64), OperationError> {
        let qb = self.build_query(filter, find)?;
        let (ids, count) = qb.execute_find()?;
        let entities = self.find_many(&ids)?;
        Ok((entities, count))
    }

    fn query_count(
        &self,
        filter: Option<&FilterNode<Self::Criterion>>,
        find: &FindFilter,
    ) -> Result<i64, OperationError> {
        self.build_query(filter, find)?.execute_count()
    }
}
