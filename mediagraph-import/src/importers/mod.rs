//! One [`Importer`](crate::importer::Importer) per entity type.
//!
//! Each importer converts its serialized record into a row when it is
//! constructed, resolves references in `pre_import`, and replaces relation
//! rows in `post_import`.

mod gallery;
mod image;
mod movie;
mod performer;
mod scene;
mod scraped;
mod studio;
mod tag;

pub use gallery::GalleryImporter;
pub use image::ImageImporter;
pub use movie::MovieImporter;
pub use performer::PerformerImporter;
pub use scene::{SceneImporter, SceneMarkerImporter};
pub use scraped::import_scraped_item;
pub(crate) use scraped::scraped_key;
pub use studio::{ParentResolution, StudioImporter};
pub use tag::TagImporter;
