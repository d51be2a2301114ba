use mediagraph_catalog::ScrapedItem;
use rusqlite::types::Value;
use rusqlite::{Connection, Row};

use super::Repository;

impl crate::repository::Entity for ScrapedItem {
    const TABLE: &'static str = "scraped_items";
    const ENTITY_TYPE: &'static str = "scraped item";
    const COLUMNS: &'static [&'static str] = &[
        "title",
        "description",
        "url",
        "date",
        "rating",
        "tags",
        "models",
        "episode",
        "gallery_filename",
        "gallery_url",
        "video_filename",
        "video_url",
        "studio_id",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            url: row.get("url")?,
            date: row.get("date")?,
            rating: row.get("rating")?,
            tags: row.get("tags")?,
            models: row.get("models")?,
            episode: row.get("episode")?,
            gallery_filename: row.get("gallery_filename")?,
            gallery_url: row.get("gallery_url")?,
            video_filename: row.get("video_filename")?,
            video_url: row.get("video_url")?,
            studio_id: row.get("studio_id")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.title.clone().into(),
            self.description.clone().into(),
            self.url.clone().into(),
            self.date.clone().into(),
            self.rating.clone().into(),
            self.tags.clone().into(),
            self.models.clone().into(),
            self.episode.into(),
            self.gallery_filename.clone().into(),
            self.gallery_url.clone().into(),
            self.video_filename.clone().into(),
            self.video_url.clone().into(),
            self.studio_id.into(),
            self.created_at.clone().into(),
            self.updated_at.clone().into(),
        ]
    }
}

/// Scraped items are write-once: created during import and listed.
pub struct ScrapedItemRepository<'c> {
    conn: &'c Connection,
}

impl<'c> Repository<'c> for ScrapedItemRepository<'c> {
    type Entity = ScrapedItem;

    fn conn(&self) -> &'c Connection {
        self.conn
    }
}

impl<'c> ScrapedItemRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}
