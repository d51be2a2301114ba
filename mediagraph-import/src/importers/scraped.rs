use mediagraph_catalog::{ScrapedItem, ScrapedItemRecord};
use mediagraph_db::{Repository, TxnScope};

use crate::error::ImportError;
use crate::references::References;

/// Store one scraped item. Scraped items carry no identity, so there is no
/// duplicate check; a studio that cannot be found is left unset rather than
/// created or treated as an error.
pub fn import_scraped_item(
    txn: &TxnScope<'_>,
    record: ScrapedItemRecord,
    refs: &mut References,
) -> Result<i64, ImportError> {
    let studio_id = match record.studio.as_deref() {
        Some(name) => match txn.studios().find_by_name(name, false)? {
            Some(studio) => Some(studio.id),
            None => {
                refs.warn(format!("studio '{}' not found, reference dropped", name));
                None
            }
        },
        None => None,
    };

    let updated_at = refs.ctx().timestamp(record.updated_at.as_deref());
    let item = ScrapedItem {
        id: 0,
        title: record.title,
        description: record.description,
        url: record.url,
        date: record.date,
        rating: record.rating,
        tags: record.tags,
        models: record.models,
        episode: record.episode,
        gallery_filename: record.gallery_filename,
        gallery_url: record.gallery_url,
        video_filename: record.video_filename,
        video_url: record.video_url,
        studio_id,
        created_at: refs.ctx().now(),
        updated_at,
    };
    Ok(txn.scraped_items().create(&item)?.id)
}

/// Report key for a scraped item: its title, else its URL, else its
/// position in the scraped list.
pub(crate) fn scraped_key(record: &ScrapedItemRecord, index: usize) -> String {
    record
        .title
        .clone()
        .or_else(|| record.url.clone())
        .unwrap_or_else(|| format!("#{}", index + 1))
}
