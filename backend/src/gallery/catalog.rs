//! Catalog listing across every page of the bucket

use chrono::Utc;
use common_types::ImageRecord;
use tracing::{debug, instrument, warn};

use super::{record, Authorized, GalleryError};
use crate::object_store::StoredObject;

impl Authorized<'_> {
    /// Lists every object in the bucket, following continuation tokens to the end
    ///
    /// Listed objects carry no uploader name, so `original_name` is the storage key.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::CatalogUnavailable` if any page fails; pages fetched
    /// before the failure are discarded
    #[instrument(skip_all)]
    pub async fn list(&self) -> Result<Vec<ImageRecord>, GalleryError> {
        let mut records = Vec::new();
        let mut continuation_token = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .gallery
                .store
                .list_objects_page(continuation_token)
                .await
                .map_err(|err| {
                    warn!(pages, "Failed to list bucket: {err}");
                    GalleryError::CatalogUnavailable(err)
                })?;
            pages += 1;

            records.extend(
                page.objects
                    .into_iter()
                    .map(|object| self.catalog_record(object)),
            );

            match page.next_continuation_token {
                Some(token) => continuation_token = Some(token),
                None => break,
            }
        }

        debug!(pages, objects = records.len(), "Listed bucket");
        Ok(records)
    }

    fn catalog_record(&self, object: StoredObject) -> ImageRecord {
        let url = self.gallery.resolver.resolve(&object.key);
        let content_type = mime_guess::from_path(&object.key)
            .first()
            .unwrap_or(mime::IMAGE_STAR)
            .to_string();

        record::image_record(
            object.key.clone(),
            object.key,
            url,
            object.size,
            content_type,
            object.last_modified.unwrap_or_else(Utc::now),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::tests::{gallery_with, valid_session};
    use super::*;
    use crate::object_store::memory::InMemoryObjectStore;

    #[tokio::test]
    async fn test_empty_bucket_lists_nothing() {
        let store = Arc::new(InMemoryObjectStore::new());
        let gallery = gallery_with(store.clone());

        let records = gallery.list(&valid_session()).await.unwrap();

        assert!(records.is_empty());
        assert_eq!(store.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_listing_follows_every_page() {
        let store = Arc::new(InMemoryObjectStore::new().with_page_size(2));
        for key in ["1-a.png", "2-b.jpg", "3-c.gif", "4-d.webp", "5-e"] {
            store.insert(key, vec![0u8; 3]);
        }
        let gallery = gallery_with(store.clone());

        let records = gallery.list(&valid_session()).await.unwrap();

        let keys: Vec<&str> = records.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(keys, ["1-a.png", "2-b.jpg", "3-c.gif", "4-d.webp", "5-e"]);
        assert_eq!(store.list_calls(), 3);
    }

    #[tokio::test]
    async fn test_catalog_record_fields() {
        let store = Arc::new(InMemoryObjectStore::new());
        store.insert("1700000000000-abc123.jpg", vec![0u8; 42]);
        store.insert("1700000000001-def456", vec![0u8; 1]);
        let gallery = gallery_with(store);

        let records = gallery.list(&valid_session()).await.unwrap();

        let jpg = &records[0];
        assert_eq!(jpg.original_name, "1700000000000-abc123.jpg");
        assert_eq!(jpg.file_name, "1700000000000-abc123.jpg");
        assert_eq!(jpg.size, 42);
        assert_eq!(jpg.content_type, "image/jpeg");
        assert_eq!(
            jpg.url,
            "https://s3.example.com/imgs/1700000000000-abc123.jpg"
        );
        assert_eq!(jpg.bbcode, format!("[img]{}[/img]", jpg.url));

        assert_eq!(records[1].content_type, "image/*");
    }

    #[tokio::test]
    async fn test_failed_page_returns_no_partial_listing() {
        let store = Arc::new(InMemoryObjectStore::new());
        store.insert("1-a.png", vec![0u8; 3]);
        store.set_list_failure(true);
        let gallery = gallery_with(store);

        assert!(matches!(
            gallery.list(&valid_session()).await,
            Err(GalleryError::CatalogUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_failure_on_a_later_page_discards_earlier_pages() {
        let store = Arc::new(
            InMemoryObjectStore::new()
                .with_page_size(2)
                .failing_list_after(1),
        );
        for key in ["1-a.png", "2-b.png", "3-c.png", "4-d.png", "5-e.png"] {
            store.insert(key, vec![0u8; 1]);
        }
        let gallery = gallery_with(store.clone());

        assert!(matches!(
            gallery.list(&valid_session()).await,
            Err(GalleryError::CatalogUnavailable(_))
        ));
        assert_eq!(store.list_calls(), 2);
    }
}
