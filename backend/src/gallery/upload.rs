//! Batch upload pipeline

use bytes::Bytes;
use chrono::Utc;
use common_types::{FailedUpload, ImageRecord};
use futures::{stream, StreamExt};
use tracing::{debug, info, instrument, warn};

use super::{record, Authorized, GalleryError, ImageGallery};
use crate::{object_store::PutObject, storage_key};

/// Writes dispatched to the backend at once for a single batch
pub const MAX_CONCURRENT_UPLOADS: usize = 4;

/// Reason reported to clients for a file that could not be stored
const WRITE_FAILED_REASON: &str = "Failed to store file";

/// A file as received from the client
#[derive(Debug, Clone)]
pub struct RawFile {
    /// Declared file name, untrusted
    pub name: String,
    /// Declared MIME type, stored as-is and never checked against the bytes
    pub content_type: String,
    pub bytes: Bytes,
}

impl RawFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

/// Result of storing one file of a batch
#[derive(Debug, Clone)]
pub enum UploadOutcome {
    Uploaded(ImageRecord),
    Failed(FailedUpload),
}

/// Aggregated outcome of a batch, both lists in request order
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub succeeded: Vec<ImageRecord>,
    pub failed: Vec<FailedUpload>,
}

impl FromIterator<UploadOutcome> for BatchResult {
    fn from_iter<I: IntoIterator<Item = UploadOutcome>>(outcomes: I) -> Self {
        let mut batch = Self::default();
        for outcome in outcomes {
            match outcome {
                UploadOutcome::Uploaded(record) => batch.succeeded.push(record),
                UploadOutcome::Failed(failure) => batch.failed.push(failure),
            }
        }
        batch
    }
}

impl Authorized<'_> {
    /// Stores every file of the batch under a freshly generated key
    ///
    /// Files are written independently, at most [`MAX_CONCURRENT_UPLOADS`] at a time,
    /// and a finished write frees its slot for the next file even while earlier files
    /// are still in flight. A failed write is recorded and the remaining files carry
    /// on; the batch is not atomic.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::NoFiles` for an empty batch and
    /// `GalleryError::AllUploadsFailed` when no file could be stored
    #[instrument(skip_all, fields(files = files.len()))]
    pub async fn upload(&self, files: Vec<RawFile>) -> Result<BatchResult, GalleryError> {
        if files.is_empty() {
            return Err(GalleryError::NoFiles);
        }

        let mut outcomes: Vec<(usize, UploadOutcome)> =
            stream::iter(files.into_iter().enumerate())
                .map(|(index, file)| async move { (index, self.gallery.upload_one(file).await) })
                .buffer_unordered(MAX_CONCURRENT_UPLOADS)
                .collect()
                .await;
        outcomes.sort_unstable_by_key(|(index, _)| *index);

        let batch: BatchResult = outcomes.into_iter().map(|(_, outcome)| outcome).collect();

        if batch.succeeded.is_empty() {
            return Err(GalleryError::AllUploadsFailed {
                failed: batch.failed,
            });
        }

        info!(
            succeeded = batch.succeeded.len(),
            failed = batch.failed.len(),
            "Upload batch completed"
        );

        Ok(batch)
    }
}

impl ImageGallery {
    async fn upload_one(&self, file: RawFile) -> UploadOutcome {
        let storage_key = storage_key::generate(&file.name);
        let size = file.bytes.len() as u64;
        let content_type = if file.content_type.trim().is_empty() {
            mime::APPLICATION_OCTET_STREAM.to_string()
        } else {
            file.content_type
        };
        let uploaded_at = Utc::now();

        let request = PutObject {
            key: storage_key.clone(),
            body: file.bytes,
            content_type: content_type.clone(),
            original_name: file.name.clone(),
            uploaded_at,
        };

        match self.store.put_object(request).await {
            Ok(()) => {
                let url = self.resolver.resolve(&storage_key);
                debug!(key = %storage_key, size, "Stored upload");
                UploadOutcome::Uploaded(record::image_record(
                    file.name,
                    storage_key,
                    url,
                    size,
                    content_type,
                    uploaded_at,
                ))
            }
            Err(err) => {
                warn!(
                    original_name = %file.name,
                    key = %storage_key,
                    "Failed to store upload: {err}"
                );
                UploadOutcome::Failed(FailedUpload {
                    original_name: file.name,
                    reason: WRITE_FAILED_REASON.to_string(),
                })
            }
        }
    }
}
