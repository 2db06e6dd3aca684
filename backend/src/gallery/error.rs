//! Gallery error types

use common_types::FailedUpload;
use thiserror::Error;

use crate::object_store::BucketError;

/// Errors returned by gallery operations
#[derive(Error, Debug)]
pub enum GalleryError {
    /// The session marker is missing or invalid
    #[error("Session is missing or invalid")]
    Unauthorized,

    /// The upload batch is empty
    #[error("No files were provided")]
    NoFiles,

    /// Every file of a non-empty batch failed to store
    #[error("All {} uploads failed", .failed.len())]
    AllUploadsFailed {
        /// Per-file failures in request order
        failed: Vec<FailedUpload>,
    },

    /// Listing the bucket failed; no partial listing is returned
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(#[source] BucketError),

    /// The backend rejected a delete
    #[error("Deletion failed: {0}")]
    DeletionFailed(#[source] BucketError),

    /// The key cannot name an object
    #[error("Invalid storage key: {0:?}")]
    InvalidStorageKey(String),
}
