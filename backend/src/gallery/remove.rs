//! Single-object deletion by storage key

use tracing::{info, instrument, warn};

use super::{Authorized, GalleryError};
use crate::storage_key;

impl Authorized<'_> {
    /// Deletes the object stored under `storage_key`
    ///
    /// Removing a key that does not exist succeeds.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::InvalidStorageKey` without calling the backend if the key
    /// cannot name an object, and `GalleryError::DeletionFailed` if the backend
    /// rejects the delete
    #[instrument(skip(self))]
    pub async fn remove(&self, storage_key: &str) -> Result<(), GalleryError> {
        if !storage_key::is_valid(storage_key) {
            return Err(GalleryError::InvalidStorageKey(storage_key.to_string()));
        }

        self.gallery
            .store
            .delete_object(storage_key)
            .await
            .map_err(|err| {
                warn!("Failed to delete object: {err}");
                GalleryError::DeletionFailed(err)
            })?;

        info!("Deleted object");
        Ok(())
    }
}
