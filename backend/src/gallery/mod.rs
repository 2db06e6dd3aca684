//! Image gallery: batch uploads, catalog listing and removal on top of an object store
//!
//! Every operation starts by passing the caller's [`Session`] through the injected
//! [`SessionGate`]. A successful check yields an [`Authorized`] handle, so no backend
//! call can happen before authorization.

mod catalog;
mod error;
mod record;
mod remove;
mod upload;

use std::sync::Arc;

use common_types::ImageRecord;
use tracing::debug;

pub use error::GalleryError;
pub use upload::{BatchResult, RawFile, UploadOutcome, MAX_CONCURRENT_UPLOADS};

use crate::{
    object_store::ObjectStore,
    public_url::PublicUrlResolver,
    session::{Session, SessionGate},
    types::StorageConfig,
};

/// Upload, list and delete operations sharing one store and one URL strategy
pub struct ImageGallery {
    store: Arc<dyn ObjectStore>,
    resolver: PublicUrlResolver,
    gate: Arc<dyn SessionGate>,
}

/// Proof that the session passed the gate; gallery operations hang off it
pub struct Authorized<'a> {
    gallery: &'a ImageGallery,
}

impl ImageGallery {
    #[must_use]
    pub fn new(
        store: Arc<dyn ObjectStore>,
        config: &StorageConfig,
        gate: Arc<dyn SessionGate>,
    ) -> Self {
        Self {
            store,
            resolver: PublicUrlResolver::new(config),
            gate,
        }
    }

    #[must_use]
    pub const fn resolver(&self) -> &PublicUrlResolver {
        &self.resolver
    }

    /// Runs the session gate
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::Unauthorized` if the marker is missing or invalid
    pub fn authorize(&self, session: &Session) -> Result<Authorized<'_>, GalleryError> {
        match session.marker() {
            Some(marker) if self.gate.is_valid(marker) => Ok(Authorized { gallery: self }),
            Some(_) => {
                debug!("Session marker rejected");
                Err(GalleryError::Unauthorized)
            }
            None => Err(GalleryError::Unauthorized),
        }
    }

    /// Stores a batch of files, see [`Authorized::upload`]
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::Unauthorized` before touching any file if the session is
    /// invalid, `GalleryError::NoFiles` for an empty batch and
    /// `GalleryError::AllUploadsFailed` when no file could be stored
    pub async fn upload(
        &self,
        session: &Session,
        files: Vec<RawFile>,
    ) -> Result<BatchResult, GalleryError> {
        self.authorize(session)?.upload(files).await
    }

    /// Lists every object of the bucket, see [`Authorized::list`]
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::Unauthorized` without calling the backend if the session
    /// is invalid and `GalleryError::CatalogUnavailable` if any page fails
    pub async fn list(&self, session: &Session) -> Result<Vec<ImageRecord>, GalleryError> {
        self.authorize(session)?.list().await
    }

    /// Deletes one object, see [`Authorized::remove`]
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::Unauthorized` if the session is invalid,
    /// `GalleryError::InvalidStorageKey` for unusable keys and
    /// `GalleryError::DeletionFailed` if the backend rejects the delete
    pub async fn remove(&self, session: &Session, storage_key: &str) -> Result<(), GalleryError> {
        self.authorize(session)?.remove(storage_key).await
    }
}
