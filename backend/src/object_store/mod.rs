//! Object store seam
//!
//! The gallery treats the backend as an opaque key-value blob store: write by key,
//! list one page at a time, delete by key. [`S3ObjectStore`] talks to any
//! S3-compatible service; the in-memory store backs the tests.

mod error;
mod s3;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

use bytes::Bytes;
use chrono::{DateTime, Utc};

pub use error::{BucketError, BucketResult};
pub use s3::S3ObjectStore;

/// Uploaded objects never change under their key, so caches may keep them for a year
pub const CACHE_CONTROL_IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// User metadata key holding the uploader's file name (base64url, S3 metadata is ASCII)
pub const ORIGINAL_NAME_METADATA: &str = "original-name";

/// User metadata key holding the RFC 3339 write time
pub const UPLOAD_TIME_METADATA: &str = "upload-time";

/// A single object write
#[derive(Debug, Clone)]
pub struct PutObject {
    pub key: String,
    pub body: Bytes,
    pub content_type: String,
    pub original_name: String,
    pub uploaded_at: DateTime<Utc>,
}

/// An object as returned by a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// One page of a bucket listing
#[derive(Debug, Clone, Default)]
pub struct ObjectPage {
    pub objects: Vec<StoredObject>,
    /// Token for the next page; `None` on the last page
    pub next_continuation_token: Option<String>,
}

/// Blob store operations used by the gallery
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes `object` with its content type, cache directive and metadata
    async fn put_object(&self, object: PutObject) -> BucketResult<()>;

    /// Lists one page of the bucket, continuing after `continuation_token`
    async fn list_objects_page(&self, continuation_token: Option<String>)
        -> BucketResult<ObjectPage>;

    /// Deletes `key`; deleting a missing key succeeds
    async fn delete_object(&self, key: &str) -> BucketResult<()>;
}
