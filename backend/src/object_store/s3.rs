//! S3-based object storage operations

use std::sync::Arc;

use aws_sdk_s3::{primitives::ByteStream, types::ObjectCannedAcl, Client as S3Client};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use tracing::debug;

use super::{
    BucketError, BucketResult, ObjectPage, ObjectStore, PutObject, StoredObject,
    CACHE_CONTROL_IMMUTABLE, ORIGINAL_NAME_METADATA, UPLOAD_TIME_METADATA,
};

/// Object store client for an S3-compatible bucket
pub struct S3ObjectStore {
    s3_client: Arc<S3Client>,
    bucket_name: String,
    public_read_acl: bool,
}

impl S3ObjectStore {
    /// Creates a new object store client
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - Bucket holding the uploaded images
    /// * `public_read_acl` - Whether writes carry the `public-read` canned ACL
    #[must_use]
    pub const fn new(s3_client: Arc<S3Client>, bucket_name: String, public_read_acl: bool) -> Self {
        Self {
            s3_client,
            bucket_name,
            public_read_acl,
        }
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3ObjectStore {
    /// Writes the object body with an immutable cache directive
    ///
    /// # Errors
    ///
    /// Returns `BucketError::S3Error` for S3 service errors
    /// Returns `BucketError::UpstreamError` for 5xx errors
    /// Returns `BucketError::AwsError` for timeouts and transport failures
    async fn put_object(&self, object: PutObject) -> BucketResult<()> {
        let mut request = self
            .s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&object.key)
            .body(ByteStream::from(object.body))
            .content_type(object.content_type)
            .cache_control(CACHE_CONTROL_IMMUTABLE)
            .metadata(
                ORIGINAL_NAME_METADATA,
                URL_SAFE_NO_PAD.encode(object.original_name.as_bytes()),
            )
            .metadata(UPLOAD_TIME_METADATA, object.uploaded_at.to_rfc3339());

        if self.public_read_acl {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }

        let output = request.send().await.map_err(BucketError::from)?;

        debug!(key = %object.key, etag = ?output.e_tag(), "Stored object");

        Ok(())
    }

    async fn list_objects_page(
        &self,
        continuation_token: Option<String>,
    ) -> BucketResult<ObjectPage> {
        let output = self
            .s3_client
            .list_objects_v2()
            .bucket(&self.bucket_name)
            .set_continuation_token(continuation_token)
            .send()
            .await
            .map_err(BucketError::from)?;

        let objects = output
            .contents()
            .iter()
            .filter_map(|object| {
                Some(StoredObject {
                    key: object.key()?.to_string(),
                    size: object
                        .size()
                        .and_then(|size| u64::try_from(size).ok())
                        .unwrap_or(0),
                    last_modified: object.last_modified().and_then(|time| {
                        DateTime::<Utc>::from_timestamp(time.secs(), time.subsec_nanos())
                    }),
                })
            })
            .collect::<Vec<_>>();

        let next_continuation_token = if output.is_truncated().unwrap_or(false) {
            output.next_continuation_token().map(ToString::to_string)
        } else {
            None
        };

        debug!(
            count = objects.len(),
            truncated = next_continuation_token.is_some(),
            "Listed object page"
        );

        Ok(ObjectPage {
            objects,
            next_continuation_token,
        })
    }

    async fn delete_object(&self, key: &str) -> BucketResult<()> {
        self.s3_client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
            .map_err(BucketError::from)?;

        debug!(key, "Deleted object");

        Ok(())
    }
}
