//! Error types for bucket operations

use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::{
    delete_object::DeleteObjectError, list_objects_v2::ListObjectsV2Error,
    put_object::PutObjectError,
};
use thiserror::Error;

/// Result type for bucket operations
pub type BucketResult<T> = Result<T, BucketError>;

/// Errors that can occur during bucket operations
#[derive(Error, Debug)]
pub enum BucketError {
    /// S3 service error
    #[error("S3 service error: {0}")]
    S3Error(String),

    /// AWS SDK error (timeouts, dispatch and response failures)
    #[error("AWS SDK error: {0}")]
    AwsError(String),

    /// Upstream service error (5xx from S3)
    #[error("Upstream service error: {0}")]
    UpstreamError(String),
}

impl BucketError {
    fn from_sdk_error<E>(error: SdkError<E>) -> Self
    where
        E: std::error::Error + 'static,
    {
        let is_server_error = matches!(
            &error,
            SdkError::ServiceError(service_err) if service_err.raw().status().as_u16() >= 500
        );
        let is_service_error = matches!(&error, SdkError::ServiceError(_));
        let detail = DisplayErrorContext(error).to_string();

        if is_server_error {
            Self::UpstreamError(detail)
        } else if is_service_error {
            Self::S3Error(detail)
        } else {
            Self::AwsError(detail)
        }
    }
}

impl From<SdkError<PutObjectError>> for BucketError {
    fn from(error: SdkError<PutObjectError>) -> Self {
        Self::from_sdk_error(error)
    }
}

impl From<SdkError<ListObjectsV2Error>> for BucketError {
    fn from(error: SdkError<ListObjectsV2Error>) -> Self {
        Self::from_sdk_error(error)
    }
}

impl From<SdkError<DeleteObjectError>> for BucketError {
    fn from(error: SdkError<DeleteObjectError>) -> Self {
        Self::from_sdk_error(error)
    }
}
