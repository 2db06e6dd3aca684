use std::sync::Arc;

use aide::OperationIo;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use common_types::{ImageRecord, SuccessResponse, UploadResponse};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{error, instrument};

use crate::{
    gallery::{GalleryError, ImageGallery, RawFile},
    session::Session,
    types::AppError,
};

/// Multipart parts with this name carry the files of a batch
const UPLOAD_FIELD: &str = "files";

const ALL_FAILED_MESSAGE: &str = "All file uploads failed";

/// Upload body sent with the status of the batch outcome
#[derive(Debug, OperationIo)]
#[aide(output_with = "axum::Json<UploadResponse>")]
pub struct UploadReply {
    status: StatusCode,
    body: UploadResponse,
}

impl IntoResponse for UploadReply {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImagePath {
    /// Storage key returned as `fileName` by upload or list
    pub file_name: String,
}

/// Uploads a batch of images
///
/// Every multipart part named `files` that carries a file name is stored under a
/// fresh key. Files that fail are reported in `failed`; when none succeeds the
/// same body comes back with `success: false` and status 500.
#[instrument(skip_all)]
pub async fn upload(
    Extension(gallery): Extension<Arc<ImageGallery>>,
    session: Session,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadReply, AppError> {
    // Unauthenticated requests get 401 whatever their body looks like
    let authorized = gallery.authorize(&session)?;
    let mut multipart = multipart?;

    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let Some(name) = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(ToString::to_string)
        else {
            continue;
        };
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;

        files.push(RawFile::new(name, content_type, bytes));
    }

    match authorized.upload(files).await {
        Ok(batch) => Ok(UploadReply {
            status: StatusCode::OK,
            body: UploadResponse::completed(batch.succeeded, batch.failed),
        }),
        Err(GalleryError::AllUploadsFailed { failed }) => {
            error!(failed = failed.len(), "Every file of the batch failed");
            Ok(UploadReply {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: UploadResponse::all_failed(failed, ALL_FAILED_MESSAGE),
            })
        }
        Err(err) => Err(err.into()),
    }
}

/// Lists every stored image
#[instrument(skip_all)]
pub async fn list(
    Extension(gallery): Extension<Arc<ImageGallery>>,
    session: Session,
) -> Result<Json<Vec<ImageRecord>>, AppError> {
    Ok(Json(gallery.list(&session).await?))
}

/// Deletes an image by its storage key
///
/// Deleting a key that does not exist succeeds.
#[instrument(skip_all)]
pub async fn remove(
    Extension(gallery): Extension<Arc<ImageGallery>>,
    session: Session,
    Path(ImagePath { file_name }): Path<ImagePath>,
) -> Result<Json<SuccessResponse>, AppError> {
    gallery.remove(&session, &file_name).await?;

    Ok(Json(SuccessResponse::OK))
}
