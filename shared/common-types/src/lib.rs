//! JSON contract shared between the image gateway and its clients.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A stored image as presented to clients, with ready-to-paste link encodings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// File name supplied by the uploader (the storage key for listed objects)
    pub original_name: String,
    /// Storage key of the object in the bucket
    pub file_name: String,
    /// Public URL of the object
    pub url: String,
    /// Markdown image embed
    pub markdown: String,
    /// BBCode image embed
    pub bbcode: String,
    /// HTML `<img>` tag
    pub html: String,
    /// Size in bytes
    pub size: u64,
    /// MIME type
    #[serde(rename = "type")]
    pub content_type: String,
    /// ISO-8601 UTC timestamp of the write
    pub upload_time: String,
}

/// A file of an upload batch that could not be stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FailedUpload {
    pub original_name: String,
    pub reason: String,
}

/// Response of a batch upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    /// Records of the files that were stored, in request order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<ImageRecord>>,
    /// Files of the batch that failed while others succeeded
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<FailedUpload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl UploadResponse {
    #[must_use]
    pub const fn completed(files: Vec<ImageRecord>, failed: Vec<FailedUpload>) -> Self {
        Self {
            success: true,
            files: Some(files),
            failed,
            message: None,
        }
    }

    /// Response for a batch where no file could be stored
    #[must_use]
    pub fn all_failed(failed: Vec<FailedUpload>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            files: None,
            failed,
            message: Some(message.into()),
        }
    }
}

/// Bare acknowledgement used by delete, login and logout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub const OK: Self = Self { success: true };
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct LoginRequest {
    /// Shared access password
    pub password: String,
}
