//! # Image Upload Client
//!
//! Two-phase upload against the CMS collaborator: request a presigned
//! slot, transfer the bytes, confirm receipt. Validation runs entirely
//! client-side before any network call, and a failure at any phase
//! aborts with no partial effects — the caller inserts the figure node
//! only after confirmation succeeds.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Allowed image MIME types
pub const ALLOWED_IMAGE_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
];

/// Maximum file size (5MB in bytes). The single authoritative limit,
/// enforced both in the pre-flight check and when building the confirm
/// body.
pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// A file picked for upload.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

pub fn is_valid_file_type(file: &ImageFile) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&file.mime_type.as_str())
}

pub fn is_valid_file_size(file: &ImageFile) -> bool {
    let size = file.size_bytes();
    size > 0 && size <= MAX_FILE_SIZE
}

/// Human-readable validation error, `None` when the file is acceptable.
pub fn validation_error(file: &ImageFile) -> Option<String> {
    if !is_valid_file_type(file) {
        return Some(format!(
            "File type {} is not allowed. Please upload: JPEG, PNG, GIF, WebP, or SVG.",
            file.mime_type
        ));
    }
    if !is_valid_file_size(file) {
        let size_mb = file.size_bytes() as f64 / (1024.0 * 1024.0);
        return Some(format!(
            "File size ({size_mb:.2}MB) exceeds maximum of 5MB."
        ));
    }
    None
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest<'a> {
    pub filename: &'a str,
    pub mime_type: &'a str,
    pub size_bytes: u64,
    pub post_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignResponse {
    pub presigned_url: String,
    pub object_key: String,
    pub public_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest<'a> {
    pub object_key: &'a str,
    pub filename: &'a str,
    pub original_name: &'a str,
    pub mime_type: &'a str,
    pub size_bytes: u64,
    pub url: &'a str,
    pub post_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("{0}")]
    Validation(String),

    #[error("Post ID is required for image upload")]
    MissingPostId,

    #[error("{0}")]
    Presign(String),

    #[error("Upload failed")]
    Transfer,

    #[error("Failed to confirm upload")]
    Confirm,

    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),
}

/// The uploaded image as the editor should insert it: the public URL as
/// `src`, the original filename as `alt`.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedImage {
    pub url: String,
    pub alt: String,
}

pub struct UploadClient {
    http: reqwest::Client,
    base_url: Url,
}

impl UploadClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Run the full two-phase flow. Validates before any network call.
    pub async fn upload_image(
        &self,
        file: &ImageFile,
        post_id: Option<&str>,
    ) -> Result<UploadedImage, UploadError> {
        if let Some(message) = validation_error(file) {
            return Err(UploadError::Validation(message));
        }
        let Some(post_id) = post_id else {
            return Err(UploadError::MissingPostId);
        };

        let presigned = self.presign(file, post_id).await?;
        self.transfer(file, &presigned.presigned_url).await?;
        self.confirm(file, post_id, &presigned).await?;

        Ok(UploadedImage {
            url: presigned.public_url,
            alt: file.filename.clone(),
        })
    }

    async fn presign(
        &self,
        file: &ImageFile,
        post_id: &str,
    ) -> Result<PresignResponse, UploadError> {
        let url = self
            .base_url
            .join("/api/upload/presign")
            .map_err(|_| UploadError::Presign("Failed to get upload URL".to_string()))?;

        let response = self
            .http
            .post(url)
            .json(&PresignRequest {
                filename: &file.filename,
                mime_type: &file.mime_type,
                size_bytes: file.size_bytes(),
                post_id: Some(post_id),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| "Failed to get upload URL".to_string());
            tracing::error!(%message, "presign rejected");
            return Err(UploadError::Presign(message));
        }

        Ok(response.json().await?)
    }

    async fn transfer(&self, file: &ImageFile, presigned_url: &str) -> Result<(), UploadError> {
        let response = self
            .http
            .put(presigned_url)
            .header("Content-Type", &file.mime_type)
            .body(file.bytes.clone())
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::error!(status = %response.status(), "byte transfer rejected");
            return Err(UploadError::Transfer);
        }
        Ok(())
    }

    async fn confirm(
        &self,
        file: &ImageFile,
        post_id: &str,
        presigned: &PresignResponse,
    ) -> Result<(), UploadError> {
        let url = self
            .base_url
            .join("/api/upload/confirm")
            .map_err(|_| UploadError::Confirm)?;

        let stored_name = presigned
            .object_key
            .rsplit('/')
            .next()
            .unwrap_or(&file.filename);

        let response = self
            .http
            .post(url)
            .json(&ConfirmRequest {
                object_key: &presigned.object_key,
                filename: stored_name,
                original_name: &file.filename,
                mime_type: &file.mime_type,
                size_bytes: file.size_bytes(),
                url: &presigned.public_url,
                post_id: Some(post_id),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::error!(status = %response.status(), "confirm rejected");
            return Err(UploadError::Confirm);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(size: usize) -> ImageFile {
        ImageFile {
            filename: "photo.png".to_string(),
            mime_type: "image/png".to_string(),
            bytes: vec![0u8; size],
        }
    }

    #[test]
    fn test_type_validation() {
        let mut file = png(100);
        assert!(validation_error(&file).is_none());

        file.mime_type = "application/pdf".to_string();
        let message = validation_error(&file).unwrap();
        assert!(message.contains("application/pdf"));
        assert!(message.contains("is not allowed"));
    }

    #[test]
    fn test_size_validation() {
        assert!(validation_error(&png(MAX_FILE_SIZE as usize)).is_none());

        let message = validation_error(&png(6 * 1024 * 1024)).unwrap();
        assert!(message.contains("6.00MB"));
        assert!(message.contains("exceeds maximum of 5MB"));

        // Empty files are rejected too
        assert!(validation_error(&png(0)).is_some());
    }

    #[test]
    fn test_wire_body_shapes() {
        let body = serde_json::to_value(PresignRequest {
            filename: "a.png",
            mime_type: "image/png",
            size_bytes: 10,
            post_id: Some("post-1"),
        })
        .unwrap();
        assert_eq!(body["filename"], "a.png");
        assert_eq!(body["mimeType"], "image/png");
        assert_eq!(body["sizeBytes"], 10);
        assert_eq!(body["postId"], "post-1");

        let response: PresignResponse = serde_json::from_str(
            r#"{"presignedUrl":"https://s/u","objectKey":"posts/1/a.png","publicUrl":"https://cdn/a.png"}"#,
        )
        .unwrap();
        assert_eq!(response.object_key, "posts/1/a.png");
    }

    #[tokio::test]
    async fn test_validation_runs_before_any_network_phase() {
        // Unroutable base URL: if validation didn't come first this would
        // surface a network error instead
        let client = UploadClient::new(Url::parse("http://127.0.0.1:1/").unwrap());

        let oversized = png(6 * 1024 * 1024);
        let err = client.upload_image(&oversized, Some("post-1")).await.unwrap_err();
        assert!(matches!(err, UploadError::Validation(_)));

        let valid = png(100);
        let err = client.upload_image(&valid, None).await.unwrap_err();
        assert!(matches!(err, UploadError::MissingPostId));
    }
}
