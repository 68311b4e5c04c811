use axum::{
    extract::multipart::{Field, MultipartError},
    http::StatusCode,
};
use bytes::{Bytes, BytesMut};
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::storage::StorageClient;

/// Largest accepted profile image, in bytes.
pub const MAX_FILE_BYTES: usize = 2 * 1024 * 1024;

pub const ALLOWED_CONTENT_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Only JPG/PNG allowed")]
    UnsupportedType(Option<String>),
    #[error("File too large")]
    TooLarge,
    #[error("Unexpected field")]
    UnexpectedField,
    #[error("{0}")]
    Multipart(String),
    #[error("{0:#}")]
    Storage(anyhow::Error),
}

impl From<MultipartError> for UploadError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            UploadError::TooLarge
        } else {
            UploadError::Multipart(e.body_text())
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub name: String,
    pub content_type: String,
    pub size: usize,
}

pub fn is_allowed_content_type(ct: Option<&str>) -> bool {
    ct.is_some_and(|ct| ALLOWED_CONTENT_TYPES.contains(&ct))
}

/// `<unix-millis>-<original>`, with the original reduced to a safe basename.
pub fn stored_name(original: Option<&str>, now: OffsetDateTime) -> String {
    lazy_static! {
        static ref UNSAFE_CHARS: Regex = Regex::new(r"[^A-Za-z0-9._-]").unwrap();
    }
    let millis = now.unix_timestamp_nanos() / 1_000_000;
    let base = original
        .and_then(|name| name.rsplit(['/', '\\']).next())
        .unwrap_or_default();
    let base = UNSAFE_CHARS.replace_all(base, "_");
    if base.is_empty() {
        format!("{}-upload", millis)
    } else {
        format!("{}-{}", millis, base)
    }
}

/// Drains a field into memory, failing as soon as it grows past `limit`.
pub async fn read_limited(field: &mut Field<'_>, limit: usize) -> Result<Bytes, UploadError> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = field.chunk().await? {
        if buf.len() + chunk.len() > limit {
            return Err(UploadError::TooLarge);
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}

/// Validates the type, enforces the size cap and writes the file.
/// Nothing reaches storage unless both checks pass.
pub async fn save_profile_image(
    storage: &dyn StorageClient,
    mut field: Field<'_>,
) -> Result<StoredFile, UploadError> {
    let content_type = field.content_type().map(str::to_owned);
    if !is_allowed_content_type(content_type.as_deref()) {
        warn!(content_type = ?content_type, "rejected upload type");
        return Err(UploadError::UnsupportedType(content_type));
    }
    let content_type = content_type.unwrap_or_default();

    let name = stored_name(field.file_name(), OffsetDateTime::now_utc());
    let body = match read_limited(&mut field, MAX_FILE_BYTES).await {
        Ok(b) => b,
        Err(e) => {
            warn!(error = %e, file = %name, "upload aborted");
            return Err(e);
        }
    };
    let size = body.len();

    storage
        .put_object(&name, body)
        .await
        .map_err(UploadError::Storage)?;

    info!(file = %name, %content_type, size, "profile image stored");
    Ok(StoredFile {
        name,
        content_type,
        size,
    })
}

#[cfg(test)]
mod upload_tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_allowed_content_types() {
        assert!(is_allowed_content_type(Some("image/jpeg")));
        assert!(is_allowed_content_type(Some("image/png")));
        assert!(!is_allowed_content_type(Some("image/gif")));
        assert!(!is_allowed_content_type(Some("image/jpg")));
        assert!(!is_allowed_content_type(Some("application/octet-stream")));
        assert!(!is_allowed_content_type(None));
    }

    #[test]
    fn test_stored_name_prefixes_millis() {
        let now = datetime!(2024-01-02 03:04:05.678 UTC);
        let name = stored_name(Some("avatar.png"), now);
        assert_eq!(name, format!("{}-avatar.png", now.unix_timestamp() * 1000 + 678));
    }

    #[test]
    fn test_stored_name_strips_paths_and_odd_chars() {
        let now = datetime!(2024-01-02 00:00:00 UTC);
        let prefix = now.unix_timestamp() * 1000;
        assert_eq!(
            stored_name(Some("../../etc/passwd"), now),
            format!("{}-passwd", prefix)
        );
        assert_eq!(
            stored_name(Some(r"C:\photos\my pic (1).jpg"), now),
            format!("{}-my_pic__1_.jpg", prefix)
        );
        assert_eq!(stored_name(None, now), format!("{}-upload", prefix));
        assert_eq!(stored_name(Some("dir/"), now), format!("{}-upload", prefix));
    }

    #[test]
    fn test_upload_error_messages() {
        assert_eq!(
            UploadError::UnsupportedType(Some("image/gif".into())).to_string(),
            "Only JPG/PNG allowed"
        );
        assert_eq!(UploadError::TooLarge.to_string(), "File too large");
    }
}
