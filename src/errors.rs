use axum::{
    extract::multipart::MultipartRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::{uploads::UploadError, users::repo::StoreError};

/// Every handler failure ends up here and is rendered as `{"error": "..."}`.
/// Messages are passed through from the underlying failure.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("No profile image uploaded")]
    MissingImage,

    #[error("Missing data field")]
    MissingData,

    #[error("{0}")]
    InvalidData(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0:#}")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Upload(UploadError::TooLarge) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Upload(UploadError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upload(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MissingImage
            | Self::MissingData
            | Self::InvalidData(_)
            | Self::Store(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(r: MultipartRejection) -> Self {
        Self::BadRequest(r.body_text())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            error!(error = %message, "request failed");
        } else {
            warn!(error = %message, %status, "request rejected");
        }

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(UploadError::TooLarge).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ApiError::from(UploadError::UnsupportedType(None)).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::MissingImage.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ApiError::from(StoreError::DuplicateUsername("x".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_body_serialization() {
        let json = serde_json::to_string(&ErrorBody {
            error: ApiError::MissingImage.to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"error":"No profile image uploaded"}"#);
    }
}
