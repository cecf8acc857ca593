//! HTTP error responses of the clipboard server.
//!
//! Every failure is rendered as `{ "code": <u32>?, "message": <string> }`
//! with a matching status code. Text clipboard errors carry no code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use thiserror::Error;

use super::file_store::StoreError;
use crate::common::messages::codes;
use crate::common::messages::ErrorBody;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid text data")]
    InvalidText,
    #[error("Text size exceeds maximum limit")]
    TextTooLarge,
    #[error("Text not found")]
    TextNotFound,
    #[error("File size exceeds maximum limit ({max_mb}MB)")]
    FileSizeExceeded { max_mb: u64 },
    #[error("Total storage capacity exceeded")]
    StorageExceeded,
    #[error("{0}")]
    InvalidUpload(String),
    #[error("Thumbnails are not supported for this file type")]
    UnsupportedThumbnail,
    #[error("File download limit reached")]
    DownloadLimitReached,
    #[error("File not found")]
    FileNotFound,
    #[error("File has been deleted")]
    FileDeleted,
    #[error("{message}")]
    Internal { code: Option<u32>, message: String },
}

impl ApiError {
    /// Log `err` and build a 500 reply that hides it from the caller.
    pub fn internal(code: u32, message: &str, err: impl std::fmt::Display) -> Self {
        error!("❌ {}: {}", message, err);
        ApiError::Internal {
            code: Some(code),
            message: message.to_string(),
        }
    }

    /// Map a store failure, using `code`/`message` for unexpected I/O errors.
    pub fn from_store(err: StoreError, code: u32, message: &str) -> Self {
        match err {
            StoreError::NotFound => ApiError::FileNotFound,
            StoreError::LimitReached { .. } => ApiError::DownloadLimitReached,
            StoreError::Missing => ApiError::FileDeleted,
            StoreError::StorageExceeded { .. } => ApiError::StorageExceeded,
            other => ApiError::internal(code, message, other),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidText
            | ApiError::TextTooLarge
            | ApiError::FileSizeExceeded { .. }
            | ApiError::StorageExceeded
            | ApiError::InvalidUpload(_)
            | ApiError::UnsupportedThumbnail => StatusCode::BAD_REQUEST,
            ApiError::DownloadLimitReached => StatusCode::FORBIDDEN,
            ApiError::TextNotFound | ApiError::FileNotFound | ApiError::FileDeleted => {
                StatusCode::NOT_FOUND
            }
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> Option<u32> {
        match self {
            ApiError::FileSizeExceeded { .. } => Some(codes::FILE_SIZE_EXCEEDED),
            ApiError::StorageExceeded => Some(codes::TOTAL_STORAGE_EXCEEDED),
            ApiError::InvalidUpload(_) | ApiError::UnsupportedThumbnail => {
                Some(codes::INVALID_FILE_FORMAT)
            }
            ApiError::DownloadLimitReached => Some(codes::DOWNLOAD_LIMIT_REACHED),
            ApiError::FileNotFound => Some(codes::FILE_NOT_FOUND),
            ApiError::FileDeleted => Some(codes::FILE_DELETED),
            ApiError::Internal { code, .. } => *code,
            ApiError::InvalidText | ApiError::TextTooLarge | ApiError::TextNotFound => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code(),
            message: Some(self.to_string()),
            error: None,
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_http() {
        let err = ApiError::from_store(StoreError::NotFound, codes::GET_FILE_META_FAILED, "x");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), Some(codes::FILE_NOT_FOUND));

        let err = ApiError::from_store(
            StoreError::LimitReached { current: 2, max: 2 },
            codes::UPDATE_DOWNLOAD_COUNT_FAILED,
            "x",
        );
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.code(), Some(codes::DOWNLOAD_LIMIT_REACHED));

        let err = ApiError::from_store(StoreError::Missing, codes::GET_FILE_META_FAILED, "x");
        assert_eq!(err.code(), Some(codes::FILE_DELETED));

        let full = StoreError::StorageExceeded { used: 60, size: 60, max: 100 };
        let err = ApiError::from_store(full, codes::ADD_METADATA_FAILED, "x");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), Some(codes::TOTAL_STORAGE_EXCEEDED));

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        let err = ApiError::from_store(io.into(), codes::DELETE_FILE_FAILED, "Failed to delete file");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), Some(codes::DELETE_FILE_FAILED));
        assert_eq!(err.to_string(), "Failed to delete file");
    }

    #[test]
    fn test_text_errors_have_no_code() {
        assert_eq!(ApiError::TextNotFound.code(), None);
        assert_eq!(ApiError::InvalidText.status(), StatusCode::BAD_REQUEST);
    }
}
