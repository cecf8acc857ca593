//! # Message Protocol
//!
//! JSON bodies exchanged between the registry clients and the clipboard server.
//! Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

// ============================================================================
// TEXT CLIPBOARD
// ============================================================================

/// A stored text snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextItem {
    /// Opaque unique identifier assigned by the server
    pub key: String,
    /// The text content
    pub value: String,
    /// Byte length of `value`
    #[serde(default)]
    pub size: u64,
}

/// Body of `POST /api/clipboard/text`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadTextRequest {
    pub text: String,
}

/// Reply to a successful text upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadTextResponse {
    pub id: String,
    pub text: String,
    pub size: u64,
    pub message: String,
}

/// Reply to `GET /api/clipboard/text`, most recently used first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextListResponse {
    #[serde(default)]
    pub items: Vec<TextItem>,
    #[serde(default)]
    pub total_size: u64,
    #[serde(default)]
    pub total_items: usize,
}

/// Reply to `GET /api/clipboard/text/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextResponse {
    pub id: String,
    pub text: String,
}

// ============================================================================
// FILE CLIPBOARD
// ============================================================================

/// A stored binary upload with its download quota.
///
/// Invariant: `download_count <= max_downloads`. Once the two are equal the
/// file is exhausted and can no longer be downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileItem {
    pub id: String,
    pub filename: String,
    pub size: u64,
    pub mimetype: String,
    /// Milliseconds since the Unix epoch
    pub upload_time: i64,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub last_access_time: i64,
    #[serde(default)]
    pub download_count: u32,
    pub max_downloads: u32,
}

impl FileItem {
    /// True once the download quota is used up.
    pub fn is_exhausted(&self) -> bool {
        self.download_count >= self.max_downloads
    }

    pub fn remaining_downloads(&self) -> u32 {
        self.max_downloads.saturating_sub(self.download_count)
    }
}

/// Reply to `GET /api/files`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileListResponse {
    #[serde(default)]
    pub files: Vec<FileItem>,
}

/// Summary of a freshly uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub id: String,
    pub filename: String,
    pub size: u64,
    pub mimetype: String,
    pub upload_time: i64,
}

/// Reply to `POST /api/files`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadFileResponse {
    pub message: String,
    pub file: UploadedFile,
}

// ============================================================================
// GENERIC REPLIES
// ============================================================================

/// Numeric error codes carried in [`ErrorBody::code`].
pub mod codes {
    // 400 Bad Request
    pub const FILE_SIZE_EXCEEDED: u32 = 40001;
    pub const TOTAL_STORAGE_EXCEEDED: u32 = 40002;
    pub const INVALID_FILE_FORMAT: u32 = 40003;
    // 403 Forbidden
    pub const DOWNLOAD_LIMIT_REACHED: u32 = 40301;
    // 404 Not Found
    pub const FILE_NOT_FOUND: u32 = 40401;
    pub const FILE_DELETED: u32 = 40402;
    // 500 Internal Server Error
    pub const CREATE_FILE_FAILED: u32 = 50002;
    pub const SAVE_FILE_FAILED: u32 = 50003;
    pub const ADD_METADATA_FAILED: u32 = 50004;
    pub const GET_FILE_META_FAILED: u32 = 50007;
    pub const UPDATE_DOWNLOAD_COUNT_FAILED: u32 = 50008;
    pub const OPEN_FILE_FAILED: u32 = 50009;
    pub const DELETE_FILE_FAILED: u32 = 50010;
}

/// Plain acknowledgement, e.g. after a delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error payload. The server always fills `message`; `error` is accepted on
/// the client side for backends that use that key instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorBody {
    /// The human-readable message, if the body carried one.
    pub fn text(&self) -> Option<&str> {
        let present = |m: &&str| !m.trim().is_empty();
        self.message
            .as_deref()
            .filter(present)
            .or_else(|| self.error.as_deref().filter(present))
    }
}

/// Reply to the liveness probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_item_quota() {
        let mut item = FileItem {
            id: "a".to_string(),
            filename: "report.pdf".to_string(),
            size: 10,
            mimetype: "application/pdf".to_string(),
            upload_time: 0,
            last_access_time: 0,
            download_count: 0,
            max_downloads: 2,
        };
        assert!(!item.is_exhausted());
        assert_eq!(item.remaining_downloads(), 2);

        item.download_count = 1;
        assert!(!item.is_exhausted());

        item.download_count = 2;
        assert!(item.is_exhausted());
        assert_eq!(item.remaining_downloads(), 0);
    }

    #[test]
    fn test_file_item_wire_names() {
        let json = r#"{"id":"x","filename":"a.png","size":3,"mimetype":"image/png",
            "uploadTime":1,"lastAccessTime":2,"downloadCount":1,"maxDownloads":10}"#;
        let item: FileItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.download_count, 1);
        assert_eq!(item.max_downloads, 10);

        let back = serde_json::to_value(&item).unwrap();
        assert!(back.get("uploadTime").is_some());
        assert!(back.get("upload_time").is_none());
    }

    #[test]
    fn test_error_body_fallbacks() {
        let body: ErrorBody = serde_json::from_str(r#"{"code":40301,"message":"limit"}"#).unwrap();
        assert_eq!(body.text(), Some("limit"));

        let body: ErrorBody = serde_json::from_str(r#"{"error":"Text not found"}"#).unwrap();
        assert_eq!(body.text(), Some("Text not found"));

        let body: ErrorBody = serde_json::from_str(r#"{"message":"  "}"#).unwrap();
        assert_eq!(body.text(), None);
    }

    #[test]
    fn test_text_list_defaults_to_empty() {
        let list: TextListResponse = serde_json::from_str("{}").unwrap();
        assert!(list.items.is_empty());
    }
}
