//! # REST Handlers
//!
//! Axum handlers for the text clipboard (`/clipboard/text`), the file
//! clipboard (`/files`) and the liveness probe. The router returned by
//! [`api_router`] is mounted under `/api` by the server.

use axum::{
    body::Body,
    extract::{
        multipart::{Field, Multipart},
        DefaultBodyLimit,
        rejection::JsonRejection,
        Path, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use log::{info, warn};
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::config::ServerConfig;
use super::error::ApiError;
use super::file_store::{remove_file_if_present, FileStore, NewFile};
use super::text_cache::TextCache;
use super::throttle::throttled_stream;
use super::thumbnail;
use crate::common::messages::*;

const MIB: u64 = 1024 * 1024;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub texts: Arc<Mutex<TextCache>>,
    pub files: Arc<FileStore>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig, files: FileStore) -> Self {
        let texts = TextCache::new(config.clipboard.max_memory, config.clipboard.max_items);
        Self {
            texts: Arc::new(Mutex::new(texts)),
            files: Arc::new(files),
            config: Arc::new(config),
        }
    }
}

/// JSON bodies of the text endpoints may be at most this many bytes per
/// byte of text (`\uXXXX` escapes), plus room for the envelope.
const JSON_ESCAPE_FACTOR: usize = 6;
const JSON_ENVELOPE: usize = 1024;

/// The text routes cap request bodies near `max_item_size`; the upload
/// route has no body limit because its size is enforced while streaming.
pub fn api_router(config: &ServerConfig) -> Router<AppState> {
    let text_body_limit = usize::try_from(config.clipboard.max_item_size)
        .unwrap_or(usize::MAX)
        .saturating_mul(JSON_ESCAPE_FACTOR)
        .saturating_add(JSON_ENVELOPE);

    Router::new()
        .route(
            "/clipboard/text",
            post(upload_text)
                .layer(DefaultBodyLimit::max(text_body_limit))
                .get(list_texts)
                .delete(clear_texts),
        )
        .route("/clipboard/text/:id", get(get_text).delete(delete_text))
        .route(
            "/files",
            post(upload_file)
                .layer(DefaultBodyLimit::disable())
                .get(list_files),
        )
        .route("/files/:id", get(file_info).delete(delete_file))
        .route("/files/:id/download", get(download_file))
        .route("/files/:id/thumbnail", get(file_thumbnail))
        .route("/health", get(health_check))
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

// ============================================================================
// TEXT CLIPBOARD
// ============================================================================

async fn upload_text(
    State(state): State<AppState>,
    body: Result<Json<UploadTextRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UploadTextResponse>), ApiError> {
    let Json(request) = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::TextTooLarge
        } else {
            ApiError::InvalidText
        }
    })?;
    if request.text.is_empty() {
        return Err(ApiError::InvalidText);
    }

    let size = request.text.len() as u64;
    if size > state.config.clipboard.max_item_size {
        return Err(ApiError::TextTooLarge);
    }

    let id = Uuid::new_v4().to_string();
    state
        .texts
        .lock()
        .await
        .put(&id, &request.text)
        .map_err(|e| ApiError::Internal {
            code: None,
            message: e.to_string(),
        })?;

    info!("📋 Stored text {} ({} bytes)", id, size);

    Ok((
        StatusCode::CREATED,
        Json(UploadTextResponse {
            id,
            text: request.text,
            size,
            message: "Text uploaded successfully".to_string(),
        }),
    ))
}

async fn list_texts(State(state): State<AppState>) -> Json<TextListResponse> {
    let texts = state.texts.lock().await;
    Json(TextListResponse {
        items: texts.items(),
        total_size: texts.total_size(),
        total_items: texts.len(),
    })
}

async fn get_text(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TextResponse>, ApiError> {
    let text = state
        .texts
        .lock()
        .await
        .get(&id)
        .ok_or(ApiError::TextNotFound)?;
    Ok(Json(TextResponse { id, text }))
}

async fn delete_text(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.texts.lock().await.delete(&id) {
        return Err(ApiError::TextNotFound);
    }
    Ok(Json(MessageResponse {
        message: "Text deleted successfully".to_string(),
    }))
}

async fn clear_texts(State(state): State<AppState>) -> Json<MessageResponse> {
    state.texts.lock().await.clear();
    info!("🧹 Cleared text clipboard");
    Json(MessageResponse {
        message: "All text items cleared successfully".to_string(),
    })
}

// ============================================================================
// FILE CLIPBOARD
// ============================================================================

/// Bytes of the `file` field already written to the upload directory.
struct StagedUpload {
    filename: String,
    mimetype: String,
    path: PathBuf,
    size: u64,
}

async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadFileResponse>), ApiError> {
    let mut staged: Option<StagedUpload> = None;
    let result = store_upload(&state, &mut multipart, &mut staged).await;

    if result.is_err() {
        if let Some(staged) = staged {
            if let Err(e) = remove_file_if_present(&staged.path).await {
                warn!("⚠️  Failed to remove rejected upload {}: {}", staged.path.display(), e);
            }
        }
    }
    result
}

async fn store_upload(
    state: &AppState,
    multipart: &mut Multipart,
    staged: &mut Option<StagedUpload>,
) -> Result<(StatusCode, Json<UploadFileResponse>), ApiError> {
    let config = &state.config.file;
    let mut requested_quota: Option<u32> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidUpload(format!("Failed to read multipart data: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") if staged.is_none() => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let mimetype = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let path = state.files.staging_path(&filename);
                *staged = Some(StagedUpload {
                    filename,
                    mimetype,
                    path: path.clone(),
                    size: 0,
                });

                let size = write_field(field, &path, config.max_file_size).await?;
                if let Some(upload) = staged.as_mut() {
                    upload.size = size;
                }
            }
            Some("maxDownloads") => {
                let raw = field.text().await.map_err(|e| {
                    ApiError::InvalidUpload(format!("Failed to read multipart data: {}", e))
                })?;
                let quota = raw
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| ApiError::InvalidUpload("Invalid maxDownloads value".to_string()))?;
                requested_quota = Some(quota);
            }
            _ => {}
        }
    }

    let upload = staged
        .as_ref()
        .ok_or_else(|| ApiError::InvalidUpload("No file provided".to_string()))?;

    let metadata = state
        .files
        .add(
            NewFile {
                original_name: upload.filename.clone(),
                size: upload.size,
                mimetype: upload.mimetype.clone(),
                path: upload.path.clone(),
                max_downloads: config.quota_for(requested_quota),
            },
            config.max_storage,
        )
        .await
        .map_err(|e| ApiError::from_store(e, codes::ADD_METADATA_FAILED, "Failed to add file metadata"))?;

    info!(
        "📤 Stored file {} '{}' ({} bytes, {} downloads)",
        metadata.id, metadata.filename, metadata.size, metadata.max_downloads
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadFileResponse {
            message: "File uploaded successfully".to_string(),
            file: UploadedFile {
                id: metadata.id,
                filename: metadata.filename,
                size: metadata.size,
                mimetype: metadata.mimetype,
                upload_time: metadata.upload_time,
            },
        }),
    ))
}

/// Stream one multipart field to `path`, stopping once it exceeds `max_size`.
async fn write_field(mut field: Field<'_>, path: &FsPath, max_size: u64) -> Result<u64, ApiError> {
    let mut out = tokio::fs::File::create(path)
        .await
        .map_err(|e| ApiError::internal(codes::CREATE_FILE_FAILED, "Failed to create file", e))?;

    let mut written = 0u64;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| ApiError::InvalidUpload(format!("Failed to read upload: {}", e)))?
    {
        written += chunk.len() as u64;
        if written > max_size {
            warn!(
                "⚠️  Upload exceeds maximum size: more than {} bytes (max {})",
                written, max_size
            );
            return Err(ApiError::FileSizeExceeded {
                max_mb: max_size / MIB,
            });
        }
        out.write_all(&chunk)
            .await
            .map_err(|e| ApiError::internal(codes::SAVE_FILE_FAILED, "Failed to save file content", e))?;
    }

    out.flush()
        .await
        .map_err(|e| ApiError::internal(codes::SAVE_FILE_FAILED, "Failed to save file content", e))?;
    Ok(written)
}

async fn list_files(State(state): State<AppState>) -> Json<FileListResponse> {
    let files = state.files.list().await;
    Json(FileListResponse {
        files: files.iter().map(|f| f.to_item()).collect(),
    })
}

async fn file_info(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FileItem>, ApiError> {
    let file = state
        .files
        .get(&id)
        .await
        .map_err(|e| ApiError::from_store(e, codes::GET_FILE_META_FAILED, "Failed to get file info"))?;
    Ok(Json(file.to_item()))
}

async fn download_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let file = state.files.claim_download(&id).await.map_err(|e| {
        ApiError::from_store(
            e,
            codes::UPDATE_DOWNLOAD_COUNT_FAILED,
            "Failed to update download count",
        )
    })?;

    let handle = tokio::fs::File::open(&file.file_path)
        .await
        .map_err(|e| ApiError::internal(codes::OPEN_FILE_FAILED, "Failed to open file", e))?;

    info!(
        "📥 Download of {} '{}' ({}/{})",
        file.id, file.filename, file.download_count, file.max_downloads
    );

    let body = Body::from_stream(throttled_stream(handle, state.config.file.speed_limit));
    let headers = [
        (header::CONTENT_TYPE, file.mimetype.clone()),
        (header::CONTENT_DISPOSITION, content_disposition(&file.filename)),
        (header::CONTENT_LENGTH, file.size.to_string()),
    ];
    Ok((headers, body))
}

async fn file_thumbnail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let file = state
        .files
        .get_present(&id)
        .await
        .map_err(|e| ApiError::from_store(e, codes::GET_FILE_META_FAILED, "Failed to get file info"))?;

    if !thumbnail::is_supported(&file.file_path) {
        return Err(ApiError::UnsupportedThumbnail);
    }

    let bytes = tokio::fs::read(&file.file_path)
        .await
        .map_err(|e| ApiError::internal(codes::OPEN_FILE_FAILED, "Failed to open file", e))?;

    let size = state.config.file.thumbnail_size;
    let (rendered, original) =
        tokio::task::spawn_blocking(move || (thumbnail::render(&bytes, size), bytes))
            .await
            .map_err(|e| ApiError::internal(codes::OPEN_FILE_FAILED, "Failed to render thumbnail", e))?;

    let (body, mimetype) = match rendered {
        Some(png) => (png, "image/png".to_string()),
        None => (original, file.mimetype),
    };
    Ok(([(header::CONTENT_TYPE, mimetype)], body))
}

async fn delete_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let removed = state
        .files
        .delete(&id)
        .await
        .map_err(|e| ApiError::from_store(e, codes::DELETE_FILE_FAILED, "Failed to delete file"))?;

    info!("🗑️  Deleted file {} '{}'", removed.id, removed.filename);
    Ok(Json(MessageResponse {
        message: "File deleted successfully".to_string(),
    }))
}

/// `attachment` disposition with an ASCII fallback name plus the exact
/// UTF-8 name in `filename*`.
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    let mut encoded = String::with_capacity(filename.len());
    for byte in filename.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    )
}
