//! # File Store
//!
//! Disk-backed registry of uploaded files. The bytes live in the upload
//! directory; the metadata list is kept in memory and mirrored to a JSON file
//! after every mutation so the registry survives restarts.
//!
//! All metadata access goes through one async mutex. The download quota check
//! and the counter increment happen under the same lock acquisition, so two
//! concurrent downloads can never both take the last slot.

use chrono::Utc;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::common::messages::FileItem;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("file not found")]
    NotFound,
    #[error("maximum download limit reached ({current}/{max})")]
    LimitReached { current: u32, max: u32 },
    #[error("file content is missing on disk")]
    Missing,
    #[error("total storage exceeded ({used} + {size} > {max})")]
    StorageExceeded { used: u64, size: u64, max: u64 },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("metadata error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persisted metadata of one stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub id: String,
    pub filename: String,
    pub size: u64,
    pub mimetype: String,
    pub file_path: PathBuf,
    pub upload_time: i64,
    pub last_access_time: i64,
    pub download_count: u32,
    pub max_downloads: u32,
}

impl FileMetadata {
    pub fn is_exhausted(&self) -> bool {
        self.download_count >= self.max_downloads
    }

    pub fn to_item(&self) -> FileItem {
        FileItem {
            id: self.id.clone(),
            filename: self.filename.clone(),
            size: self.size,
            mimetype: self.mimetype.clone(),
            upload_time: self.upload_time,
            last_access_time: self.last_access_time,
            download_count: self.download_count,
            max_downloads: self.max_downloads,
        }
    }
}

/// Description of bytes already written to the upload directory.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub original_name: String,
    pub size: u64,
    pub mimetype: String,
    pub path: PathBuf,
    pub max_downloads: u32,
}

pub struct FileStore {
    upload_dir: PathBuf,
    metadata_path: PathBuf,
    files: Mutex<Vec<FileMetadata>>,
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

impl FileStore {
    /// Open (or create) the store.
    ///
    /// Creates the upload directory and the metadata file's directory, and
    /// writes an empty metadata list when the file does not exist yet.
    pub async fn open(
        upload_dir: impl Into<PathBuf>,
        metadata_path: impl Into<PathBuf>,
    ) -> Result<Self, StoreError> {
        let upload_dir = upload_dir.into();
        let metadata_path = metadata_path.into();

        fs::create_dir_all(&upload_dir).await?;
        if let Some(parent) = metadata_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let files = match fs::read(&metadata_path).await {
            Ok(data) => {
                let files: Option<Vec<FileMetadata>> = serde_json::from_slice(&data)?;
                files.unwrap_or_default()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                fs::write(&metadata_path, b"[]").await?;
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            "🗂️  File store ready: {} file(s) in {}",
            files.len(),
            upload_dir.display()
        );

        Ok(Self {
            upload_dir,
            metadata_path,
            files: Mutex::new(files),
        })
    }

    /// A fresh, collision-free path in the upload directory for `filename`.
    ///
    /// Only the final path component of the client-supplied name is kept.
    pub fn staging_path(&self, filename: &str) -> PathBuf {
        let base = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("upload");
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        self.upload_dir.join(format!("{}-{}", nanos, base))
    }

    /// Register bytes already written to the upload directory.
    ///
    /// The storage total is checked under the same lock that records the
    /// file, so concurrent uploads cannot overshoot `max_storage`.
    pub async fn add(&self, new_file: NewFile, max_storage: u64) -> Result<FileMetadata, StoreError> {
        let mut files = self.files.lock().await;
        let used: u64 = files.iter().map(|f| f.size).sum();
        if used.saturating_add(new_file.size) > max_storage {
            warn!(
                "⚠️  Total storage limit exceeded. Current: {}, Max: {}, New file: {}",
                used, max_storage, new_file.size
            );
            return Err(StoreError::StorageExceeded {
                used,
                size: new_file.size,
                max: max_storage,
            });
        }

        let now = now_millis();
        let metadata = FileMetadata {
            id: Uuid::new_v4().to_string(),
            filename: new_file.original_name,
            size: new_file.size,
            mimetype: new_file.mimetype,
            file_path: new_file.path,
            upload_time: now,
            last_access_time: now,
            download_count: 0,
            max_downloads: new_file.max_downloads,
        };
        files.push(metadata.clone());
        self.persist(&files).await?;
        Ok(metadata)
    }

    pub async fn get(&self, id: &str) -> Result<FileMetadata, StoreError> {
        let files = self.files.lock().await;
        files
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    /// All files in upload order.
    pub async fn list(&self) -> Vec<FileMetadata> {
        self.files.lock().await.clone()
    }

    pub async fn total_size(&self) -> u64 {
        self.files.lock().await.iter().map(|f| f.size).sum()
    }

    /// Reserve one download of `id`.
    ///
    /// Fails with `LimitReached` once the quota is used up and with `Missing`
    /// (after dropping the metadata) when the bytes have vanished from disk.
    /// On success the returned metadata already carries the new count.
    pub async fn claim_download(&self, id: &str) -> Result<FileMetadata, StoreError> {
        let mut files = self.files.lock().await;
        let index = files
            .iter()
            .position(|f| f.id == id)
            .ok_or(StoreError::NotFound)?;

        let file = &files[index];
        if file.is_exhausted() {
            warn!(
                "⛔ Download limit reached for {}: {}/{}",
                id, file.download_count, file.max_downloads
            );
            return Err(StoreError::LimitReached {
                current: file.download_count,
                max: file.max_downloads,
            });
        }

        if !fs::try_exists(&file.file_path).await.unwrap_or(false) {
            warn!("⚠️  File {} missing on disk, dropping metadata", id);
            files.remove(index);
            self.persist(&files).await?;
            return Err(StoreError::Missing);
        }

        let file = &mut files[index];
        file.download_count += 1;
        file.last_access_time = now_millis();
        let claimed = file.clone();
        self.persist(&files).await?;
        Ok(claimed)
    }

    /// Metadata of `id`, verifying the bytes are still on disk.
    pub async fn get_present(&self, id: &str) -> Result<FileMetadata, StoreError> {
        let mut files = self.files.lock().await;
        let index = files
            .iter()
            .position(|f| f.id == id)
            .ok_or(StoreError::NotFound)?;

        if !fs::try_exists(&files[index].file_path).await.unwrap_or(false) {
            warn!("⚠️  File {} missing on disk, dropping metadata", id);
            files.remove(index);
            self.persist(&files).await?;
            return Err(StoreError::Missing);
        }
        Ok(files[index].clone())
    }

    /// Remove the bytes and the metadata of `id`.
    pub async fn delete(&self, id: &str) -> Result<FileMetadata, StoreError> {
        let mut files = self.files.lock().await;
        let index = files
            .iter()
            .position(|f| f.id == id)
            .ok_or(StoreError::NotFound)?;

        remove_file_if_present(&files[index].file_path).await?;
        let removed = files.remove(index);
        self.persist(&files).await?;
        Ok(removed)
    }

    /// Delete every file uploaded more than `max_age` ago.
    ///
    /// Failing to remove the bytes of one file is logged and does not stop
    /// the sweep. Returns the number of files dropped.
    pub async fn cleanup_expired(&self, max_age: Duration) -> Result<usize, StoreError> {
        let mut files = self.files.lock().await;
        let now = now_millis();
        let max_age_ms = i64::try_from(max_age.as_millis()).unwrap_or(i64::MAX);

        let (expired, remaining): (Vec<_>, Vec<_>) = files
            .drain(..)
            .partition(|f| now.saturating_sub(f.upload_time) > max_age_ms);
        *files = remaining;

        for file in &expired {
            if let Err(e) = remove_file_if_present(&file.file_path).await {
                warn!("⚠️  Failed to delete expired file {}: {}", file.id, e);
            }
        }

        if !expired.is_empty() {
            self.persist(&files).await?;
        }
        Ok(expired.len())
    }

    async fn persist(&self, files: &[FileMetadata]) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(files)?;
        let tmp = self.metadata_path.with_extension("json.tmp");
        fs::write(&tmp, data).await?;
        fs::rename(&tmp, &self.metadata_path).await?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) async fn set_upload_time(&self, id: &str, upload_time: i64) {
        let mut files = self.files.lock().await;
        if let Some(f) = files.iter_mut().find(|f| f.id == id) {
            f.upload_time = upload_time;
        }
    }
}

pub(crate) async fn remove_file_if_present(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
