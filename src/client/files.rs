//! # File Registry Client
//!
//! Client-side view of the file clipboard: upload, list, inspect, download,
//! preview and delete files with a per-file download quota.
//!
//! Like the text client, the local list is replaced only by a fresh fetch and
//! every mutation (including a download, which bumps `downloadCount`) is
//! followed by a re-fetch.
//!
//! Downloads of a file whose last known state is exhausted are refused locally
//! with [`ClientError::Expired`]. A stale local list can still let a request
//! through; the server then answers 403 / 40301, which also surfaces as
//! `Expired`.

use bytes::Bytes;
use futures_util::stream::{self, Stream};
use log::{info, warn};
use reqwest::multipart::{Form, Part};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::{ClientError, ClientResult};
use super::transport::{percent, Progress, Transport};
use crate::common::messages::{
    FileItem, FileListResponse, MessageResponse, UploadFileResponse,
};

const FILES: &str = "files";
const UPLOAD_CHUNK: usize = 64 * 1024;

pub struct FileManager {
    transport: Arc<Transport>,
    files: Vec<FileItem>,
}

impl FileManager {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self {
            transport,
            files: Vec::new(),
        }
    }

    /// Files from the last successful fetch, in upload order.
    pub fn files(&self) -> &[FileItem] {
        &self.files
    }

    /// Look up a file in the local list.
    pub fn find(&self, id: &str) -> Option<&FileItem> {
        self.files.iter().find(|f| f.id == id)
    }

    /// Fetches the file list and replaces the local copy.
    ///
    /// # Errors
    ///
    /// `Network` or `Server`. The local list is left empty on failure.
    pub async fn list(&mut self) -> ClientResult<&[FileItem]> {
        match self.transport.get_json::<FileListResponse>(&[FILES]).await {
            Ok(list) => {
                self.files = list.files;
                Ok(&self.files)
            }
            Err(e) => {
                self.files.clear();
                Err(e)
            }
        }
    }

    /// Uploads `data` as a multipart `file` field and refreshes the list.
    ///
    /// # Arguments
    ///
    /// * `data` - File contents. No size limit is applied on this side.
    /// * `filename` - Name stored on the server and used for downloads.
    /// * `mimetype` - Content type recorded with the file.
    /// * `max_downloads` - Requested quota. The server clamps it to its own
    ///   limit and uses its default when `None`.
    /// * `progress` - Called with the percentage of the body handed to the
    ///   connection.
    ///
    /// # Errors
    ///
    /// `Server` with code 40001 (file too large) or 40002 (storage full), or
    /// `Network`.
    pub async fn upload(
        &mut self,
        data: Vec<u8>,
        filename: &str,
        mimetype: &str,
        max_downloads: Option<u32>,
        progress: Option<Progress>,
    ) -> ClientResult<UploadFileResponse> {
        let total = data.len() as u64;
        let body = reqwest::Body::wrap_stream(progress_stream(Bytes::from(data), progress));
        let part = Part::stream_with_length(body, total)
            .file_name(filename.to_string())
            .mime_str(mimetype)
            .map_err(|e| ClientError::Validation(format!("invalid MIME type '{}': {}", mimetype, e)))?;

        let mut form = Form::new().part("file", part);
        if let Some(max) = max_downloads {
            form = form.text("maxDownloads", max.to_string());
        }

        let response: UploadFileResponse = self.transport.post_multipart(&[FILES], form).await?;
        info!(
            "📤 Uploaded {} as {} ({} bytes)",
            response.file.filename, response.file.id, response.file.size
        );

        self.refresh().await;
        Ok(response)
    }

    /// Fetches the metadata of one file.
    pub async fn info(&self, id: &str) -> ClientResult<FileItem> {
        self.transport.get_json(&[FILES, id]).await
    }

    /// Downloads a file's bytes, consuming one unit of its quota.
    ///
    /// # Errors
    ///
    /// * `Expired` - the local list already shows the file as exhausted (no
    ///   request is made), or the server refused with 403.
    /// * `Server` - 404 if the file is unknown or its bytes are gone.
    pub async fn download(
        &mut self,
        id: &str,
        progress: Option<Progress>,
    ) -> ClientResult<Vec<u8>> {
        if let Some(file) = self.find(id) {
            if file.is_exhausted() {
                return Err(ClientError::Expired(format!(
                    "'{}' has reached its download limit ({}/{})",
                    file.filename, file.download_count, file.max_downloads
                )));
            }
        }

        let result = self
            .transport
            .get_bytes(&[FILES, id, "download"], progress)
            .await;

        // The count moved on success, and an expired or deleted reply means
        // the local view was stale. Either way fetch it again.
        self.refresh().await;

        let data = result?;
        info!("📥 Downloaded {} ({} bytes)", id, data.len());
        Ok(data)
    }

    /// Downloads a file and writes it into `dir` under its stored filename.
    ///
    /// Returns the path written.
    pub async fn download_to(
        &mut self,
        id: &str,
        dir: impl AsRef<Path>,
        progress: Option<Progress>,
    ) -> ClientResult<PathBuf> {
        let filename = match self.find(id) {
            Some(file) => file.filename.clone(),
            None => self.info(id).await?.filename,
        };

        let data = self.download(id, progress).await?;

        let path = dir.as_ref().join(safe_filename(&filename, id));
        tokio::fs::write(&path, &data).await?;
        info!("💾 Saved {}", path.display());
        Ok(path)
    }

    /// Fetches a preview image for a stored `.jpg`/`.jpeg`/`.png`.
    ///
    /// Callers should fall back to the file's category icon on any error.
    pub async fn thumbnail(&self, id: &str) -> ClientResult<Vec<u8>> {
        self.transport
            .get_bytes(&[FILES, id, "thumbnail"], None)
            .await
    }

    /// Deletes a file and refreshes the list.
    ///
    /// # Errors
    ///
    /// `Server` with status 404 if the file does not exist.
    pub async fn delete(&mut self, id: &str) -> ClientResult<()> {
        let _: MessageResponse = self.transport.delete_json(&[FILES, id]).await?;
        info!("🗑️ Deleted file {}", id);

        self.refresh().await;
        Ok(())
    }

    async fn refresh(&mut self) {
        if let Err(e) = self.list().await {
            warn!("⚠️ Failed to refresh file list: {}", e);
        }
    }
}

/// Split `data` into chunks, reporting progress as each chunk is pulled.
fn progress_stream(
    data: Bytes,
    progress: Option<Progress>,
) -> impl Stream<Item = std::io::Result<Bytes>> + Send + Sync + 'static {
    let total = data.len() as u64;
    let chunks: Vec<Bytes> = (0..data.len())
        .step_by(UPLOAD_CHUNK)
        .map(|start| data.slice(start..(start + UPLOAD_CHUNK).min(data.len())))
        .collect();

    let mut sent = 0u64;
    stream::iter(chunks.into_iter().map(move |chunk| {
        sent += chunk.len() as u64;
        if let Some(report) = &progress {
            report(percent(sent, total));
        }
        Ok(chunk)
    }))
}

/// Keep only the final path component of a server-provided name.
fn safe_filename(filename: &str, id: &str) -> String {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty() && *n != "..")
        .map(str::to_string)
        .unwrap_or_else(|| id.to_string())
}
