//! Shared harness: a real clipboard server on an ephemeral port.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use cloud_clipboard::client::{FileManager, TextClipboard, Transport};
use cloud_clipboard::server::{ClipboardServer, ServerConfig};
use tempfile::TempDir;
use tokio::net::TcpListener;

pub struct TestServer {
    pub transport: Arc<Transport>,
    pub upload_dir: PathBuf,
    _dir: TempDir,
}

impl TestServer {
    /// Start a server with default limits, no download throttle, and
    /// storage in a temporary directory.
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    pub async fn start_with(tweak: impl FnOnce(&mut ServerConfig)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let upload_dir = dir.path().join("uploads");

        let mut config = ServerConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.file.upload_dir = upload_dir.clone();
        config.file.metadata_file = dir.path().join("data").join("files.json");
        config.file.speed_limit = 0;
        tweak(&mut config);

        let server = ClipboardServer::new(config).await.unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(server.serve(listener));

        let base_url = format!("http://{}/api", addr);
        let transport = Transport::new(&base_url, Duration::from_secs(10)).unwrap();

        Self {
            transport: Arc::new(transport),
            upload_dir,
            _dir: dir,
        }
    }

    pub fn texts(&self) -> TextClipboard {
        TextClipboard::new(self.transport.clone())
    }

    pub fn files(&self) -> FileManager {
        FileManager::new(self.transport.clone())
    }

    /// Names of the files currently in the upload directory.
    pub fn stored_files(&self) -> Vec<String> {
        std::fs::read_dir(&self.upload_dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect()
    }
}
