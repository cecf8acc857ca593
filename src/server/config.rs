//! Server configuration.
//!
//! Every section has defaults, so an empty TOML file is a valid configuration.
//!
//! # Example TOML
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 3000
//!
//! [clipboard]
//! max_items = 512
//!
//! [file]
//! upload_dir = "./uploads"
//! max_downloads = 10
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerInfo,
    pub clipboard: ClipboardConfig,
    pub file: FileConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerInfo {
    pub host: String,
    pub port: u16,
    /// Directory with a built web UI, served at `/` when set
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3000,
            static_dir: None,
        }
    }
}

impl ServerInfo {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Limits of the in-memory text clipboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    /// Total bytes held by the LRU cache
    pub max_memory: u64,
    /// Number of entries held by the LRU cache
    pub max_items: usize,
    /// Largest single text accepted by the upload endpoint
    pub max_item_size: u64,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            max_memory: MIB,
            max_items: 512,
            max_item_size: KIB,
        }
    }
}

/// File clipboard storage and quota settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub upload_dir: PathBuf,
    pub metadata_file: PathBuf,
    pub max_file_size: u64,
    pub max_storage: u64,
    /// Default (and upper bound of the per-upload) download quota
    pub max_downloads: u32,
    /// Download throttle in bytes per second, 0 disables it
    pub speed_limit: u64,
    pub cleanup_interval_ms: u64,
    /// Files older than this are removed by the cleanup task
    pub max_age_ms: u64,
    /// Edge length of generated thumbnails, in pixels
    pub thumbnail_size: u32,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("./uploads"),
            metadata_file: PathBuf::from("./data/files.json"),
            max_file_size: 16 * MIB,
            max_storage: 512 * MIB,
            max_downloads: 10,
            speed_limit: MIB,
            cleanup_interval_ms: 24 * 60 * 60 * 1000,
            max_age_ms: 7 * 24 * 60 * 60 * 1000,
            thumbnail_size: 256,
        }
    }
}

impl FileConfig {
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms.max(1))
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_millis(self.max_age_ms)
    }

    /// Quota for a new upload: the requested value clamped to
    /// `1..=max_downloads`, or `max_downloads` when nothing was requested.
    pub fn quota_for(&self, requested: Option<u32>) -> u32 {
        let ceiling = self.max_downloads.max(1);
        requested.map_or(ceiling, |n| n.clamp(1, ceiling))
    }
}
