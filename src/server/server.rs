//! # Clipboard Server
//!
//! Wires the text cache and the file store into an axum application and runs
//! it, together with the periodic cleanup of expired files.
//!
//! ## Routes
//!
//! ```text
//! POST   /api/clipboard/text          upload text
//! GET    /api/clipboard/text          list text items
//! GET    /api/clipboard/text/:id      fetch one text item
//! DELETE /api/clipboard/text/:id      delete one text item
//! DELETE /api/clipboard/text          clear all text items
//! POST   /api/files                   upload a file (multipart, field `file`)
//! GET    /api/files                   list files
//! GET    /api/files/:id               file metadata
//! GET    /api/files/:id/download      download (counts against the quota)
//! GET    /api/files/:id/thumbnail     image preview
//! DELETE /api/files/:id               delete a file
//! GET    /api/health, /health         liveness probe
//! ```

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use super::config::ServerConfig;
use super::file_store::FileStore;
use super::routes::{api_router, health_check, AppState};

/// The clipboard HTTP service.
pub struct ClipboardServer {
    state: AppState,
}

impl ClipboardServer {
    /// Open the file store described by `config` and build the shared state.
    ///
    /// # Example
    /// ```ignore
    /// let server = ClipboardServer::new(ServerConfig::default()).await?;
    /// server.run().await?;
    /// ```
    pub async fn new(config: ServerConfig) -> Result<Self> {
        let files = FileStore::open(&config.file.upload_dir, &config.file.metadata_file)
            .await
            .context("failed to initialize file store")?;
        Ok(Self {
            state: AppState::new(config, files),
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The complete application: API routes, CORS, and the optional web UI.
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .nest("/api", api_router(&self.state.config))
            .route("/health", get(health_check));

        if let Some(dir) = &self.state.config.server.static_dir {
            info!("🌐 Serving web UI from {}", dir.display());
            router = router.fallback_service(ServeDir::new(dir));
        }

        router
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Start the periodic sweep of files older than `max_age`.
    pub fn spawn_cleanup(&self) -> JoinHandle<()> {
        let files = Arc::clone(&self.state.files);
        let interval = self.state.config.file.cleanup_interval();
        let max_age = self.state.config.file.max_age();
        tokio::spawn(run_cleanup(files, interval, max_age))
    }

    /// Serve on an already bound listener until the process stops.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let app = self.router();
        axum::serve(listener, app).await?;
        Ok(())
    }

    /// Bind the configured address, start the cleanup task, and serve.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.server.address();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;

        let cleanup = self.spawn_cleanup();

        info!("🚀 Server is running on http://{}", addr);
        info!("📡 API endpoints under http://{}/api", addr);

        let result = self.serve(listener).await;
        cleanup.abort();
        result
    }
}

async fn run_cleanup(files: Arc<FileStore>, interval: Duration, max_age: Duration) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        info!("🧹 Running file cleanup task...");
        match files.cleanup_expired(max_age).await {
            Ok(count) => info!("✅ Cleanup completed. Deleted {} expired file(s).", count),
            Err(e) => error!("❌ Failed to cleanup expired files: {}", e),
        }
    }
}
