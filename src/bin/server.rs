//! # Server Binary Entry Point
//!
//! Thin wrapper that loads the configuration and runs the clipboard server.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin server -- --config config/server.toml
//! cargo run --bin server -- --port 8080
//! ```
//!
//! The server will:
//! 1. Load configuration from the TOML file, or use defaults without one
//! 2. Open the upload directory and its metadata file
//! 3. Start the periodic cleanup of expired files
//! 4. Serve the HTTP API (and the web UI, if configured)

use clap::Parser;
use log::info;

use cloud_clipboard::common::config::load_or_default;
use cloud_clipboard::common::logging::init_logger;
use cloud_clipboard::server::{ClipboardServer, ServerConfig};

/// Command-line arguments for the server binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the server configuration file (TOML format)
    ///
    /// Example: config/server.toml
    #[arg(short, long)]
    config: Option<String>,

    /// Override `[server] host`
    #[arg(long)]
    host: Option<String>,

    /// Override `[server] port`
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let args = Args::parse();

    let mut config: ServerConfig = load_or_default(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    info!(
        "📁 Uploads in {} (max {} downloads per file)",
        config.file.upload_dir.display(),
        config.file.max_downloads
    );

    // Runs until the process is stopped
    ClipboardServer::new(config).await?.run().await
}
