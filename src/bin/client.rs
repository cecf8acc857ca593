//! # Client Binary Entry Point
//!
//! Command-line front end for the clipboard registries.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin client -- text add "hello"
//! cargo run --bin client -- text list
//! cargo run --bin client -- file upload ./report.pdf --max-downloads 2
//! cargo run --bin client -- file download <id> --out ./downloads
//! cargo run --bin client -- --config config/client.toml health
//! ```
//!
//! Every failure is logged and printed as a one-line notification, and the
//! process exits with a non-zero status.

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{error, info};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cloud_clipboard::client::{
    format_file_size, ClientConfig, ClientError, FileCategory, FileManager, Progress,
    TextClipboard, Transport,
};
use cloud_clipboard::common::config::load_or_default;
use cloud_clipboard::common::logging::init_logger;

/// Command-line arguments for the client binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the client configuration file (TOML format)
    ///
    /// Example: config/client.toml
    #[arg(short, long)]
    config: Option<String>,

    /// Override `[client] base_url`, e.g. http://127.0.0.1:3000/api
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Text clipboard operations
    #[command(subcommand)]
    Text(TextCommand),
    /// File clipboard operations
    #[command(subcommand)]
    File(FileCommand),
    /// Check that the server is reachable
    Health,
}

#[derive(Subcommand, Debug)]
enum TextCommand {
    /// Store a text snippet
    Add { text: String },
    /// List snippets, most recently used first
    List,
    /// Print one snippet
    Get { key: String },
    /// Delete one snippet
    Rm { key: String },
    /// Delete every snippet
    Clear,
}

#[derive(Subcommand, Debug)]
enum FileCommand {
    /// Upload a local file
    Upload {
        path: PathBuf,
        /// Number of downloads before the file expires
        #[arg(long)]
        max_downloads: Option<u32>,
        /// Content type to record; guessed from the extension when omitted
        #[arg(long)]
        mimetype: Option<String>,
    },
    /// List uploaded files
    List,
    /// Show one file's metadata
    Info { id: String },
    /// Download a file into a directory
    Download {
        id: String,
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
    /// Save an image preview
    Thumbnail {
        id: String,
        #[arg(short, long, default_value = "thumbnail.png")]
        out: PathBuf,
    },
    /// Delete a file
    Rm { id: String },
}

#[tokio::main]
async fn main() {
    init_logger();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("❌ {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config: ClientConfig = load_or_default(args.config.as_deref())?;
    if let Some(base_url) = args.base_url {
        config.client.base_url = base_url;
    }

    let transport = Arc::new(Transport::from_config(&config)?);
    info!("🔗 Using server {}", transport.base_url());

    match args.command {
        Command::Text(cmd) => run_text(TextClipboard::new(transport), cmd).await?,
        Command::File(cmd) => run_file(FileManager::new(transport), cmd).await?,
        Command::Health => {
            let health = transport.health().await?;
            println!("{} ({})", health.status, health.timestamp);
        }
    }
    Ok(())
}

async fn run_text(mut texts: TextClipboard, cmd: TextCommand) -> Result<(), ClientError> {
    match cmd {
        TextCommand::Add { text } => {
            let created = texts.add(&text).await?;
            println!("{}", created.id);
        }
        TextCommand::List => {
            let items = texts.list().await?;
            if items.is_empty() {
                println!("(no text items)");
            }
            for item in items {
                println!("{}  {:>8}  {}", item.key, format_file_size(item.size), preview(&item.value));
            }
        }
        TextCommand::Get { key } => {
            let item = texts.get(&key).await?;
            println!("{}", item.value);
        }
        TextCommand::Rm { key } => {
            texts.remove(&key).await?;
            println!("Deleted {}", key);
        }
        TextCommand::Clear => {
            texts.clear().await?;
            println!("Cleared text clipboard");
        }
    }
    Ok(())
}

async fn run_file(mut files: FileManager, cmd: FileCommand) -> anyhow::Result<()> {
    match cmd {
        FileCommand::Upload {
            path,
            max_downloads,
            mimetype,
        } => {
            let data = tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let filename = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("upload.bin")
                .to_string();
            let mimetype = mimetype.unwrap_or_else(|| guess_mimetype(&path).to_string());

            let uploaded = files
                .upload(data, &filename, &mimetype, max_downloads, Some(terminal_progress()))
                .await?;
            eprintln!();
            println!("{}", uploaded.file.id);
        }
        FileCommand::List => {
            let list = files.list().await?;
            if list.is_empty() {
                println!("(no files)");
            }
            for file in list {
                println!(
                    "{}  [{:<5}] {}  {}  {}/{} downloads",
                    file.id,
                    FileCategory::classify(&file.filename, &file.mimetype),
                    file.filename,
                    format_file_size(file.size),
                    file.download_count,
                    file.max_downloads
                );
            }
        }
        FileCommand::Info { id } => {
            let file = files.info(&id).await?;
            println!("{}", serde_json::to_string_pretty(&file)?);
        }
        FileCommand::Download { id, out } => {
            // Populate the local list so an exhausted file is refused locally.
            files.list().await?;
            let path = files
                .download_to(&id, &out, Some(terminal_progress()))
                .await?;
            eprintln!();
            println!("Saved {}", path.display());
        }
        FileCommand::Thumbnail { id, out } => {
            let data = files.thumbnail(&id).await?;
            tokio::fs::write(&out, data)
                .await
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Saved {}", out.display());
        }
        FileCommand::Rm { id } => {
            files.delete(&id).await?;
            println!("Deleted {}", id);
        }
    }
    Ok(())
}

/// Redraws a percentage on stderr.
fn terminal_progress() -> Progress {
    Arc::new(|percent| {
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "\r  {:>3}%", percent);
        let _ = stderr.flush();
    })
}

fn preview(value: &str) -> String {
    const MAX_CHARS: usize = 60;
    let line = value.lines().next().unwrap_or_default();
    if line.chars().count() > MAX_CHARS || line.len() < value.trim_end().len() {
        let cut: String = line.chars().take(MAX_CHARS).collect();
        format!("{}…", cut)
    } else {
        line.to_string()
    }
}

fn guess_mimetype(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}
