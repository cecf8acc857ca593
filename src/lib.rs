//! # Cloud Clipboard
//!
//! A self-hosted clipboard shared over HTTP: short text snippets kept in a
//! bounded in-memory LRU cache, and uploaded files that expire after a fixed
//! number of downloads.
//!
//! - [`server`]: the axum service (`server` binary)
//! - [`client`]: typed registry clients over one `reqwest` transport (`client` binary)
//! - [`common`]: wire messages, config loading and logging shared by both

pub mod client;
pub mod common;
pub mod server;

pub use client::{ClientError, FileCategory, FileManager, TextClipboard, Transport};
pub use server::{ClipboardServer, ServerConfig};
