//! # Common Components
//!
//! Shared data structures used by both the client and server components.
//!
//! ## Modules
//!
//! - [`messages`]: JSON bodies exchanged over the REST API
//! - [`config`]: Configuration parsing utilities
//! - [`logging`]: Logger initialisation for the binaries

pub mod config;
pub mod logging;
pub mod messages;
