pub mod config;
pub mod error;
pub mod file_store;
pub mod routes;
pub mod server;
pub mod text_cache;
pub mod throttle;
pub mod thumbnail;

pub use config::ServerConfig;
pub use error::ApiError;
pub use file_store::FileStore;
pub use server::ClipboardServer;
pub use text_cache::TextCache;
