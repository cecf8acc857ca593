//! # Client Module
//!
//! Registry clients for the cloud clipboard.
//!
//! - [`Transport`]: the one HTTP client every request goes through
//! - [`TextClipboard`]: text snippets, most recently used first
//! - [`FileManager`]: uploaded files with download quotas
//! - [`FileCategory`]: icon classification for file listings
//!
//! ```rust,ignore
//! let transport = Arc::new(Transport::from_config(&config)?);
//! let mut texts = TextClipboard::new(transport.clone());
//! let mut files = FileManager::new(transport);
//! ```

pub mod category;
pub mod error;
pub mod files;
pub mod text;
pub mod transport;

pub use category::{format_file_size, FileCategory};
pub use error::{ClientError, ClientResult};
pub use files::FileManager;
pub use text::TextClipboard;
pub use transport::{ClientConfig, Progress, Transport};
