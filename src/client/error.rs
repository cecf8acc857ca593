//! Failure kinds surfaced by the registry clients.

use thiserror::Error;

/// Fallback when an error reply carries no readable message.
pub const GENERIC_SERVER_MESSAGE: &str = "Request failed";

#[derive(Debug, Error)]
pub enum ClientError {
    /// No response reached the client (connection refused, timeout, ...).
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The server answered with a 4xx/5xx status or an unreadable body.
    #[error("{message}")]
    Server {
        status: u16,
        code: Option<u32>,
        message: String,
    },

    /// Rejected locally before any request was made.
    #[error("{0}")]
    Validation(String),

    /// The file's download quota is used up.
    #[error("{0}")]
    Expired(String),

    /// Writing a downloaded file to disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
