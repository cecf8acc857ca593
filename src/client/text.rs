//! # Text Registry Client
//!
//! Keeps a local copy of the server's text snippets and exposes the
//! operations a clipboard UI needs: list, add, fetch, remove and clear.
//!
//! ## State Model
//!
//! The list held by [`TextClipboard`] is only ever replaced by a fresh
//! `GET /api/clipboard/text`. Mutations never patch it in place: after the
//! server accepts a change the whole list is fetched again. When a fetch fails
//! the local list is emptied so it never shows stale data.
//!
//! All operations take `&mut self`, so at most one request per client is in
//! flight. Dropping a returned future cancels its request.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cloud_clipboard::client::{TextClipboard, Transport};
//!
//! let transport = Arc::new(Transport::new("http://127.0.0.1:3000/api", timeout)?);
//! let mut texts = TextClipboard::new(transport);
//!
//! texts.add("hello").await?;
//! for item in texts.items() {
//!     println!("{} {}", item.key, item.value);
//! }
//! ```

use log::{info, warn};
use std::sync::Arc;

use super::error::{ClientError, ClientResult};
use super::transport::Transport;
use crate::common::messages::{
    MessageResponse, TextItem, TextListResponse, TextResponse, UploadTextRequest,
    UploadTextResponse,
};

const TEXT_PATH: [&str; 2] = ["clipboard", "text"];

/// Client-side view of the text clipboard.
pub struct TextClipboard {
    transport: Arc<Transport>,
    items: Vec<TextItem>,
}

impl TextClipboard {
    /// Creates a client with an empty local list.
    ///
    /// Nothing is fetched until [`list`](Self::list) or a mutation is called.
    pub fn new(transport: Arc<Transport>) -> Self {
        Self {
            transport,
            items: Vec::new(),
        }
    }

    /// The items from the last successful fetch, most recently used first.
    pub fn items(&self) -> &[TextItem] {
        &self.items
    }

    /// Fetches the full list from the server and replaces the local copy.
    ///
    /// # Errors
    ///
    /// `Network` or `Server`. The local list is left empty on failure.
    pub async fn list(&mut self) -> ClientResult<&[TextItem]> {
        match self
            .transport
            .get_json::<TextListResponse>(&TEXT_PATH)
            .await
        {
            Ok(list) => {
                self.items = list.items;
                Ok(&self.items)
            }
            Err(e) => {
                self.items.clear();
                Err(e)
            }
        }
    }

    /// Stores a new snippet and refreshes the list.
    ///
    /// # Arguments
    ///
    /// * `value` - The text to store. Must contain at least one
    ///   non-whitespace character.
    ///
    /// # Errors
    ///
    /// * `Validation` - `value` is empty or whitespace only. No request is sent.
    /// * `Server` - the server rejected the text (e.g. too large).
    /// * `Network` - the server could not be reached.
    pub async fn add(&mut self, value: &str) -> ClientResult<UploadTextResponse> {
        if value.trim().is_empty() {
            return Err(ClientError::Validation(
                "Please enter some text to upload".to_string(),
            ));
        }

        let request = UploadTextRequest {
            text: value.to_string(),
        };
        let response: UploadTextResponse =
            self.transport.post_json(&TEXT_PATH, &request).await?;
        info!("📋 Stored text {} ({} bytes)", response.id, response.size);

        self.refresh().await;
        Ok(response)
    }

    /// Fetches a single snippet by key.
    ///
    /// This also marks the item as recently used on the server, so the local
    /// list is refreshed to pick up the new order.
    pub async fn get(&mut self, key: &str) -> ClientResult<TextItem> {
        let response: TextResponse = self
            .transport
            .get_json(&[TEXT_PATH[0], TEXT_PATH[1], key])
            .await?;

        self.refresh().await;

        let size = response.text.len() as u64;
        Ok(TextItem {
            key: response.id,
            value: response.text,
            size,
        })
    }

    /// Deletes one snippet and refreshes the list.
    ///
    /// # Errors
    ///
    /// `Server` with status 404 if the key does not exist.
    pub async fn remove(&mut self, key: &str) -> ClientResult<()> {
        let _: MessageResponse = self
            .transport
            .delete_json(&[TEXT_PATH[0], TEXT_PATH[1], key])
            .await?;
        info!("🗑️ Removed text {}", key);

        self.refresh().await;
        Ok(())
    }

    /// Deletes every snippet and refreshes the list.
    pub async fn clear(&mut self) -> ClientResult<()> {
        let _: MessageResponse = self.transport.delete_json(&TEXT_PATH).await?;
        info!("🧹 Cleared text clipboard");

        self.refresh().await;
        Ok(())
    }

    /// Re-fetch after a successful mutation. The mutation already happened,
    /// so a failed refresh is logged rather than returned.
    async fn refresh(&mut self) {
        if let Err(e) = self.list().await {
            warn!("⚠️ Failed to refresh text list: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn offline_client() -> TextClipboard {
        // Nothing listens on port 9; validation must fail before any request.
        let transport = Transport::new("http://127.0.0.1:9/api", Duration::from_millis(200)).unwrap();
        TextClipboard::new(Arc::new(transport))
    }

    #[tokio::test]
    async fn test_add_rejects_blank_text_locally() {
        let mut texts = offline_client();

        for blank in ["", "   ", "\n\t "] {
            match texts.add(blank).await {
                Err(ClientError::Validation(_)) => {}
                other => panic!("expected validation error, got {:?}", other.map(|r| r.id)),
            }
        }
    }

    #[tokio::test]
    async fn test_failed_list_empties_local_state() {
        let mut texts = offline_client();
        texts.items.push(TextItem {
            key: "k".to_string(),
            value: "stale".to_string(),
            size: 5,
        });

        let result = texts.list().await;
        assert!(matches!(result, Err(ClientError::Network(_))));
        assert!(texts.items().is_empty());
    }
}
