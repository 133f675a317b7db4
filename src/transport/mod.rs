//! Bot API collaborators: where updates come from and where replies go.

pub mod telegram;
pub mod types;

use async_trait::async_trait;
use tracing::warn;

use crate::error::TransportError;

pub use telegram::TelegramClient;
pub use types::{largest_photo, Message, Outgoing, Payload, PhotoSize, Update};

/// Pull-based source of inbound updates
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Updates with `update_id >= offset`, at most `limit` of them, oldest first.
    async fn fetch(&self, offset: i64, limit: u32) -> Result<Vec<Update>, TransportError>;
}

/// Outbound delivery to a chat
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, chat_id: i64, content: &Outgoing) -> Result<(), TransportError>;

    /// Send a text notice, logging and swallowing delivery failures.
    async fn notify(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.send(chat_id, &Outgoing::text(text)).await {
            warn!("Failed to notify chat {}: {}", chat_id, e);
        }
    }
}
