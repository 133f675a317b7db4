use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::TelegramConfig;
use crate::error::TransportError;
use crate::transport::types::{ApiResponse, Outgoing, Update};
use crate::transport::{Messenger, UpdateSource};

/// Thin client for the Telegram Bot API
pub struct TelegramClient {
    client: Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{}", config.api_url, config.bot_key),
        })
    }

    /// Call a Bot API method with a JSON body and unwrap the response envelope
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, TransportError> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .json(body)
            .send()
            .await?;

        let bytes = response.bytes().await?;
        let envelope: ApiResponse<T> = serde_json::from_slice(&bytes)?;

        match envelope {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse {
                error_code,
                description,
                ..
            } => Err(TransportError::Api {
                code: error_code.unwrap_or(0),
                description: description.unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }
}

#[async_trait]
impl UpdateSource for TelegramClient {
    async fn fetch(&self, offset: i64, limit: u32) -> Result<Vec<Update>, TransportError> {
        debug!("Fetching updates with offset {}", offset);
        let body = serde_json::json!({ "offset": offset, "limit": limit, "timeout": 0 });
        self.call("getUpdates", &body).await
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send(&self, chat_id: i64, content: &Outgoing) -> Result<(), TransportError> {
        let _: serde_json::Value = self.call(content.method(), &content.body(chat_id)).await?;
        Ok(())
    }
}

impl std::fmt::Debug for TelegramClient {
    // base_url embeds the bot token
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient").finish_non_exhaustive()
    }
}

