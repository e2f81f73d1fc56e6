//! The `chat` adapter: posts alert notifications to a chat webhook.

use crate::core::{Destination, ParsedEvent, SinkAdapter};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument};

/// A client that can deliver one chat notification. Split out from the
/// adapter so tests can substitute a fake.
#[async_trait]
pub trait ChatClientTrait: Send + Sync {
    /// Sends `message` to the channel/chat identified by `chat_id`.
    async fn send(&self, chat_id: &str, message: &str) -> anyhow::Result<()>;
}

/// An HTTP client for a chat-notification webhook.
///
/// The request timeout is bounded and applied by the underlying client, so
/// a stalled webhook cannot stall a dispatch for longer than the configured
/// budget. The client never runs while any store lock is held.
pub struct ChatClient {
    webhook_url: String,
    client: reqwest::Client,
}

impl ChatClient {
    /// Builds the webhook client. The underlying builder can only fail at
    /// construction (e.g. TLS backend misconfiguration); that is a
    /// startup-time configuration error and surfacing it keeps the request
    /// timeout guarantee intact.
    pub fn new(webhook_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            webhook_url,
            client,
        })
    }
}

#[async_trait]
impl ChatClientTrait for ChatClient {
    #[instrument(skip(self, message))]
    async fn send(&self, chat_id: &str, message: &str) -> anyhow::Result<()> {
        let payload = json!({ "chat_id": chat_id, "message": message });
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(res) if res.status().is_success() => {
                info!("Successfully sent chat notification.");
                Ok(())
            }
            Ok(res) => {
                let status = res.status();
                let body = res.text().await.unwrap_or_default();
                error!(status = %status, body = %body, "Chat webhook rejected notification");
                anyhow::bail!(
                    "chat webhook rejected notification: status {}, body: {}",
                    status,
                    body
                )
            }
            Err(e) => {
                error!(error = %e, "HTTP request to chat webhook failed");
                Err(e.into())
            }
        }
    }
}

/// Adapter wiring the chat client into the dispatcher's fanout.
pub struct ChatSink {
    client: Arc<dyn ChatClientTrait>,
}

impl ChatSink {
    pub fn new(client: Arc<dyn ChatClientTrait>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SinkAdapter for ChatSink {
    fn kind(&self) -> Destination {
        Destination::Chat
    }

    async fn deliver(&self, event: &ParsedEvent) -> anyhow::Result<()> {
        // Validation guarantees the chat body whenever chat is requested.
        let chat = event
            .chat
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("chat body missing from validated event"))?;
        self.client.send(&chat.destination, &chat.message).await
    }
}
