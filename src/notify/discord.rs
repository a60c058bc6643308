use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::warn;

use crate::app::error::Result;
use crate::notify::Notifier;

// Suppresses webhook embeds on the Discord side.
const SUPPRESS_EMBEDS: u32 = 4;

/// Posts notifications to a Discord webhook. Fire-and-forget: delivery
/// failures are logged and dropped.
pub struct DiscordNotifier {
    client: Client,
    webhook_url: String,
}

impl DiscordNotifier {
    pub fn new(webhook_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            webhook_url,
        })
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, text: &str) {
        let payload = serde_json::json!({ "content": text, "flags": SUPPRESS_EMBEDS });

        match self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) if !response.status().is_success() => {
                warn!(status = %response.status(), "Discord webhook rejected notification");
            }
            Ok(_) => {}
            Err(e) => warn!("Failed to deliver Discord notification: {e}"),
        }
    }
}
