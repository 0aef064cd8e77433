//! Discord webhook 渠道
//!
//! 有状态渠道：`?wait=true` 创建返回消息 ID，后续按 ID PATCH 编辑。
//! 定稿也是一次编辑，只是此后不再变更。

use std::time::Duration;

use anyhow::{ensure, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::notification::channel::{MessageHandle, SessionChannel};
use crate::notification::render::Embed;

/// Discord 渠道配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Webhook 地址
    pub webhook_url: String,
    /// 超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            timeout_secs: 30,
        }
    }
}

/// webhook 创建消息的响应
#[derive(Debug, Deserialize)]
struct CreatedMessage {
    id: String,
}

/// Discord webhook 渠道
pub struct DiscordChannel {
    client: Client,
    config: DiscordConfig,
}

impl DiscordChannel {
    /// 创建 Discord 渠道
    pub fn new(config: DiscordConfig) -> Result<Self> {
        ensure!(
            !config.webhook_url.is_empty(),
            "discord webhook_url is required"
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    fn edit_url(&self, handle: &MessageHandle) -> String {
        format!("{}/messages/{}", self.config.webhook_url, handle.as_str())
    }

    /// 编辑已创建的消息（update 和 finalize 共用）
    async fn edit(&self, handle: &MessageHandle, embed: &Embed) -> Result<()> {
        self.client
            .patch(self.edit_url(handle))
            .json(&json!({ "embeds": [embed] }))
            .send()
            .await
            .context("discord edit request failed")?
            .error_for_status()
            .context("discord rejected the edit")?;
        Ok(())
    }
}

#[async_trait]
impl SessionChannel for DiscordChannel {
    fn name(&self) -> &str {
        "discord"
    }

    async fn create(&self, embed: &Embed) -> Result<MessageHandle> {
        // ?wait=true 让 webhook 同步返回创建的消息
        let created: CreatedMessage = self
            .client
            .post(format!("{}?wait=true", self.config.webhook_url))
            .json(&json!({ "embeds": [embed] }))
            .send()
            .await
            .context("discord create request failed")?
            .error_for_status()
            .context("discord rejected the message")?
            .json()
            .await
            .context("failed to parse discord response")?;

        Ok(MessageHandle::new(created.id))
    }

    async fn update(&self, handle: &MessageHandle, embed: &Embed) -> Result<()> {
        self.edit(handle, embed).await
    }

    async fn finalize(&self, handle: &MessageHandle, embed: &Embed) -> Result<()> {
        self.edit(handle, embed).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_requires_webhook_url() {
        assert!(DiscordChannel::new(DiscordConfig::default()).is_err());
        assert!(DiscordChannel::new(DiscordConfig {
            webhook_url: "https://discord.com/api/webhooks/1/abc".to_string(),
            ..Default::default()
        })
        .is_ok());
    }

    #[test]
    fn test_edit_url() {
        let channel = DiscordChannel::new(DiscordConfig {
            webhook_url: "https://discord.com/api/webhooks/1/abc".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            channel.edit_url(&MessageHandle::new("99")),
            "https://discord.com/api/webhooks/1/abc/messages/99"
        );
    }

    #[test]
    fn test_created_message_parsing() {
        let created: CreatedMessage =
            serde_json::from_str(r#"{"id": "1234", "channel_id": "5678"}"#).unwrap();
        assert_eq!(created.id, "1234");
    }
}
