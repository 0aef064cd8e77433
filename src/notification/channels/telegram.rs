//! Telegram Bot API 推送渠道

use std::time::Duration;

use anyhow::{ensure, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::notification::channel::PushChannel;

/// Telegram 渠道配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token
    pub bot_token: String,
    /// 目标 chat ID
    pub chat_id: String,
    /// 超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Telegram 渠道
pub struct TelegramChannel {
    client: Client,
    config: TelegramConfig,
}

impl TelegramChannel {
    /// 创建 Telegram 渠道
    pub fn new(config: TelegramConfig) -> Result<Self> {
        ensure!(!config.bot_token.is_empty(), "telegram bot_token is required");
        ensure!(!config.chat_id.is_empty(), "telegram chat_id is required");

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    fn send_message_url(&self) -> String {
        format!(
            "https://api.telegram.org/bot{}/sendMessage",
            self.config.bot_token
        )
    }
}

#[async_trait]
impl PushChannel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, text: &str) -> Result<()> {
        // 活动通知不打扰：静默送达
        let payload = json!({
            "chat_id": self.config.chat_id,
            "text": text,
            "disable_notification": true,
        });

        self.client
            .post(self.send_message_url())
            .json(&payload)
            .send()
            .await
            .context("telegram request failed")?
            .error_for_status()
            .context("telegram rejected the message")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_requires_credentials() {
        assert!(TelegramChannel::new(TelegramConfig::default()).is_err());
        assert!(TelegramChannel::new(TelegramConfig {
            bot_token: "123:abc".to_string(),
            chat_id: "42".to_string(),
            ..Default::default()
        })
        .is_ok());
    }

    #[test]
    fn test_send_message_url() {
        let channel = TelegramChannel::new(TelegramConfig {
            bot_token: "123:abc".to_string(),
            chat_id: "42".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            channel.send_message_url(),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }
}
