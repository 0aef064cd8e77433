//! Pushover 推送渠道

use std::time::Duration;

use anyhow::{ensure, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::notification::channel::PushChannel;

const API_URL: &str = "https://api.pushover.net/1/messages.json";

/// Pushover 渠道配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PushoverConfig {
    /// 应用 token
    pub token: String,
    /// 用户 key
    pub user: String,
    /// 超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for PushoverConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            user: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Pushover 渠道
pub struct PushoverChannel {
    client: Client,
    config: PushoverConfig,
}

impl PushoverChannel {
    /// 创建 Pushover 渠道
    pub fn new(config: PushoverConfig) -> Result<Self> {
        ensure!(!config.token.is_empty(), "pushover token is required");
        ensure!(!config.user.is_empty(), "pushover user is required");

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl PushChannel for PushoverChannel {
    fn name(&self) -> &str {
        "pushover"
    }

    async fn send(&self, text: &str) -> Result<()> {
        self.client
            .post(API_URL)
            .form(&[
                ("token", self.config.token.as_str()),
                ("user", self.config.user.as_str()),
                ("message", text),
            ])
            .send()
            .await
            .context("pushover request failed")?
            .error_for_status()
            .context("pushover rejected the message")?;
        Ok(())
    }
}
