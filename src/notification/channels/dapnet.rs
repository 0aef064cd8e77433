//! DAPNET 寻呼渠道
//!
//! 通过 hampager API 向配置的寻呼呼号发送 POCSAG 消息。

use std::time::Duration;

use anyhow::{ensure, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::notification::channel::PushChannel;

/// 默认 API 地址
pub const DEFAULT_API_URL: &str = "http://www.hampager.de/api/calls";

/// DAPNET 渠道配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DapnetConfig {
    /// API 地址
    pub url: String,
    /// API 用户名
    pub user: String,
    /// API 密码
    pub password: String,
    /// 接收寻呼的呼号
    pub callsigns: Vec<String>,
    /// 发射机组
    pub txgroup: String,
    /// 超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for DapnetConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_API_URL.to_string(),
            user: String::new(),
            password: String::new(),
            callsigns: Vec::new(),
            txgroup: String::new(),
            timeout_secs: 30,
        }
    }
}

/// 寻呼请求载荷
#[derive(Debug, Serialize)]
struct PagerCall<'a> {
    text: &'a str,
    #[serde(rename = "callSignNames")]
    callsign_names: &'a [String],
    #[serde(rename = "transmitterGroupNames")]
    transmitter_group_names: [&'a str; 1],
    emergency: bool,
}

/// DAPNET 渠道
pub struct DapnetChannel {
    client: Client,
    config: DapnetConfig,
}

impl DapnetChannel {
    /// 创建 DAPNET 渠道
    pub fn new(config: DapnetConfig) -> Result<Self> {
        ensure!(!config.user.is_empty(), "dapnet user is required");
        ensure!(!config.password.is_empty(), "dapnet password is required");
        ensure!(!config.callsigns.is_empty(), "dapnet callsigns are required");
        ensure!(!config.txgroup.is_empty(), "dapnet txgroup is required");

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl PushChannel for DapnetChannel {
    fn name(&self) -> &str {
        "dapnet"
    }

    async fn send(&self, text: &str) -> Result<()> {
        let payload = PagerCall {
            text,
            callsign_names: &self.config.callsigns,
            transmitter_group_names: [self.config.txgroup.as_str()],
            emergency: true,
        };

        self.client
            .post(&self.config.url)
            .basic_auth(&self.config.user, Some(&self.config.password))
            .json(&payload)
            .send()
            .await
            .context("dapnet request failed")?
            .error_for_status()
            .context("dapnet rejected the page")?;
        Ok(())
    }
}
