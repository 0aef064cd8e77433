//! 配置加载与校验
//!
//! JSON 配置文件，默认路径 `~/.config/bm-monitor/config.json`。
//! 渠道配置块存在即视为启用该渠道。

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use serde::Deserialize;

use crate::lastheard::feed::DEFAULT_FEED_URL;
use crate::monitor::decision::WatchConfig;
use crate::notification::channels::{DapnetConfig, DiscordConfig, PushoverConfig, TelegramConfig};

fn default_min_silence() -> u64 {
    300
}

fn default_min_visible() -> u64 {
    10
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

fn default_dmrid_file() -> PathBuf {
    PathBuf::from("dmrid.dat")
}

fn default_dmrid_refresh() -> u64 {
    86400
}

/// 监控配置
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// 被监控的呼号
    #[serde(default)]
    pub callsigns: HashSet<String>,
    /// 被监控的 talk-group
    #[serde(default)]
    pub talkgroups: HashSet<u32>,
    /// 噪音呼号（忽略）
    #[serde(default)]
    pub noisy_calls: HashSet<String>,
    /// 静默窗口（秒）
    #[serde(default = "default_min_silence")]
    pub min_silence_secs: u64,
    /// 定稿前的最小可见时长（秒）
    #[serde(default = "default_min_visible")]
    pub min_visible_secs: u64,
    /// last-heard 流地址
    #[serde(default = "default_feed_url")]
    pub feed_url: String,
    /// dmrid 反查文件路径
    #[serde(default = "default_dmrid_file")]
    pub dmrid_file: PathBuf,
    /// dmrid 刷新周期（秒）
    #[serde(default = "default_dmrid_refresh")]
    pub dmrid_refresh_secs: u64,
    /// Pushover 渠道（存在即启用）
    #[serde(default)]
    pub pushover: Option<PushoverConfig>,
    /// Telegram 渠道（存在即启用）
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
    /// DAPNET 渠道（存在即启用）
    #[serde(default)]
    pub dapnet: Option<DapnetConfig>,
    /// Discord 渠道（存在即启用）
    #[serde(default)]
    pub discord: Option<DiscordConfig>,
}

impl Config {
    /// 默认配置文件路径
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config/bm-monitor/config.json")
    }

    /// 从文件加载配置
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// 决策引擎用的监控名单
    pub fn watch_config(&self) -> WatchConfig {
        WatchConfig {
            callsigns: self.callsigns.clone(),
            talkgroups: self.talkgroups.clone(),
            noisy_calls: self.noisy_calls.clone(),
            min_silence_secs: self.min_silence_secs,
        }
    }

    /// 启用的渠道名称
    pub fn enabled_channels(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.pushover.is_some() {
            names.push("pushover");
        }
        if self.telegram.is_some() {
            names.push("telegram");
        }
        if self.dapnet.is_some() {
            names.push("dapnet");
        }
        if self.discord.is_some() {
            names.push("discord");
        }
        names
    }

    /// 校验配置
    ///
    /// 检查监控名单非空，以及每个启用渠道的凭据完整。
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.callsigns.is_empty() || !self.talkgroups.is_empty(),
            "no callsigns or talkgroups to monitor"
        );

        if let Some(config) = &self.pushover {
            crate::notification::PushoverChannel::new(config.clone())
                .context("pushover config invalid")?;
        }
        if let Some(config) = &self.telegram {
            crate::notification::TelegramChannel::new(config.clone())
                .context("telegram config invalid")?;
        }
        if let Some(config) = &self.dapnet {
            crate::notification::DapnetChannel::new(config.clone())
                .context("dapnet config invalid")?;
        }
        if let Some(config) = &self.discord {
            crate::notification::DiscordChannel::new(config.clone())
                .context("discord config invalid")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn load_config(json: &str) -> Config {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        Config::load(file.path()).unwrap()
    }

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config = load_config(r#"{"callsigns": ["W1AW"]}"#);

        assert!(config.callsigns.contains("W1AW"));
        assert_eq!(config.min_silence_secs, 300);
        assert_eq!(config.min_visible_secs, 10);
        assert_eq!(config.dmrid_file, PathBuf::from("dmrid.dat"));
        assert_eq!(config.dmrid_refresh_secs, 86400);
        assert!(config.enabled_channels().is_empty());
    }

    #[test]
    fn test_channel_block_enables_channel() {
        let config = load_config(
            r#"{
                "talkgroups": [91, 262],
                "telegram": {"bot_token": "123:abc", "chat_id": "42"},
                "discord": {"webhook_url": "https://discord.com/api/webhooks/1/abc"}
            }"#,
        );

        assert_eq!(config.enabled_channels(), vec!["telegram", "discord"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_watchlists() {
        let config = load_config(r#"{}"#);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_incomplete_channel_block() {
        // discord 块存在但 webhook_url 为空
        let config = load_config(r#"{"talkgroups": [91], "discord": {}}"#);
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("discord"));
    }

    #[test]
    fn test_watch_config_mirrors_watchlists() {
        let config = load_config(
            r#"{
                "callsigns": ["W1AW"],
                "talkgroups": [91],
                "noisy_calls": ["N0ISY"],
                "min_silence_secs": 600
            }"#,
        );
        let watch = config.watch_config();

        assert!(watch.callsigns.contains("W1AW"));
        assert!(watch.talkgroups.contains(&91));
        assert!(watch.noisy_calls.contains("N0ISY"));
        assert_eq!(watch.min_silence_secs, 600);
    }
}
