//! 通知渠道 trait 定义
//!
//! 两类渠道：
//! - `PushChannel`：发完即忘的文本渠道（寻呼、聊天推送）
//! - `SessionChannel`：有会话状态的渠道，一条消息创建一次、
//!   可多次更新、最终定稿一次

use anyhow::Result;
use async_trait::async_trait;

use super::render::Embed;

/// 渠道返回的不透明消息句柄
///
/// 只是一个可用于后续 update/finalize 的标识，不持有任何外部连接。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHandle(String);

impl MessageHandle {
    /// 由渠道返回的原始标识构造
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// 原始标识
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 发完即忘的文本渠道
#[async_trait]
pub trait PushChannel: Send + Sync {
    /// 渠道名称（用于日志和会话注册表的键）
    fn name(&self) -> &str;

    /// 发送一条文本消息
    async fn send(&self, text: &str) -> Result<()>;
}

/// 有会话状态的渠道
#[async_trait]
pub trait SessionChannel: Send + Sync {
    /// 渠道名称（用于日志和会话注册表的键）
    fn name(&self) -> &str;

    /// 创建消息，返回后续操作用的句柄
    async fn create(&self, embed: &Embed) -> Result<MessageHandle>;

    /// 更新已创建的消息
    async fn update(&self, handle: &MessageHandle, embed: &Embed) -> Result<()>;

    /// 定稿：写入最终内容，此后不再变更
    async fn finalize(&self, handle: &MessageHandle, embed: &Embed) -> Result<()>;
}
