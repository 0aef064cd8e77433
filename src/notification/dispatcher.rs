//! 通知分发器 - 按渠道生命周期分发通知事件
//!
//! 每个 (渠道, 会话) 的状态机：`Absent → Open → Closed`。
//! - 发完即忘渠道：每个会话只发一次，且只发最终内容
//! - 有状态渠道：首次创建，进行中更新，结束定稿并移除注册表条目
//!
//! 很短的传输在定稿前要保证最小可见时长，定稿延迟放在独立任务里，
//! 不会阻塞其他会话的处理。渠道调用失败只记日志，不重试，
//! 互不影响。

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::channel::{MessageHandle, PushChannel, SessionChannel};
use super::registry::SessionRegistry;
use super::render::{render_embed, render_text, Embed};
use crate::monitor::decision::{NotificationEvent, Phase};

/// 通知分发器
pub struct ChannelDispatcher {
    /// 发完即忘的文本渠道
    push_channels: Vec<Arc<dyn PushChannel>>,
    /// 有会话状态的渠道
    session_channels: Vec<Arc<dyn SessionChannel>>,
    /// 会话 → 消息句柄注册表
    registry: Arc<SessionRegistry>,
    /// 定稿前的最小可见时长（秒）
    min_visible_secs: u64,
}

impl ChannelDispatcher {
    /// 创建分发器
    pub fn new(registry: Arc<SessionRegistry>, min_visible_secs: u64) -> Self {
        Self {
            push_channels: Vec::new(),
            session_channels: Vec::new(),
            registry,
            min_visible_secs,
        }
    }

    /// 注册发完即忘渠道
    pub fn add_push(&mut self, channel: Arc<dyn PushChannel>) {
        info!(channel = channel.name(), "registering push channel");
        self.push_channels.push(channel);
    }

    /// 注册有状态渠道
    pub fn add_session(&mut self, channel: Arc<dyn SessionChannel>) {
        info!(channel = channel.name(), "registering session channel");
        self.session_channels.push(channel);
    }

    /// 已注册的渠道总数
    pub fn channel_count(&self) -> usize {
        self.push_channels.len() + self.session_channels.len()
    }

    /// 共享的会话注册表
    pub fn registry(&self) -> Arc<SessionRegistry> {
        Arc::clone(&self.registry)
    }

    /// 分发一条通知事件
    pub async fn dispatch(&self, event: &NotificationEvent) {
        match event.phase {
            Phase::Started | Phase::InProgress => self.dispatch_open(event).await,
            Phase::Ended => self.dispatch_final(event).await,
        }
    }

    /// 会话仍在进行：只涉及有状态渠道
    async fn dispatch_open(&self, event: &NotificationEvent) {
        let session_id = event.record.session_id;
        let embed = render_embed(event);

        for channel in &self.session_channels {
            match self.registry.handle_for(channel.name(), session_id) {
                Some(handle) => {
                    // 更新失败保持 Open，等待后续事件或定稿
                    if let Err(e) = channel.update(&handle, &embed).await {
                        warn!(channel = channel.name(), error = %e, "update failed");
                    }
                }
                None => match channel.create(&embed).await {
                    Ok(handle) => {
                        self.registry.open(channel.name(), session_id, handle);
                    }
                    Err(e) => {
                        warn!(channel = channel.name(), error = %e, "create failed");
                    }
                },
            }
        }
    }

    /// 会话结束：文本渠道单发，有状态渠道定稿
    async fn dispatch_final(&self, event: &NotificationEvent) {
        let session_id = event.record.session_id;
        let text = render_text(event);
        let embed = render_embed(event);

        for channel in &self.push_channels {
            if let Err(e) = channel.send(&text).await {
                warn!(channel = channel.name(), error = %e, "send failed");
            }
        }

        for channel in &self.session_channels {
            match self.registry.handle_for(channel.name(), session_id) {
                Some(handle) => {
                    self.finalize_later(
                        Arc::clone(channel),
                        handle,
                        embed.clone(),
                        session_id,
                        event.record.duration_secs(),
                    );
                }
                None => {
                    // 单发型结束通知（会话已结束，不会再有后续事件），
                    // 直接发最终内容，不进注册表
                    if let Err(e) = channel.create(&embed).await {
                        warn!(channel = channel.name(), error = %e, "create failed");
                    }
                }
            }
        }
    }

    /// 在独立任务中定稿，必要时先等到最小可见时长
    ///
    /// 无论定稿成功与否都移除注册表条目：会话已经确定结束，
    /// 条目留着只会让注册表无限增长。
    fn finalize_later(
        &self,
        channel: Arc<dyn SessionChannel>,
        handle: MessageHandle,
        embed: Embed,
        session_id: u64,
        duration_secs: u64,
    ) {
        let wait_secs = if duration_secs > 0 && duration_secs < self.min_visible_secs {
            self.min_visible_secs - duration_secs
        } else {
            0
        };
        let registry = self.registry();

        tokio::spawn(async move {
            if wait_secs > 0 {
                debug!(
                    channel = channel.name(),
                    session_id,
                    wait_secs,
                    "delaying finalize for minimum visible duration"
                );
                tokio::time::sleep(std::time::Duration::from_secs(wait_secs)).await;
            }
            if let Err(e) = channel.finalize(&handle, &embed).await {
                warn!(channel = channel.name(), error = %e, "finalize failed");
            }
            registry.close(channel.name(), session_id);
        });
    }
}
