//! 通知抽象层 - 渲染、渠道与会话生命周期分发
//!
//! # 设计目标
//! 1. 统一接口：文本渠道实现 `PushChannel`，有状态渠道实现 `SessionChannel`
//! 2. 渠道解耦：每个渠道独立实现，单个渠道失败不影响其他渠道
//! 3. 生命周期：有状态渠道的消息创建一次、可更新、定稿一次
//! 4. 不阻塞：定稿延迟在独立任务中执行，事件处理循环不等待

pub mod channel;
pub mod channels;
pub mod dispatcher;
pub mod registry;
pub mod render;

pub use channel::{MessageHandle, PushChannel, SessionChannel};
pub use channels::{
    DapnetChannel, DapnetConfig, DiscordChannel, DiscordConfig, PushoverChannel, PushoverConfig,
    TelegramChannel, TelegramConfig,
};
pub use dispatcher::ChannelDispatcher;
pub use registry::SessionRegistry;
pub use render::{format_duration, format_utc, render_embed, render_text, Embed, EmbedField};
