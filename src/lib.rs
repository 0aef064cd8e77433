//! bm-monitor - 监控 Brandmeister DMR last-heard 活动并推送通知

pub mod callbook;
pub mod config;
pub mod lastheard;
pub mod monitor;
pub mod notification;

pub use callbook::Callbook;
pub use config::Config;
pub use lastheard::{CallEvent, CallRecord, LastheardFeed};
pub use monitor::{Decision, DecisionEngine, NotificationEvent, Phase, Suppression, WatchConfig};
pub use notification::{
    ChannelDispatcher, DapnetChannel, DiscordChannel, MessageHandle, PushChannel, PushoverChannel,
    SessionChannel, SessionRegistry, TelegramChannel,
};
