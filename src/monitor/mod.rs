//! 监控核心 - 活动追踪与通知决策

pub mod activity;
pub mod decision;

pub use activity::ActivityTracker;
pub use decision::{Decision, DecisionEngine, NotificationEvent, Phase, Suppression, WatchConfig};
