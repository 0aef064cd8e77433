//! 具体的通知渠道实现

pub mod dapnet;
pub mod discord;
pub mod pushover;
pub mod telegram;

pub use dapnet::{DapnetChannel, DapnetConfig};
pub use discord::{DiscordChannel, DiscordConfig};
pub use pushover::{PushoverChannel, PushoverConfig};
pub use telegram::{TelegramChannel, TelegramConfig};
