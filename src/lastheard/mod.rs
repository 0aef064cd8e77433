//! Last-heard 事件流 - 数据结构与传输层

pub mod feed;
pub mod record;

pub use feed::LastheardFeed;
pub use record::{CallEvent, CallRecord};
