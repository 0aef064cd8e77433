//! Last-heard 事件数据结构
//!
//! 定义从 Brandmeister last-heard 流解码出的单次传输记录。
//! 记录一旦解码完成即不可变，由决策引擎消费一次。

use serde::{Deserialize, Deserializer, Serialize};

/// 事件类型
///
/// 协议中除 `Session-Start` / `Session-Stop` 之外的值（包括缺失）
/// 一律按进行中的 `SessionUpdate` 处理。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum CallEvent {
    /// 会话开始
    SessionStart,
    /// 会话进行中（默认值，未知事件也归入此类）
    #[default]
    SessionUpdate,
    /// 会话结束
    SessionStop,
}

impl From<&str> for CallEvent {
    fn from(value: &str) -> Self {
        match value {
            "Session-Start" => CallEvent::SessionStart,
            "Session-Stop" => CallEvent::SessionStop,
            _ => CallEvent::SessionUpdate,
        }
    }
}

impl<'de> Deserialize<'de> for CallEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(CallEvent::from(value.as_str()))
    }
}

/// 单次传输记录
///
/// 字段名与 last-heard 流的 JSON payload 保持一致。
/// `stop` 为 0 表示传输仍在进行。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    /// 会话 ID（每次传输唯一）
    #[serde(rename = "SessionID")]
    pub session_id: u64,
    /// 目标 talk-group ID
    #[serde(rename = "DestinationID")]
    pub destination_id: u32,
    /// 目标 talk-group 名称（可能为空）
    #[serde(rename = "DestinationName", default)]
    pub destination_name: String,
    /// 发射方呼号（可能为空，需要 callbook 反查）
    #[serde(rename = "SourceCall", default)]
    pub source_call: String,
    /// 发射方 DMR ID
    #[serde(rename = "SourceID")]
    pub source_id: u32,
    /// 发射方显示名称
    #[serde(rename = "SourceName", default)]
    pub source_name: String,
    /// 开始时间（epoch 秒）
    #[serde(rename = "Start")]
    pub start: u64,
    /// 结束时间（epoch 秒，进行中为 0）
    #[serde(rename = "Stop", default)]
    pub stop: u64,
    /// 事件类型
    #[serde(rename = "Event", default)]
    pub event: CallEvent,
}

impl CallRecord {
    /// 传输是否已经结束（带有结束时间戳）
    pub fn is_finished(&self) -> bool {
        self.stop != 0
    }

    /// 传输时长（秒）；进行中的传输返回 0
    pub fn duration_secs(&self) -> u64 {
        if self.stop == 0 {
            return 0;
        }
        self.stop.saturating_sub(self.start)
    }
}
