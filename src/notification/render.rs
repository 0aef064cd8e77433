//! 消息渲染 - 将通知事件渲染为各渠道的内容格式
//!
//! 纯函数，无副作用。两种输出：
//! - 文本渲染：寻呼/聊天渠道用的单行文本
//! - 结构化渲染：支持富卡片的渠道用的 embed
//!
//! 时长规则：不足 2 秒的按键俗称 kerchunk，按字面量渲染。

use serde::Serialize;

use crate::monitor::decision::{NotificationEvent, Phase};

/// 渲染用的字面量
pub mod msg {
    /// 不足 2 秒的按键
    pub const KERCHUNK: &str = "kerchunk!";
    /// 会话进行中的时长占位
    pub const TALKING_NOW: &str = "Talking now";
}

/// 进行中的 embed 强调色（红）
pub const COLOR_IN_PROGRESS: u32 = 0xE74C3C;
/// 已结束的 embed 强调色（蓝）
pub const COLOR_ENDED: u32 = 0x3498DB;

/// 呼号查询页地址
fn qrz_url(callsign: &str) -> String {
    format!("https://qrz.com/db/{}", callsign)
}

/// epoch 秒 → `YYYY/MM/DD HH:MM`（UTC）
pub fn format_utc(epoch_secs: u64) -> String {
    chrono::DateTime::from_timestamp(epoch_secs as i64, 0)
        .map(|t| t.format("%Y/%m/%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// 时长文本：不足 2 秒按 kerchunk 渲染
pub fn format_duration(secs: u64) -> String {
    if secs < 2 {
        msg::KERCHUNK.to_string()
    } else {
        format!("{} seconds", secs)
    }
}

/// 文本渲染
///
/// `[呼号](<qrz 链接>) (名字) [was ]active on <组号> [(组名) ]at <UTC 时间>[ (时长)]`
/// "was" 和时长只在最终阶段出现。
pub fn render_text(event: &NotificationEvent) -> String {
    let record = &event.record;
    let mut out = format!(
        "[{}](<{}>) ({})",
        record.source_call,
        qrz_url(&record.source_call),
        record.source_name
    );
    if event.phase.is_final() {
        out.push_str(" was");
    }
    out.push_str(&format!(" active on {}", record.destination_id));
    if !record.destination_name.is_empty() {
        out.push_str(&format!(" ({})", record.destination_name));
    }
    out.push_str(&format!(" at {} UTC", format_utc(record.start)));
    if event.phase.is_final() {
        out.push_str(&format!(" ({})", format_duration(record.duration_secs())));
    }
    out
}

/// Embed 字段
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// 结构化渲染结果
///
/// 字段布局与 Discord embed 的 JSON 结构一致，可直接序列化。
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Embed {
    pub title: String,
    pub url: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
}

impl Embed {
    fn field(name: &str, value: impl Into<String>, inline: bool) -> EmbedField {
        EmbedField {
            name: name.to_string(),
            value: value.into(),
            inline,
        }
    }
}

/// 结构化渲染
pub fn render_embed(event: &NotificationEvent) -> Embed {
    let record = &event.record;
    let title = if record.source_name.is_empty() {
        record.source_call.clone()
    } else {
        format!("{} ({})", record.source_call, record.source_name)
    };

    let color = match event.phase {
        Phase::Ended => COLOR_ENDED,
        _ => COLOR_IN_PROGRESS,
    };

    let duration = if event.phase.is_final() {
        format_duration(record.duration_secs())
    } else {
        msg::TALKING_NOW.to_string()
    };

    let mut fields = vec![Embed::field(
        "Talkgroup",
        record.destination_id.to_string(),
        true,
    )];
    if !record.destination_name.is_empty() {
        fields.push(Embed::field("Name", record.destination_name.clone(), true));
    }
    fields.push(Embed::field(
        "Started",
        format!("{} UTC", format_utc(record.start)),
        false,
    ));
    fields.push(Embed::field("Duration", duration, false));

    Embed {
        title,
        url: qrz_url(&record.source_call),
        color,
        fields,
    }
}
