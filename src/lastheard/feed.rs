//! Brandmeister last-heard 流 - WebSocket 传输层
//!
//! 连接 last-heard 的 Socket.IO 端点（websocket 传输），把 `mqtt`
//! 事件里的 payload 解码成 [`CallRecord`] 后交给 mpsc 通道。
//! 断线后指数退避重连（3s 起，60s 封顶），连接成功即重置退避。
//! 单条消息解码失败只跳过，不影响连接。
//!
//! 核心处理循环只消费 mpsc 里的记录，从不接触 socket 本身。

use std::time::Duration;

use anyhow::{bail, Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use super::record::CallRecord;

/// 默认的 last-heard 端点
pub const DEFAULT_FEED_URL: &str =
    "wss://api.brandmeister.network/lh/socket.io/?EIO=4&transport=websocket";

const INITIAL_BACKOFF_SECS: u64 = 3;
const MAX_BACKOFF_SECS: u64 = 60;

/// last-heard 流客户端
pub struct LastheardFeed {
    url: String,
    tx: mpsc::Sender<CallRecord>,
}

impl LastheardFeed {
    /// 创建流客户端
    pub fn new(url: impl Into<String>, tx: mpsc::Sender<CallRecord>) -> Self {
        Self {
            url: url.into(),
            tx,
        }
    }

    /// 运行直到接收方关闭
    ///
    /// 断线自动重连；接收方（处理循环）退出后返回。
    pub async fn run(&self) {
        let mut backoff_secs = INITIAL_BACKOFF_SECS;

        loop {
            match self.connect_and_listen().await {
                Ok(()) => {
                    info!("last-heard connection closed cleanly");
                    backoff_secs = INITIAL_BACKOFF_SECS;
                }
                Err(e) => {
                    warn!(error = %e, "last-heard connection failed");
                }
            }

            if self.tx.is_closed() {
                return;
            }

            debug!(backoff_secs, "reconnecting to last-heard feed");
            tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
            backoff_secs = (backoff_secs * 2).min(MAX_BACKOFF_SECS);
        }
    }

    async fn connect_and_listen(&self) -> Result<()> {
        let (stream, _) = connect_async(&self.url)
            .await
            .context("websocket connect failed")?;
        info!(url = %self.url, "connected to last-heard feed");

        let (mut write, mut read) = stream.split();

        while let Some(message) = read.next().await {
            match message.context("websocket stream error")? {
                Message::Text(frame) => {
                    // Engine.IO 控制帧需要应答（open → 连接命名空间，ping → pong）
                    if let Some(reply) = control_reply(&frame) {
                        write
                            .send(Message::Text(reply.to_string()))
                            .await
                            .context("websocket send failed")?;
                        continue;
                    }
                    if let Some(record) = decode_event(&frame) {
                        if self.tx.send(record).await.is_err() {
                            bail!("record channel closed");
                        }
                    }
                }
                Message::Ping(data) => {
                    write
                        .send(Message::Pong(data))
                        .await
                        .context("websocket send failed")?;
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
        Ok(())
    }
}

/// Engine.IO 控制帧的应答
///
/// `0{...}`（open）→ `40` 连接默认命名空间；`2`（ping）→ `3`（pong）。
fn control_reply(frame: &str) -> Option<&'static str> {
    if frame.starts_with('0') {
        return Some("40");
    }
    if frame == "2" {
        return Some("3");
    }
    None
}

/// 解码事件帧 `42["mqtt",{"payload":"<JSON 字符串>"}]`
///
/// 其他事件、解码失败的 payload 都返回 `None`（只记日志）。
fn decode_event(frame: &str) -> Option<CallRecord> {
    let body = frame.strip_prefix("42")?;

    let (event, data): (String, serde_json::Value) = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!(error = %e, "unparseable event frame");
            return None;
        }
    };
    if event != "mqtt" {
        debug!(event = %event, "ignoring event");
        return None;
    }

    let payload = data.get("payload").and_then(|p| p.as_str())?;
    match serde_json::from_str::<CallRecord>(payload) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(error = %e, "dropping malformed call record");
            None
        }
    }
}
