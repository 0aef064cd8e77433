//! 会话通知注册表 - (渠道, 会话) → 消息句柄
//!
//! 每个 (渠道, 会话) 至多一个在开的条目：首次通知时写入，
//! 定稿完成（或放弃）后恰好移除一次。由分发器独占写入，
//! 延迟定稿任务会并发访问，所以整个表放在一把锁后面。

use std::collections::HashMap;
use std::sync::Mutex;

use super::channel::MessageHandle;

/// 注册表键：渠道名 + 会话 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SessionKey {
    channel: String,
    session_id: u64,
}

/// 会话通知注册表
#[derive(Debug, Default)]
pub struct SessionRegistry {
    entries: Mutex<HashMap<SessionKey, MessageHandle>>,
}

impl SessionRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录某渠道为某会话创建的消息句柄
    pub fn open(&self, channel: &str, session_id: u64, handle: MessageHandle) {
        let key = SessionKey {
            channel: channel.to_string(),
            session_id,
        };
        self.entries.lock().unwrap().insert(key, handle);
    }

    /// 查询某渠道上某会话的句柄
    pub fn handle_for(&self, channel: &str, session_id: u64) -> Option<MessageHandle> {
        let key = SessionKey {
            channel: channel.to_string(),
            session_id,
        };
        self.entries.lock().unwrap().get(&key).cloned()
    }

    /// 移除条目，返回被移除的句柄
    pub fn close(&self, channel: &str, session_id: u64) -> Option<MessageHandle> {
        let key = SessionKey {
            channel: channel.to_string(),
            session_id,
        };
        self.entries.lock().unwrap().remove(&key)
    }

    /// 会话是否在任一渠道上有在开的通知
    pub fn session_open(&self, session_id: u64) -> bool {
        self.entries
            .lock()
            .unwrap()
            .keys()
            .any(|key| key.session_id == session_id)
    }

    /// 在开条目总数
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_and_lookup() {
        let registry = SessionRegistry::new();
        registry.open("discord", 42, MessageHandle::new("msg-1"));

        assert_eq!(
            registry.handle_for("discord", 42),
            Some(MessageHandle::new("msg-1"))
        );
        // 渠道是键的一部分
        assert_eq!(registry.handle_for("telegram", 42), None);
        assert_eq!(registry.handle_for("discord", 43), None);
    }

    #[test]
    fn test_session_open_across_channels() {
        let registry = SessionRegistry::new();
        assert!(!registry.session_open(42));

        registry.open("discord", 42, MessageHandle::new("msg-1"));
        assert!(registry.session_open(42));
        assert!(!registry.session_open(43));
    }

    #[test]
    fn test_close_removes_exactly_one_entry() {
        let registry = SessionRegistry::new();
        registry.open("discord", 42, MessageHandle::new("msg-1"));
        registry.open("discord", 43, MessageHandle::new("msg-2"));

        assert_eq!(
            registry.close("discord", 42),
            Some(MessageHandle::new("msg-1"))
        );
        // 重复移除是 no-op
        assert_eq!(registry.close("discord", 42), None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reopen_replaces_handle() {
        let registry = SessionRegistry::new();
        registry.open("discord", 42, MessageHandle::new("msg-1"));
        registry.open("discord", 42, MessageHandle::new("msg-2"));

        // 同键重复写入只保留最新句柄
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.handle_for("discord", 42),
            Some(MessageHandle::new("msg-2"))
        );
    }
}
