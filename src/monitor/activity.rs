//! 活动追踪器 - 记录呼号和 talk-group 的最近活动时间
//!
//! 两个键空间相互独立：
//! - 呼号 → 最近一次通知时间（用于静默窗口去抖）
//! - talk-group → 最近一次活动时间
//!
//! 从未见过的键视为"无限久远"，总是满足静默条件。
//! 状态只在进程内存中，进程重启即丢失。

use std::collections::HashMap;

/// 活动追踪器
#[derive(Debug, Default)]
pub struct ActivityTracker {
    /// 呼号 → 最近通知时间（epoch 秒）
    callsign_seen: HashMap<String, u64>,
    /// talk-group → 最近活动时间（epoch 秒）
    talkgroup_seen: HashMap<u32, u64>,
}

impl ActivityTracker {
    /// 创建空的追踪器
    pub fn new() -> Self {
        Self::default()
    }

    /// 呼号是否已静默至少 `window` 秒
    ///
    /// 从未见过的呼号返回 `true`。
    pub fn callsign_is_silent(&self, callsign: &str, now: u64, window: u64) -> bool {
        match self.callsign_seen.get(callsign) {
            Some(last) => now.saturating_sub(*last) >= window,
            None => true,
        }
    }

    /// 记录呼号在 `now` 时刻触发了通知
    pub fn record_callsign(&mut self, callsign: &str, now: u64) {
        self.callsign_seen.insert(callsign.to_string(), now);
    }

    /// talk-group 是否已静默至少 `window` 秒
    ///
    /// 从未见过的 talk-group 返回 `true`。
    pub fn talkgroup_is_silent(&self, talkgroup: u32, now: u64, window: u64) -> bool {
        match self.talkgroup_seen.get(&talkgroup) {
            Some(last) => now.saturating_sub(*last) >= window,
            None => true,
        }
    }

    /// 记录 talk-group 在 `now` 时刻有活动
    pub fn record_talkgroup(&mut self, talkgroup: u32, now: u64) {
        self.talkgroup_seen.insert(talkgroup, now);
    }
}
