//! 通知决策引擎 - 判断一条传输记录是否值得通知
//!
//! 规则按优先级评估：
//! 1. 空呼号先通过 callbook 反查补全
//! 2. 噪音呼号直接压制
//! 3. 无法识别的来源压制
//! 4. 被监控呼号：静默窗口去抖，单发 `Started`/`Ended`
//! 5. 被监控 talk-group：两阶段生命周期 `InProgress`/`Ended`
//! 6. 其余一律压制
//!
//! 呼号监控关心"这个人最近说过话没有"，是粗粒度的去抖提醒；
//! talk-group 监控是在跟一段对话，需要进行中状态和最终摘要，
//! 所以两条路径的生命周期不对称。

use std::collections::HashSet;
use std::sync::Arc;

use crate::callbook::Callbook;
use crate::lastheard::{CallEvent, CallRecord};
use crate::monitor::activity::ActivityTracker;

/// 通知生命周期阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// 首次通知（呼号路径，传输仍在进行）
    Started,
    /// 会话进行中的更新（talk-group 路径）
    InProgress,
    /// 会话结束，带最终时长
    Ended,
}

impl Phase {
    /// 是否为最终阶段
    pub fn is_final(&self) -> bool {
        matches!(self, Phase::Ended)
    }
}

/// 决策引擎的输出事件：补全后的记录加上生命周期阶段
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    /// 传输记录（呼号已反查补全）
    pub record: CallRecord,
    /// 生命周期阶段
    pub phase: Phase,
}

/// 压制原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppression {
    /// 呼号在噪音名单中
    NoisyCall,
    /// 呼号为空且反查无结果
    Unidentified,
    /// 被监控呼号仍在静默窗口内
    QuietWindow,
    /// 收到未知会话的结束事件
    UnknownSession,
    /// 呼号和 talk-group 都不在监控名单中
    Unmonitored,
}

impl Suppression {
    /// 用于日志的简短原因
    pub fn as_str(&self) -> &'static str {
        match self {
            Suppression::NoisyCall => "noisy callsign",
            Suppression::Unidentified => "unidentified source",
            Suppression::QuietWindow => "within silence window",
            Suppression::UnknownSession => "stop for unknown session",
            Suppression::Unmonitored => "not monitored",
        }
    }
}

/// 单条记录的决策结果
#[derive(Debug, Clone)]
pub enum Decision {
    /// 发出通知
    Notify(NotificationEvent),
    /// 压制，带原因
    Suppress(Suppression),
}

/// 监控名单与去抖配置
#[derive(Debug, Clone, Default)]
pub struct WatchConfig {
    /// 被监控的呼号
    pub callsigns: HashSet<String>,
    /// 被监控的 talk-group
    pub talkgroups: HashSet<u32>,
    /// 噪音呼号（忽略）
    pub noisy_calls: HashSet<String>,
    /// 静默窗口（秒）
    pub min_silence_secs: u64,
}

/// 通知决策引擎
pub struct DecisionEngine {
    watch: WatchConfig,
    callbook: Arc<Callbook>,
    tracker: ActivityTracker,
}

impl DecisionEngine {
    /// 创建决策引擎
    pub fn new(watch: WatchConfig, callbook: Arc<Callbook>) -> Self {
        Self {
            watch,
            callbook,
            tracker: ActivityTracker::new(),
        }
    }

    /// 评估一条传输记录
    ///
    /// * `now` - 当前时间（epoch 秒）
    /// * `session_open` - 该会话是否已在任一渠道上打开了通知
    ///
    /// 记录按到达顺序逐条评估；引擎内部的活动状态只在这里变更。
    pub fn evaluate(&mut self, record: CallRecord, now: u64, session_open: bool) -> Decision {
        let mut record = record;

        // 空呼号先通过 callbook 反查补全
        if record.source_call.is_empty() {
            if let Some(callsign) = self.callbook.callsign_for(record.source_id) {
                record.source_call = callsign;
            }
        }

        if self.watch.noisy_calls.contains(&record.source_call) {
            return Decision::Suppress(Suppression::NoisyCall);
        }

        if record.source_call.is_empty() {
            return Decision::Suppress(Suppression::Unidentified);
        }

        if self.watch.callsigns.contains(&record.source_call) {
            return self.evaluate_callsign(record, now);
        }

        if self.watch.talkgroups.contains(&record.destination_id) {
            return self.evaluate_talkgroup(record, session_open);
        }

        Decision::Suppress(Suppression::Unmonitored)
    }

    /// 呼号路径：静默窗口去抖后单发一条通知
    fn evaluate_callsign(&mut self, record: CallRecord, now: u64) -> Decision {
        if !self
            .tracker
            .callsign_is_silent(&record.source_call, now, self.watch.min_silence_secs)
        {
            return Decision::Suppress(Suppression::QuietWindow);
        }

        // 活动发生在被监控的 talk-group 且已结束时，同时记录该组的
        // 活动时间，避免随后的 talk-group 路径对同一波活动立刻重复触发
        if self.watch.talkgroups.contains(&record.destination_id) && record.stop > 0 {
            self.tracker.record_talkgroup(record.destination_id, now);
        }
        self.tracker.record_callsign(&record.source_call, now);

        // 阶段只看 stop 是否存在：带结束时间的记录直接报 Ended，
        // 不另发 Started
        let phase = if record.is_finished() {
            Phase::Ended
        } else {
            Phase::Started
        };
        Decision::Notify(NotificationEvent { record, phase })
    }

    /// talk-group 路径：跟随会话生命周期
    fn evaluate_talkgroup(&mut self, record: CallRecord, session_open: bool) -> Decision {
        if record.event == CallEvent::SessionStop && !session_open {
            // 没有对应开始事件的结束事件不应凭空生成通知
            return Decision::Suppress(Suppression::UnknownSession);
        }

        let phase = if record.event == CallEvent::SessionStop {
            Phase::Ended
        } else {
            Phase::InProgress
        };
        Decision::Notify(NotificationEvent { record, phase })
    }
}
