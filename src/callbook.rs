//! DMR ID 反查表 - 数字 ID → 呼号
//!
//! 从 `dmrid.dat`（分号分隔：`id;callsign;<忽略>`）加载只读查询表，
//! 并由后台任务定期整表替换。读取方永远只会看到一张完整的表：
//! 重载失败时保留上一张表，等待下一轮刷新。

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

/// DMR ID 反查表
#[derive(Debug)]
pub struct Callbook {
    /// 当前快照；刷新时整体替换
    table: RwLock<Arc<HashMap<u32, String>>>,
}

impl Callbook {
    /// 创建空表（首次加载完成前的状态）
    pub fn empty() -> Self {
        Self {
            table: RwLock::new(Arc::new(HashMap::new())),
        }
    }

    /// 从 dmrid 文件加载
    pub fn load(path: &Path) -> Result<Self> {
        let book = Self::empty();
        book.reload(path)?;
        Ok(book)
    }

    /// 重新加载并整表替换；返回条目数
    ///
    /// 解析失败时不修改当前表。
    pub fn reload(&self, path: &Path) -> Result<usize> {
        let table = parse_dmrid_file(path)?;
        let count = table.len();
        *self.table.write().unwrap() = Arc::new(table);
        Ok(count)
    }

    /// 反查呼号
    pub fn callsign_for(&self, id: u32) -> Option<String> {
        self.table.read().unwrap().get(&id).cloned()
    }

    /// 当前表的条目数
    pub fn len(&self) -> usize {
        self.table.read().unwrap().len()
    }

    /// 当前表是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 解析 dmrid 文件
///
/// 每行格式 `id;callsign;<忽略字段>`；空行和无法解析的行跳过。
fn parse_dmrid_file(path: &Path) -> Result<HashMap<u32, String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dmrid file {}", path.display()))?;

    let mut table = HashMap::new();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split(';');
        let id = fields.next().map(str::trim);
        let callsign = fields.next().map(str::trim);
        match (id.and_then(|s| s.parse::<u32>().ok()), callsign) {
            (Some(id), Some(callsign)) if !callsign.is_empty() => {
                table.insert(id, callsign.to_string());
            }
            _ => {
                debug!(line = lineno + 1, "skipping malformed dmrid line");
            }
        }
    }
    Ok(table)
}

/// 定期刷新任务
///
/// 按 `interval_secs` 周期重载反查表。失败只告警，保留旧表。
pub async fn refresh_loop(callbook: Arc<Callbook>, path: PathBuf, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    // 第一个 tick 立即返回，跳过（启动时已经加载过）
    interval.tick().await;

    loop {
        interval.tick().await;
        match callbook.reload(&path) {
            Ok(count) => {
                info!(entries = count, "dmrid table refreshed");
            }
            Err(e) => {
                warn!(error = %e, "dmrid refresh failed, keeping previous table");
            }
        }
    }
}
