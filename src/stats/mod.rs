use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::engine::QueryEngine;
use crate::error::Result;
use crate::models::PatchKind;
use crate::query::decode::decode_stats_row;
use crate::query::stats_query;

/// 按三段数字比较版本号
///
/// 以 `.` 切分，自左向右取前三段解析为数字；缺失或非数字的
/// 段按 0 处理（预发布后缀也是 0，语料排序依赖这一行为）。
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    parse_version(a).cmp(&parse_version(b))
}

fn parse_version(version: &str) -> (u64, u64, u64) {
    let mut parts = version
        .split('.')
        .map(|part| part.trim().parse::<u64>().unwrap_or(0));
    (
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
    )
}

/// 单个版本的各类别提交计数与合计
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionAggregate {
    pub version: String,
    pub performance: usize,
    pub feature: usize,
    pub bug: usize,
    pub maintenance: usize,
    pub reliability: usize,
    pub total: usize,
}

impl VersionAggregate {
    fn new(version: String) -> Self {
        Self {
            version,
            performance: 0,
            feature: 0,
            bug: 0,
            maintenance: 0,
            reliability: 0,
            total: 0,
        }
    }

    fn add(&mut self, kind: PatchKind, count: usize) {
        match kind {
            PatchKind::Performance => self.performance += count,
            PatchKind::Feature => self.feature += count,
            PatchKind::Bug => self.bug += count,
            PatchKind::Maintenance => self.maintenance += count,
            PatchKind::Reliability => self.reliability += count,
        }
        self.total += count;
    }

    pub fn count_for(&self, kind: PatchKind) -> usize {
        match kind {
            PatchKind::Performance => self.performance,
            PatchKind::Feature => self.feature,
            PatchKind::Bug => self.bug,
            PatchKind::Maintenance => self.maintenance,
            PatchKind::Reliability => self.reliability,
        }
    }
}

/// 将 (版本, 类别, 计数) 行归并为按版本排序的聚合序列
///
/// 未出现的 (版本, 类别) 组合保持 0；比较相等的版本按稳定
/// 排序保持输入相对顺序；拼写不同的版本串从不合并。
pub fn reduce(rows: Vec<(String, PatchKind, usize)>) -> Vec<VersionAggregate> {
    let mut series: Vec<VersionAggregate> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (version, kind, count) in rows {
        let slot = match index.get(&version) {
            Some(slot) => *slot,
            None => {
                series.push(VersionAggregate::new(version.clone()));
                let slot = series.len() - 1;
                index.insert(version, slot);
                slot
            }
        };
        series[slot].add(kind, count);
    }

    series.sort_by(|a, b| compare_versions(&a.version, &b.version));
    series
}

/// 运行分组查询并归并为聚合序列；不叠加任何界面过滤
pub async fn aggregate(engine: &Arc<dyn QueryEngine>) -> Result<Vec<VersionAggregate>> {
    let rows = engine.query(stats_query()).await?;
    let triples: Vec<(String, PatchKind, usize)> =
        rows.iter().map(decode_stats_row).collect::<Result<_>>()?;
    let series = reduce(triples);
    info!("aggregated {} versions", series.len());
    Ok(series)
}
