use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};
use tracing::debug;

use crate::engine::QueryEngine;
use crate::error::Result;
use crate::models::FileDiff;
use crate::query::decode::decode_file_diff;
use crate::query::detail_query;

/// 懒加载的提交文件明细
///
/// 每个提交最多发出一次子查询：首个展开触发取数，结果在
/// 会话期内缓存且从不失效；并发的首次展开由按键 OnceCell
/// 保证只有一个真正执行。加载失败不占据缓存，后续展开可以
/// 再次尝试（由呈现层决定，这里不自动重试）。
pub struct DetailLoader {
    engine: Arc<dyn QueryEngine>,
    cache: RwLock<HashMap<String, Arc<OnceCell<Arc<Vec<FileDiff>>>>>>,
    expanded: RwLock<HashMap<String, HashSet<usize>>>,
}

impl DetailLoader {
    pub fn new(engine: Arc<dyn QueryEngine>) -> Self {
        Self {
            engine,
            cache: RwLock::new(HashMap::new()),
            expanded: RwLock::new(HashMap::new()),
        }
    }

    /// 取得某提交的文件明细；首次调用查询，之后命中缓存
    pub async fn load(&self, commit_id: &str) -> Result<Arc<Vec<FileDiff>>> {
        let cell = {
            let mut cache = self.cache.write().await;
            cache
                .entry(commit_id.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let diffs = cell
            .get_or_try_init(|| async {
                debug!("loading file diffs for commit {}", commit_id);
                let rows = self.engine.query(&detail_query(commit_id)).await?;
                let diffs: Vec<FileDiff> =
                    rows.iter().map(decode_file_diff).collect::<Result<_>>()?;
                Ok::<_, crate::error::ExplorerError>(Arc::new(diffs))
            })
            .await?;

        Ok(diffs.clone())
    }

    pub async fn is_loaded(&self, commit_id: &str) -> bool {
        self.cache
            .read()
            .await
            .get(commit_id)
            .map(|cell| cell.initialized())
            .unwrap_or(false)
    }

    /// 切换单个文件的展开状态，返回新状态；与明细缓存互相独立
    pub async fn toggle_file(&self, commit_id: &str, file_id: usize) -> bool {
        let mut expanded = self.expanded.write().await;
        let files = expanded.entry(commit_id.to_string()).or_default();
        if files.remove(&file_id) {
            false
        } else {
            files.insert(file_id);
            true
        }
    }

    pub async fn is_file_expanded(&self, commit_id: &str, file_id: usize) -> bool {
        self.expanded
            .read()
            .await
            .get(commit_id)
            .map(|files| files.contains(&file_id))
            .unwrap_or(false)
    }

    /// 全部收起；加载后的默认状态
    pub async fn collapse_all(&self, commit_id: &str) {
        if let Some(files) = self.expanded.write().await.get_mut(commit_id) {
            files.clear();
        }
    }
}
