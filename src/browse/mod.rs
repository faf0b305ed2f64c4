use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::engine::QueryEngine;
use crate::error::Result;
use crate::models::Commit;
use crate::query::decode::{decode_commit, decode_total};
use crate::query::{count_query, page_query, FilterCriteria, PAGE_SIZE};

pub mod details;

pub use details::DetailLoader;

/// 浏览器当前所处阶段；非 Idle 阶段拒绝新的导航请求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BrowsePhase {
    Idle,
    Searching,
    Navigating,
}

/// 呈现层可见的结果快照
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseSnapshot {
    pub rows: Vec<Commit>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
    pub busy: bool,
}

/// 导航请求的结果；Rejected 是静默无操作，不是错误
#[derive(Debug, Clone, PartialEq)]
pub enum NavOutcome {
    Done(BrowseSnapshot),
    Rejected,
}

struct BrowserInner {
    phase: BrowsePhase,
    criteria: FilterCriteria,
    rows: Vec<Commit>,
    total: usize,
    page: usize,
    /// clear/search 递增；在途查询返回时校验，过期结果直接丢弃
    epoch: u64,
}

impl BrowserInner {
    fn snapshot(&self) -> BrowseSnapshot {
        BrowseSnapshot {
            rows: self.rows.clone(),
            total: self.total,
            page: self.page,
            total_pages: total_pages(self.total),
            busy: self.phase != BrowsePhase::Idle,
        }
    }
}

pub(crate) fn total_pages(total: usize) -> usize {
    (total + PAGE_SIZE - 1) / PAGE_SIZE
}

/// 分页搜索控制器
///
/// search/go_to/clear 构成一条逻辑操作流，流内同一时刻至多
/// 一个查询在途；到达时发现非空闲即丢弃请求，不排队不重试。
pub struct CommitBrowser {
    engine: Arc<dyn QueryEngine>,
    inner: RwLock<BrowserInner>,
}

impl CommitBrowser {
    pub fn new(engine: Arc<dyn QueryEngine>) -> Self {
        Self {
            engine,
            inner: RwLock::new(BrowserInner {
                phase: BrowsePhase::Idle,
                criteria: FilterCriteria::default(),
                rows: Vec::new(),
                total: 0,
                page: 1,
                epoch: 0,
            }),
        }
    }

    /// 按新条件搜索：先计数后取第一页，无论之前在哪一页都回到第 1 页
    pub async fn search(&self, criteria: FilterCriteria) -> Result<NavOutcome> {
        let epoch = {
            let mut inner = self.inner.write().await;
            if inner.phase != BrowsePhase::Idle {
                debug!("search rejected: browser is busy");
                return Ok(NavOutcome::Rejected);
            }
            inner.phase = BrowsePhase::Searching;
            inner.criteria = criteria.clone();
            inner.epoch += 1;
            inner.epoch
        };

        let fetched = self.run_search(&criteria).await;

        let mut inner = self.inner.write().await;
        inner.phase = BrowsePhase::Idle;
        match fetched {
            Ok((total, rows)) => {
                if inner.epoch != epoch {
                    debug!("discarding stale search result");
                    return Ok(NavOutcome::Rejected);
                }
                inner.total = total;
                inner.rows = rows;
                inner.page = 1;
                Ok(NavOutcome::Done(inner.snapshot()))
            }
            Err(e) => {
                // 失败时已展示的数据保持不变
                error!("search failed: {}", e);
                Err(e)
            }
        }
    }

    async fn run_search(&self, criteria: &FilterCriteria) -> Result<(usize, Vec<Commit>)> {
        let count_rows = self.engine.query(&count_query(criteria)).await?;
        let total = decode_total(&count_rows)?;
        if total == 0 {
            // 空结果不再发取页查询
            return Ok((0, Vec::new()));
        }
        let rows = self.fetch_page(criteria, 1).await?;
        Ok((total, rows))
    }

    /// 跳转到指定页；越界或忙碌时是无操作
    pub async fn go_to(&self, page: usize) -> Result<NavOutcome> {
        let (criteria, epoch) = {
            let mut inner = self.inner.write().await;
            if inner.phase != BrowsePhase::Idle {
                debug!("navigation rejected: browser is busy");
                return Ok(NavOutcome::Rejected);
            }
            let pages = total_pages(inner.total);
            if page < 1 || page > pages {
                debug!("navigation to page {} rejected (1..={})", page, pages);
                return Ok(NavOutcome::Rejected);
            }
            inner.phase = BrowsePhase::Navigating;
            (inner.criteria.clone(), inner.epoch)
        };

        let fetched = self.fetch_page(&criteria, page).await;

        let mut inner = self.inner.write().await;
        inner.phase = BrowsePhase::Idle;
        match fetched {
            Ok(rows) => {
                if inner.epoch != epoch {
                    debug!("discarding stale page result");
                    return Ok(NavOutcome::Rejected);
                }
                inner.rows = rows;
                inner.page = page;
                Ok(NavOutcome::Done(inner.snapshot()))
            }
            Err(e) => {
                error!("navigation to page {} failed: {}", page, e);
                Err(e)
            }
        }
    }

    async fn fetch_page(&self, criteria: &FilterCriteria, page: usize) -> Result<Vec<Commit>> {
        let rows = self.engine.query(&page_query(criteria, page)).await?;
        rows.iter().map(decode_commit).collect()
    }

    /// 清空条件与结果；不发出任何查询，在途结果凭纪元作废
    pub async fn clear(&self) -> BrowseSnapshot {
        let mut inner = self.inner.write().await;
        inner.criteria = FilterCriteria::default();
        inner.rows.clear();
        inner.total = 0;
        inner.page = 1;
        inner.epoch += 1;
        inner.snapshot()
    }

    pub async fn snapshot(&self) -> BrowseSnapshot {
        self.inner.read().await.snapshot()
    }

    pub async fn criteria(&self) -> FilterCriteria {
        self.inner.read().await.criteria.clone()
    }
}
