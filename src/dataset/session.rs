use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use super::fetch::DataFetcher;
use crate::engine::{DatasetTable, EngineBackend, QueryEngine};
use crate::error::{ExplorerError, Result};

/// 对外可见的会话就绪状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Loading,
    Ready,
    Failed(String),
}

enum SessionPhase {
    Uninitialized,
    Initializing,
    Ready(Arc<dyn QueryEngine>),
    Failed(String),
}

/// 数据集会话：引擎生命周期与两张数据集表的装载
///
/// 初始化是全有或全无的：任一步骤失败都会让会话进入持久的
/// Failed 状态，后续 open 直接返回同一错误，不做重试。
pub struct DatasetSession {
    fetcher: Arc<dyn DataFetcher>,
    backend: Box<dyn EngineBackend>,
    phase: RwLock<SessionPhase>,
    init_lock: Mutex<()>,
}

impl DatasetSession {
    pub fn new(fetcher: Arc<dyn DataFetcher>, backend: Box<dyn EngineBackend>) -> Self {
        Self {
            fetcher,
            backend,
            phase: RwLock::new(SessionPhase::Uninitialized),
            init_lock: Mutex::new(()),
        }
    }

    /// 打开会话并返回查询句柄
    ///
    /// 并发调用只执行一次初始化：后到的调用在初始化锁上等待，
    /// 随后观察第一次调用的结果而不重跑任何副作用。
    pub async fn open(&self) -> Result<Arc<dyn QueryEngine>> {
        if let Some(resolved) = self.resolved().await {
            return resolved;
        }

        let _guard = self.init_lock.lock().await;
        // 持锁者之前可能已经完成初始化
        if let Some(resolved) = self.resolved().await {
            return resolved;
        }

        *self.phase.write().await = SessionPhase::Initializing;
        match self.initialize().await {
            Ok(handle) => {
                *self.phase.write().await = SessionPhase::Ready(handle.clone());
                info!("dataset session ready");
                Ok(handle)
            }
            Err(e) => {
                error!("dataset session initialization failed: {}", e);
                *self.phase.write().await = SessionPhase::Failed(e.to_string());
                Err(e)
            }
        }
    }

    async fn resolved(&self) -> Option<Result<Arc<dyn QueryEngine>>> {
        match &*self.phase.read().await {
            SessionPhase::Ready(handle) => Some(Ok(handle.clone())),
            SessionPhase::Failed(message) => Some(Err(ExplorerError::NotReady(message.clone()))),
            _ => None,
        }
    }

    async fn initialize(&self) -> Result<Arc<dyn QueryEngine>> {
        debug!("starting query engine backend");
        let engine: Arc<dyn QueryEngine> = Arc::from(
            self.backend
                .start()
                .await
                .map_err(|e| ExplorerError::session_init("engine start", e))?,
        );

        for table in DatasetTable::ALL {
            let bytes = self
                .fetcher
                .fetch(table.logical_path())
                .await
                .map_err(|e| ExplorerError::session_init("dataset fetch", e))?;
            engine
                .register_table(table, &bytes)
                .await
                .map_err(|e| ExplorerError::session_init("table register", e))?;
            info!(
                "loaded dataset '{}' into table '{}'",
                table.logical_path(),
                table.table_name()
            );
        }

        Ok(engine)
    }

    /// 当前就绪状态（三态信号）
    pub async fn status(&self) -> SessionStatus {
        match &*self.phase.read().await {
            SessionPhase::Uninitialized | SessionPhase::Initializing => SessionStatus::Loading,
            SessionPhase::Ready(_) => SessionStatus::Ready,
            SessionPhase::Failed(message) => SessionStatus::Failed(message.clone()),
        }
    }

    /// 就绪后的查询句柄
    pub async fn handle(&self) -> Option<Arc<dyn QueryEngine>> {
        match &*self.phase.read().await {
            SessionPhase::Ready(handle) => Some(handle.clone()),
            _ => None,
        }
    }

    /// 关闭会话：连接关闭与后端终止均为尽力而为，失败只记录，
    /// 不覆盖已经上报的初始化错误。
    pub async fn close(&self) {
        let engine = {
            let mut phase = self.phase.write().await;
            match &*phase {
                SessionPhase::Ready(handle) => {
                    let handle = handle.clone();
                    *phase = SessionPhase::Uninitialized;
                    Some(handle)
                }
                _ => None,
            }
        };

        if let Some(engine) = engine {
            if let Err(e) = engine.close().await {
                warn!("connection close failed: {}", e);
            }
            if let Err(e) = engine.terminate().await {
                warn!("engine terminate failed: {}", e);
            }
            info!("dataset session closed");
        }
    }
}
