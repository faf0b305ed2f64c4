use thiserror::Error;

/// 查询层统一错误类型
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// 会话初始化失败；该状态持久，不重试
    #[error("session initialization failed at {stage}: {source}")]
    SessionInit {
        stage: &'static str,
        #[source]
        source: Box<ExplorerError>,
    },

    /// 数据集拉取失败，携带 HTTP 语义的状态码
    #[error("failed to fetch dataset '{path}': status {status}")]
    DatasetFetch { path: String, status: u16 },

    /// 数据集内容无法按表模式解析
    #[error("dataset for table '{table}' is malformed: {reason}")]
    DatasetFormat { table: &'static str, reason: String },

    /// 引擎执行错误
    #[error("query engine error: {message}")]
    Engine { message: String },

    /// 行解码错误（列缺失、类型不符或数值越界）
    #[error("failed to decode column '{column}': {reason}")]
    Decode { column: String, reason: String },

    /// 会话处于失败或未就绪状态
    #[error("session is not ready: {0}")]
    NotReady(String),
}

impl ExplorerError {
    pub fn decode(column: impl Into<String>, reason: impl Into<String>) -> Self {
        ExplorerError::Decode {
            column: column.into(),
            reason: reason.into(),
        }
    }

    pub fn engine(message: impl Into<String>) -> Self {
        ExplorerError::Engine {
            message: message.into(),
        }
    }

    pub fn session_init(stage: &'static str, source: ExplorerError) -> Self {
        ExplorerError::SessionInit {
            stage,
            source: Box::new(source),
        }
    }
}

impl From<sqlx::Error> for ExplorerError {
    fn from(error: sqlx::Error) -> Self {
        ExplorerError::Engine {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
