use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;

use crate::error::Result;

pub mod sqlite;

pub use sqlite::{SqliteBackend, SqliteEngine};

/// 引擎原生字段值；WideInt 为引擎的 64 位宽整数表示
#[derive(Debug, Clone, PartialEq)]
pub enum EngineValue {
    Null,
    WideInt(i64),
    Real(f64),
    Text(String),
}

impl EngineValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            EngineValue::Null => "null",
            EngineValue::WideInt(_) => "wide integer",
            EngineValue::Real(_) => "real",
            EngineValue::Text(_) => "text",
        }
    }
}

/// 一行查询结果，按列名取值
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineRow {
    fields: HashMap<String, EngineValue>,
}

impl EngineRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: EngineValue) {
        self.fields.insert(column.into(), value);
    }

    pub fn get(&self, column: &str) -> Option<&EngineValue> {
        self.fields.get(column)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, EngineValue)> for EngineRow {
    fn from_iter<T: IntoIterator<Item = (K, EngineValue)>>(iter: T) -> Self {
        let mut row = EngineRow::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

/// 两个数据集在引擎内注册的固定表名与逻辑文件名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetTable {
    Commits,
    CommitFileDiffs,
}

impl DatasetTable {
    pub const ALL: [DatasetTable; 2] = [DatasetTable::Commits, DatasetTable::CommitFileDiffs];

    pub fn table_name(&self) -> &'static str {
        match self {
            DatasetTable::Commits => "commits",
            DatasetTable::CommitFileDiffs => "commit_file_diffs",
        }
    }

    pub fn logical_path(&self) -> &'static str {
        match self {
            DatasetTable::Commits => "ext4-commits.json",
            DatasetTable::CommitFileDiffs => "ext4-commits-code.json",
        }
    }
}

/// 嵌入式查询引擎能力
#[async_trait]
pub trait QueryEngine: Send + Sync + Debug {
    /// 将数据集字节流注册为内存表；字节布局由引擎自行解释
    async fn register_table(&self, table: DatasetTable, bytes: &[u8]) -> Result<()>;

    /// 执行查询文本，返回按列名取值的行序列
    async fn query(&self, sql: &str) -> Result<Vec<EngineRow>>;

    /// 关闭查询连接
    async fn close(&self) -> Result<()>;

    /// 终止引擎后端
    async fn terminate(&self) -> Result<()>;
}

/// 引擎后端选择与启动
#[async_trait]
pub trait EngineBackend: Send + Sync {
    async fn start(&self) -> Result<Box<dyn QueryEngine>>;
}
