use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, SqlitePool, TypeInfo, ValueRef};
use tracing::{debug, info};

use super::{DatasetTable, EngineBackend, EngineRow, EngineValue, QueryEngine};
use crate::error::{ExplorerError, Result};

/// 列的存储类别，决定注册时的取值方式
#[derive(Debug, Clone, Copy)]
enum ColumnKind {
    Text,
    Integer,
}

/// 每张数据集表的固定模式；数据集字节流按此解释
fn table_columns(table: DatasetTable) -> &'static [(&'static str, ColumnKind)] {
    match table {
        DatasetTable::Commits => &[
            ("commit_id", ColumnKind::Text),
            ("author", ColumnKind::Text),
            ("date", ColumnKind::Text),
            ("message", ColumnKind::Text),
            ("files_changed", ColumnKind::Integer),
            ("insertions", ColumnKind::Integer),
            ("deletions", ColumnKind::Integer),
            ("version", ColumnKind::Text),
            ("component", ColumnKind::Text),
            ("patch_type", ColumnKind::Text),
            ("tags", ColumnKind::Text),
        ],
        DatasetTable::CommitFileDiffs => &[
            ("id", ColumnKind::Integer),
            ("commit_id", ColumnKind::Text),
            ("file_path", ColumnKind::Text),
            ("insertions", ColumnKind::Integer),
            ("deletions", ColumnKind::Integer),
            ("diff_content", ColumnKind::Text),
        ],
    }
}

fn create_table_sql(table: DatasetTable) -> String {
    let columns: Vec<String> = table_columns(table)
        .iter()
        .map(|(name, kind)| {
            let sql_type = match kind {
                ColumnKind::Text => "TEXT",
                ColumnKind::Integer => "INTEGER",
            };
            format!("{} {}", name, sql_type)
        })
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        table.table_name(),
        columns.join(", ")
    )
}

fn index_sql(table: DatasetTable) -> Vec<String> {
    match table {
        DatasetTable::Commits => vec![format!(
            "CREATE INDEX IF NOT EXISTS idx_commits_date ON {} (date)",
            table.table_name()
        )],
        DatasetTable::CommitFileDiffs => vec![
            format!(
                "CREATE INDEX IF NOT EXISTS idx_diffs_commit_id ON {} (commit_id)",
                table.table_name()
            ),
            format!(
                "CREATE INDEX IF NOT EXISTS idx_diffs_file_path ON {} (file_path)",
                table.table_name()
            ),
        ],
    }
}

/// 内存 SQLite 后端；start 产出唯一的查询连接
pub struct SqliteBackend {
    options: SqliteConnectOptions,
}

impl SqliteBackend {
    /// 选择与宿主兼容的执行配置（进程内内存库）
    pub fn detect() -> Self {
        Self {
            options: SqliteConnectOptions::new().filename(":memory:"),
        }
    }
}

#[async_trait]
impl EngineBackend for SqliteBackend {
    async fn start(&self) -> Result<Box<dyn QueryEngine>> {
        // 内存库不在连接间共享，池固定为单连接
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(self.options.clone())
            .await?;
        debug!("sqlite backend started with a single in-memory connection");
        Ok(Box::new(SqliteEngine { pool }))
    }
}

/// 基于 sqlx SqlitePool 的查询引擎
#[derive(Debug)]
pub struct SqliteEngine {
    pool: SqlitePool,
}

impl SqliteEngine {
    async fn create_schema(&self, table: DatasetTable) -> Result<()> {
        sqlx::query(&create_table_sql(table))
            .execute(&self.pool)
            .await?;
        for statement in index_sql(table) {
            sqlx::query(&statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl QueryEngine for SqliteEngine {
    async fn register_table(&self, table: DatasetTable, bytes: &[u8]) -> Result<()> {
        let rows: Vec<serde_json::Value> =
            serde_json::from_slice(bytes).map_err(|e| ExplorerError::DatasetFormat {
                table: table.table_name(),
                reason: e.to_string(),
            })?;

        self.create_schema(table).await?;

        let columns = table_columns(table);
        let column_names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
        let placeholders: Vec<&str> = columns.iter().map(|_| "?").collect();
        let insert_sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.table_name(),
            column_names.join(", "),
            placeholders.join(", ")
        );

        let mut tx = self.pool.begin().await?;
        for row in &rows {
            let record = row.as_object().ok_or_else(|| ExplorerError::DatasetFormat {
                table: table.table_name(),
                reason: "dataset row is not an object".to_string(),
            })?;
            let mut statement = sqlx::query(&insert_sql);
            for (name, kind) in columns {
                match kind {
                    ColumnKind::Text => {
                        statement = statement.bind(
                            record
                                .get(*name)
                                .and_then(serde_json::Value::as_str)
                                .map(str::to_string),
                        );
                    }
                    ColumnKind::Integer => {
                        statement =
                            statement.bind(record.get(*name).and_then(serde_json::Value::as_i64));
                    }
                }
            }
            statement.execute(&mut *tx).await?;
        }
        tx.commit().await?;

        info!(
            "registered table '{}' with {} rows",
            table.table_name(),
            rows.len()
        );
        Ok(())
    }

    async fn query(&self, sql: &str) -> Result<Vec<EngineRow>> {
        debug!("executing query: {}", sql);
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        rows.iter().map(engine_row).collect()
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        debug!("sqlite connection closed");
        Ok(())
    }

    async fn terminate(&self) -> Result<()> {
        // 进程内引擎没有独立工作线程，终止只是生命周期标记
        debug!("sqlite backend terminated");
        Ok(())
    }
}

/// 按列亲和性把一行 SQLite 结果转成引擎行
fn engine_row(row: &SqliteRow) -> Result<EngineRow> {
    let mut out = EngineRow::new();
    for (index, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(index)?;
        let value = if raw.is_null() {
            EngineValue::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" => EngineValue::WideInt(row.try_get::<i64, _>(index)?),
                "REAL" => EngineValue::Real(row.try_get::<f64, _>(index)?),
                _ => EngineValue::Text(row.try_get::<String, _>(index)?),
            }
        };
        out.insert(column.name().to_string(), value);
    }
    Ok(out)
}
