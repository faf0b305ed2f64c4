//! 行解码边界：引擎行在这里转换成类型化记录。
//!
//! 宽整数在此统一归一化为本地 usize；列缺失、类型不符或负值
//! 都报告为解码错误，未经检查的数据不会继续向内传播。

use crate::engine::{EngineRow, EngineValue};
use crate::error::{ExplorerError, Result};
use crate::models::{Commit, FileDiff, PatchKind};

fn field<'a>(row: &'a EngineRow, column: &str) -> Result<&'a EngineValue> {
    row.get(column)
        .ok_or_else(|| ExplorerError::decode(column, "missing column"))
}

/// 宽整数 → usize 归一化
pub fn count_field(row: &EngineRow, column: &str) -> Result<usize> {
    match field(row, column)? {
        EngineValue::WideInt(value) => usize::try_from(*value)
            .map_err(|_| ExplorerError::decode(column, format!("negative count {}", value))),
        other => Err(ExplorerError::decode(
            column,
            format!("expected wide integer, got {}", other.type_name()),
        )),
    }
}

pub fn text_field(row: &EngineRow, column: &str) -> Result<String> {
    match field(row, column)? {
        EngineValue::Text(value) => Ok(value.clone()),
        other => Err(ExplorerError::decode(
            column,
            format!("expected text, got {}", other.type_name()),
        )),
    }
}

/// 可空文本列；NULL 映射为 None
pub fn optional_text_field(row: &EngineRow, column: &str) -> Result<Option<String>> {
    match field(row, column)? {
        EngineValue::Text(value) => Ok(Some(value.clone())),
        EngineValue::Null => Ok(None),
        other => Err(ExplorerError::decode(
            column,
            format!("expected text or null, got {}", other.type_name()),
        )),
    }
}

pub fn decode_commit(row: &EngineRow) -> Result<Commit> {
    Ok(Commit {
        commit_id: text_field(row, "commit_id")?,
        author: text_field(row, "author")?,
        date: text_field(row, "date")?,
        message: text_field(row, "message")?,
        files_changed: count_field(row, "files_changed")?,
        insertions: count_field(row, "insertions")?,
        deletions: count_field(row, "deletions")?,
        version: optional_text_field(row, "version")?.unwrap_or_default(),
        component: optional_text_field(row, "component")?.unwrap_or_default(),
        patch_type: optional_text_field(row, "patch_type")?.unwrap_or_default(),
        tags: optional_text_field(row, "tags")?.unwrap_or_default(),
    })
}

pub fn decode_file_diff(row: &EngineRow) -> Result<FileDiff> {
    Ok(FileDiff {
        id: count_field(row, "id")?,
        commit_id: text_field(row, "commit_id")?,
        file_path: text_field(row, "file_path")?,
        insertions: count_field(row, "insertions")?,
        deletions: count_field(row, "deletions")?,
        diff_content: optional_text_field(row, "diff_content")?.unwrap_or_default(),
    })
}

/// 计数查询的单标量结果
pub fn decode_total(rows: &[EngineRow]) -> Result<usize> {
    let row = rows
        .first()
        .ok_or_else(|| ExplorerError::decode("total", "count query returned no rows"))?;
    count_field(row, "total")
}

/// 统计查询的一行：(版本, 类别, 计数)
pub fn decode_stats_row(row: &EngineRow) -> Result<(String, PatchKind, usize)> {
    let version = text_field(row, "version")?;
    let raw_kind = text_field(row, "patch_type")?;
    let kind = PatchKind::parse(&raw_kind).ok_or_else(|| {
        ExplorerError::decode("patch_type", format!("unknown patch type '{}'", raw_kind))
    })?;
    let count = count_field(row, "commit_count")?;
    Ok((version, kind, count))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit_row() -> EngineRow {
        [
            ("commit_id", EngineValue::Text("deadbeef".into())),
            ("author", EngineValue::Text("Jan Kara".into())),
            ("date", EngineValue::Text("2019-11-05".into())),
            ("message", EngineValue::Text("ext4: fix deadlock".into())),
            ("files_changed", EngineValue::WideInt(3)),
            ("insertions", EngineValue::WideInt(1_234_567)),
            ("deletions", EngineValue::WideInt(0)),
            ("version", EngineValue::Text("5.4".into())),
            ("component", EngineValue::Text("inode".into())),
            ("patch_type", EngineValue::Text("bug".into())),
            ("tags", EngineValue::Null),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_wide_integer_round_trips_to_native() {
        let commit = decode_commit(&commit_row()).unwrap();
        assert_eq!(commit.insertions, 1_234_567usize);
        assert_eq!(commit.files_changed, 3);
        assert_eq!(commit.deletions, 0);
    }

    #[test]
    fn test_null_text_becomes_empty_string() {
        let commit = decode_commit(&commit_row()).unwrap();
        assert_eq!(commit.tags, "");
    }

    #[test]
    fn test_missing_column_is_reported() {
        let row: EngineRow = [("total", EngineValue::WideInt(1))].into_iter().collect();
        let err = decode_commit(&row).unwrap_err();
        assert!(matches!(err, ExplorerError::Decode { .. }));
    }

    #[test]
    fn test_negative_count_is_rejected() {
        let row: EngineRow = [("total", EngineValue::WideInt(-1))].into_iter().collect();
        let err = count_field(&row, "total").unwrap_err();
        assert!(err.to_string().contains("negative count"));
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let row: EngineRow = [("total", EngineValue::Text("10".into()))]
            .into_iter()
            .collect();
        assert!(count_field(&row, "total").is_err());
    }

    #[test]
    fn test_decode_total_reads_scalar() {
        let rows = vec![[("total", EngineValue::WideInt(42))]
            .into_iter()
            .collect::<EngineRow>()];
        assert_eq!(decode_total(&rows).unwrap(), 42);
        assert!(decode_total(&[]).is_err());
    }

    #[test]
    fn test_decode_stats_row() {
        let row: EngineRow = [
            ("version", EngineValue::Text("4.9".into())),
            ("patch_type", EngineValue::Text("feature".into())),
            ("commit_count", EngineValue::WideInt(7)),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            decode_stats_row(&row).unwrap(),
            ("4.9".to_string(), PatchKind::Feature, 7)
        );
    }
}
