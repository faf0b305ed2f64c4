use once_cell::sync::Lazy;

use super::FilterCriteria;
use crate::models::PatchKind;

/// 固定页大小
pub const PAGE_SIZE: usize = 10;

/// SQL 字符串字面量转义；所有文本谓词共用的唯一入口。
/// 单引号加倍，防止用户输入提前终止字面量。
fn escape_sql_literal(raw: &str) -> String {
    raw.replace('\'', "''")
}

/// 把过滤条件展开为谓词列表；count 与 page 两种模式共用，
/// 保证同一条件下两类查询的约束完全一致。
pub fn conjuncts(criteria: &FilterCriteria) -> Vec<String> {
    let mut conditions = Vec::new();

    if let Some(keyword) = &criteria.keyword {
        let keyword = escape_sql_literal(keyword);
        conditions.push(format!(
            "(commit_id LIKE '%{}%' OR message LIKE '%{}%')",
            keyword, keyword
        ));
    }

    if let Some(start) = criteria.start_date {
        conditions.push(format!("date >= '{}'", start.format("%Y-%m-%d")));
    }
    if let Some(end) = criteria.end_date {
        conditions.push(format!("date <= '{}'", end.format("%Y-%m-%d")));
    }

    if let Some(version) = &criteria.version {
        conditions.push(format!("version LIKE '%{}%'", escape_sql_literal(version)));
    }

    if let Some(component) = criteria.component {
        conditions.push(format!("component = '{}'", component.as_str()));
    }

    if let Some(patch_type) = criteria.patch_type {
        conditions.push(format!("patch_type = '{}'", patch_type.as_str()));
    }

    // 文件名走子表的存在性子查询：一个提交无论命中多少文件都只出现一次
    if let Some(file_name) = &criteria.file_name {
        conditions.push(format!(
            "commit_id IN (SELECT DISTINCT commit_id FROM commit_file_diffs WHERE file_path LIKE '%{}%')",
            escape_sql_literal(file_name)
        ));
    }

    conditions
}

fn where_clause(criteria: &FilterCriteria) -> String {
    let conditions = conjuncts(criteria);
    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

/// 计数查询：单标量，无排序无分页
pub fn count_query(criteria: &FilterCriteria) -> String {
    format!(
        "SELECT COUNT(*) AS total FROM commits{}",
        where_clause(criteria)
    )
}

/// 取页查询：按日期降序，固定页大小
pub fn page_query(criteria: &FilterCriteria, page: usize) -> String {
    let offset = page.saturating_sub(1) * PAGE_SIZE;
    format!(
        "SELECT * FROM commits{} ORDER BY date DESC LIMIT {} OFFSET {}",
        where_clause(criteria),
        PAGE_SIZE,
        offset
    )
}

/// 单个提交的文件明细查询
pub fn detail_query(commit_id: &str) -> String {
    format!(
        "SELECT * FROM commit_file_diffs WHERE commit_id = '{}' ORDER BY file_path",
        escape_sql_literal(commit_id)
    )
}

/// 统计视图的分组查询；类别集固定为目录中的五类
pub fn stats_query() -> &'static str {
    static QUERY: Lazy<String> = Lazy::new(|| {
        let kinds: Vec<String> = PatchKind::ALL
            .iter()
            .map(|kind| format!("'{}'", kind.as_str()))
            .collect();
        format!(
            "SELECT version, patch_type, COUNT(*) AS commit_count FROM commits \
             WHERE version IS NOT NULL AND patch_type IS NOT NULL AND patch_type IN ({}) \
             GROUP BY version, patch_type ORDER BY version",
            kinds.join(", ")
        )
    });
    &QUERY
}
