use serde::{Deserialize, Serialize};
use std::fmt;

/// 提交记录（commits 表的一行）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub commit_id: String,
    pub author: String,
    /// ISO-8601 日期，按字典序比较
    pub date: String,
    pub message: String,
    pub files_changed: usize,
    pub insertions: usize,
    pub deletions: usize,
    pub version: String,
    pub component: String,
    pub patch_type: String,
    /// 逗号分隔的自由标签，展示时解析
    pub tags: String,
}

impl Commit {
    /// 解析标签：去空白、去空项，不去重
    pub fn tag_list(&self) -> Vec<String> {
        parse_tags(&self.tags)
    }

    /// 列表展示用的提交信息首行，超长截断
    pub fn summary_line(&self, max_len: usize) -> String {
        let first_line = self.message.lines().next().unwrap_or("");
        if first_line.chars().count() <= max_len {
            return first_line.to_string();
        }
        let truncated: String = first_line.chars().take(max_len).collect();
        format!("{}...", truncated)
    }
}

pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// 文件级变更记录（commit_file_diffs 表的一行）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiff {
    pub id: usize,
    pub commit_id: String,
    pub file_path: String,
    pub insertions: usize,
    pub deletions: usize,
    pub diff_content: String,
}

/// 固定的组件目录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Balloc,
    Dir,
    Extent,
    File,
    Inode,
    Trans,
    Super,
    Tree,
    Other,
}

impl Component {
    pub const ALL: [Component; 9] = [
        Component::Balloc,
        Component::Dir,
        Component::Extent,
        Component::File,
        Component::Inode,
        Component::Trans,
        Component::Super,
        Component::Tree,
        Component::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Balloc => "balloc",
            Component::Dir => "dir",
            Component::Extent => "extent",
            Component::File => "file",
            Component::Inode => "inode",
            Component::Trans => "trans",
            Component::Super => "super",
            Component::Tree => "tree",
            Component::Other => "other",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Component::Balloc => "Data-block allocation and deallocation",
            Component::Dir => "Directory management",
            Component::Extent => "Contiguous-blocks mapping",
            Component::File => "File read/write operations",
            Component::Inode => "Inode-metadata management",
            Component::Trans => "Journaling or transactional support",
            Component::Super => "Superblock metadata management",
            Component::Tree => "Generic tree-structure procedures",
            Component::Other => "Other miscellaneous operations",
        }
    }

    pub fn parse(raw: &str) -> Option<Component> {
        Component::ALL
            .iter()
            .copied()
            .find(|component| component.as_str() == raw)
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 固定的补丁类别目录；顺序即统计视图的堆叠顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchKind {
    Performance,
    Feature,
    Bug,
    Maintenance,
    Reliability,
}

impl PatchKind {
    pub const ALL: [PatchKind; 5] = [
        PatchKind::Performance,
        PatchKind::Feature,
        PatchKind::Bug,
        PatchKind::Maintenance,
        PatchKind::Reliability,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatchKind::Performance => "performance",
            PatchKind::Feature => "feature",
            PatchKind::Bug => "bug",
            PatchKind::Maintenance => "maintenance",
            PatchKind::Reliability => "reliability",
        }
    }

    /// 展示层使用的类别颜色
    pub fn color(&self) -> &'static str {
        match self {
            PatchKind::Performance => "#f59e0b",
            PatchKind::Feature => "#10b981",
            PatchKind::Bug => "#ef4444",
            PatchKind::Maintenance => "#6b7280",
            PatchKind::Reliability => "#8b5cf6",
        }
    }

    pub fn parse(raw: &str) -> Option<PatchKind> {
        PatchKind::ALL.iter().copied().find(|kind| kind.as_str() == raw)
    }
}

impl fmt::Display for PatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
