#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use patch_explorer::dataset::fetch::DataFetcher;
use patch_explorer::engine::{
    DatasetTable, EngineBackend, EngineRow, QueryEngine, SqliteBackend,
};
use patch_explorer::error::{ExplorerError, Result};

/// 固定语料大小
pub const FIXTURE_TOTAL: usize = 12;

pub fn commits_blob() -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!([
        {
            "commit_id": "3f9ad2c81b04", "author": "Theodore Ts'o", "date": "2024-03-10",
            "message": "ext4: fix corruption during split of extent tree",
            "files_changed": 2, "insertions": 24, "deletions": 6,
            "version": "6.8", "component": "extent", "patch_type": "bug", "tags": "stable,fix"
        },
        {
            "commit_id": "7c1e55aa0d92", "author": "Ritesh Harjani", "date": "2023-11-02",
            "message": "ext4: speed up mballoc scanning for large groups",
            "files_changed": 2, "insertions": 48, "deletions": 12,
            "version": "6.6", "component": "balloc", "patch_type": "performance", "tags": "mballoc"
        },
        {
            "commit_id": "b8d4f01e37ac", "author": "Zhang Yi", "date": "2023-05-21",
            "message": "ext4: revert Ts'o workaround for stale inode bitmap",
            "files_changed": 1, "insertions": 8, "deletions": 20,
            "version": "6.4", "component": "inode", "patch_type": "bug", "tags": ""
        },
        {
            "commit_id": "914acb03de77", "author": "Jan Kara", "date": "2022-08-14",
            "message": "ext4: avoid BUG_ON when extent map is inconsistent",
            "files_changed": 1, "insertions": 15, "deletions": 3,
            "version": "6.0", "component": "extent", "patch_type": "bug", "tags": "stable"
        },
        {
            "commit_id": "5e02d9cc41f8", "author": "Harshad Shirwadkar", "date": "2021-10-30",
            "message": "ext4: add fast commit support for directory renames",
            "files_changed": 3, "insertions": 120, "deletions": 14,
            "version": "5.15", "component": "dir", "patch_type": "feature", "tags": "fastcommit"
        },
        {
            "commit_id": "c6b19e04aa35", "author": "Lukas Czerner", "date": "2021-02-17",
            "message": "ext4: clean up superblock checksum handling",
            "files_changed": 2, "insertions": 30, "deletions": 41,
            "version": "5.11", "component": "super", "patch_type": "maintenance", "tags": ""
        },
        {
            "commit_id": "2d8ef190cb44", "author": "Ye Bin", "date": "2020-06-04",
            "message": "ext4: harden journal replay against truncated log",
            "files_changed": 1, "insertions": 22, "deletions": 5,
            "version": "5.7", "component": "trans", "patch_type": "reliability", "tags": "jbd2"
        },
        {
            "commit_id": "f01bc8833e09", "author": "Eric Whitney", "date": "2019-09-19",
            "message": "ext4: report extent status cache in sysfs",
            "files_changed": 2, "insertions": 66, "deletions": 2,
            "version": "5.3", "component": "extent", "patch_type": "feature", "tags": ""
        },
        {
            "commit_id": "a47e09d4b152", "author": "Darrick J. Wong", "date": "2018-01-28",
            "message": "ext4: fix balloc underflow on tiny filesystems",
            "files_changed": 2, "insertions": 9, "deletions": 4,
            "version": "4.15", "component": "file", "patch_type": "bug", "tags": "stable,fix,fix"
        },
        {
            "commit_id": "08dd67c1f3ea", "author": "Davide Italiano", "date": "2016-12-11",
            "message": "ext4: drop unused tree walk helpers",
            "files_changed": 1, "insertions": 0, "deletions": 55,
            "version": "4.9", "component": "tree", "patch_type": "maintenance", "tags": ""
        },
        {
            "commit_id": "6690da03b1c7", "author": "Michael Halcrow", "date": "2016-05-22",
            "message": "ext4: batch orphan list updates",
            "files_changed": 1, "insertions": 34, "deletions": 10,
            "version": "4.6", "component": "other", "patch_type": "performance", "tags": ""
        },
        {
            "commit_id": "d1532f08ae6b", "author": "Theodore Ts'o", "date": "2015-04-12",
            "message": "ext4: fix inode checksum calculation after resize",
            "files_changed": 1, "insertions": 12, "deletions": 2,
            "version": "4.0", "component": "inode", "patch_type": "bug", "tags": "stable"
        }
    ]))
    .unwrap()
}

pub fn diffs_blob() -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!([
        {
            "id": 1, "commit_id": "3f9ad2c81b04", "file_path": "fs/ext4/extents.c",
            "insertions": 20, "deletions": 5,
            "diff_content": "@@ -3021,7 +3021,9 @@ static int ext4_split_extent_at(...)"
        },
        {
            "id": 2, "commit_id": "3f9ad2c81b04", "file_path": "fs/ext4/extents_status.c",
            "insertions": 4, "deletions": 1,
            "diff_content": "@@ -118,6 +118,9 @@ static void ext4_es_insert_extent(...)"
        },
        {
            "id": 3, "commit_id": "7c1e55aa0d92", "file_path": "fs/ext4/balloc.c",
            "insertions": 18, "deletions": 6,
            "diff_content": "@@ -402,10 +402,22 @@ ext4_read_block_bitmap_nowait(...)"
        },
        {
            "id": 4, "commit_id": "7c1e55aa0d92", "file_path": "fs/ext4/mballoc.c",
            "insertions": 30, "deletions": 6,
            "diff_content": "@@ -2210,8 +2210,26 @@ static int ext4_mb_good_group(...)"
        },
        {
            "id": 5, "commit_id": "914acb03de77", "file_path": "fs/ext4/extents.c",
            "insertions": 15, "deletions": 3,
            "diff_content": "@@ -560,7 +560,19 @@ static int ext4_ext_check(...)"
        },
        {
            "id": 6, "commit_id": "5e02d9cc41f8", "file_path": "fs/ext4/namei.c",
            "insertions": 120, "deletions": 14,
            "diff_content": "@@ -3810,12 +3810,98 @@ static int ext4_rename(...)"
        },
        {
            "id": 7, "commit_id": "a47e09d4b152", "file_path": "fs/ext4/balloc.c",
            "insertions": 6, "deletions": 2,
            "diff_content": "@@ -77,9 +77,13 @@ ext4_free_clusters_after_init(...)"
        },
        {
            "id": 8, "commit_id": "a47e09d4b152", "file_path": "fs/ext2/balloc.c",
            "insertions": 3, "deletions": 2,
            "diff_content": "@@ -51,6 +51,7 @@ ext2_get_group_desc(...)"
        },
        {
            "id": 9, "commit_id": "2d8ef190cb44", "file_path": "fs/jbd2/recovery.c",
            "insertions": 22, "deletions": 5,
            "diff_content": "@@ -287,11 +287,28 @@ int jbd2_journal_recover(...)"
        }
    ]))
    .unwrap()
}

/// 内存数据集获取器；统计 fetch 调用次数
pub struct MemFetcher {
    files: HashMap<String, Bytes>,
    fetch_calls: AtomicUsize,
}

impl MemFetcher {
    pub fn with_fixture() -> Self {
        let mut files = HashMap::new();
        files.insert(
            "ext4-commits.json".to_string(),
            Bytes::from(commits_blob()),
        );
        files.insert(
            "ext4-commits-code.json".to_string(),
            Bytes::from(diffs_blob()),
        );
        Self {
            files,
            fetch_calls: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self {
            files: HashMap::new(),
            fetch_calls: AtomicUsize::new(0),
        }
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataFetcher for MemFetcher {
    async fn fetch(&self, logical_path: &str) -> Result<Bytes> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.files
            .get(logical_path)
            .cloned()
            .ok_or_else(|| ExplorerError::DatasetFetch {
                path: logical_path.to_string(),
                status: 404,
            })
    }
}

/// 包装真实引擎并统计发出的查询次数
#[derive(Debug)]
pub struct CountingEngine {
    inner: Box<dyn QueryEngine>,
    queries: AtomicUsize,
    detail_queries: AtomicUsize,
}

impl CountingEngine {
    pub fn new(inner: Box<dyn QueryEngine>) -> Self {
        Self {
            inner,
            queries: AtomicUsize::new(0),
            detail_queries: AtomicUsize::new(0),
        }
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn detail_query_count(&self) -> usize {
        self.detail_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryEngine for CountingEngine {
    async fn register_table(&self, table: DatasetTable, bytes: &[u8]) -> Result<()> {
        self.inner.register_table(table, bytes).await
    }

    async fn query(&self, sql: &str) -> Result<Vec<EngineRow>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if sql.contains("FROM commit_file_diffs WHERE commit_id") {
            self.detail_queries.fetch_add(1, Ordering::SeqCst);
        }
        self.inner.query(sql).await
    }

    async fn close(&self) -> Result<()> {
        self.inner.close().await
    }

    async fn terminate(&self) -> Result<()> {
        self.inner.terminate().await
    }
}

/// 启动真实 SQLite 后端并装载固定语料
pub async fn fixture_engine() -> Arc<dyn QueryEngine> {
    let engine = SqliteBackend::detect().start().await.unwrap();
    engine
        .register_table(DatasetTable::Commits, &commits_blob())
        .await
        .unwrap();
    engine
        .register_table(DatasetTable::CommitFileDiffs, &diffs_blob())
        .await
        .unwrap();
    Arc::from(engine)
}

/// 同上，但带查询计数
pub async fn fixture_counting_engine() -> Arc<CountingEngine> {
    let engine = SqliteBackend::detect().start().await.unwrap();
    let counting = CountingEngine::new(engine);
    counting
        .register_table(DatasetTable::Commits, &commits_blob())
        .await
        .unwrap();
    counting
        .register_table(DatasetTable::CommitFileDiffs, &diffs_blob())
        .await
        .unwrap();
    Arc::new(counting)
}
