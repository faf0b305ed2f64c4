use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(
    name = "patch-explorer",
    version,
    about = "Browse the ext4 filesystem patch-history corpus"
)]
pub struct Args {
    /// 数据集目录（包含 ext4-commits.json / ext4-commits-code.json）
    #[arg(long, default_value = "")] // 空字符串表示未指定
    pub data_dir: String,

    /// 数据集基础 URL（设置后通过 HTTP 拉取数据集）
    #[arg(long, default_value = "")]
    pub data_url: String,

    /// 关键字，同时匹配 commit id 与提交信息
    #[arg(short, long, default_value = "")]
    pub keyword: String,

    /// 起始日期（YYYY-MM-DD，含当日）
    #[arg(long, default_value = "")]
    pub start_date: String,

    /// 截止日期（YYYY-MM-DD，含当日）
    #[arg(long, default_value = "")]
    pub end_date: String,

    /// 内核版本子串过滤
    #[arg(long, default_value = "")]
    pub release: String,

    /// 组件过滤（balloc/dir/extent/file/inode/trans/super/tree/other）
    #[arg(long, default_value = "")]
    pub component: String,

    /// 补丁类别过滤（performance/feature/bug/maintenance/reliability）
    #[arg(long, default_value = "")]
    pub patch_type: String,

    /// 文件名子串过滤（匹配提交涉及的文件路径）
    #[arg(long, default_value = "")]
    pub file_name: String,

    /// 跳转页码（从 1 开始）
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,

    /// 展开指定提交的文件级明细
    #[arg(long, value_name = "COMMIT_ID")]
    pub expand: Option<String>,

    /// 显示按版本聚合的统计视图
    #[arg(long, default_value_t = false)]
    pub stats: bool,

    /// 调试输出
    #[arg(long, default_value_t = false)]
    pub debug: bool,
}
