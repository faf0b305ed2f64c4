use std::env;
use std::path::PathBuf;

/// 运行配置；默认值 → .env 文件 → 环境变量 → 命令行参数逐层覆盖
#[derive(Debug, Clone)]
pub struct Config {
    /// 本地数据集目录
    pub data_dir: PathBuf,
    /// 数据集基础 URL；设置后改走 HTTP 拉取
    pub data_base_url: Option<String>,
    pub debug: bool,
}

impl Config {
    pub fn new() -> Self {
        let mut config = Config {
            data_dir: PathBuf::from("./data"),
            data_base_url: None,
            debug: false,
        };

        // 加载配置文件
        #[cfg(not(test))]
        config.load_from_env_file();
        // 加载环境变量（覆盖配置文件）
        config.load_from_env();

        config
    }

    pub fn load_from_env_file(&mut self) {
        // 尝试从用户主目录加载
        if let Ok(home) = env::var("HOME") {
            let user_env_path = PathBuf::from(format!("{}/.patch-explorer/.env", home));
            if user_env_path.exists() {
                dotenvy::from_path(user_env_path).ok();
            }
        }

        // 尝试从当前目录加载
        dotenvy::dotenv().ok();
    }

    pub fn load_from_env(&mut self) {
        if let Ok(dir) = env::var("PATCH_EXPLORER_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Ok(url) = env::var("PATCH_EXPLORER_DATA_URL") {
            self.data_base_url = Some(url);
        }
        if let Ok(debug) = env::var("PATCH_EXPLORER_DEBUG") {
            self.debug = debug == "1" || debug.eq_ignore_ascii_case("true");
        }
    }

    pub fn update_from_args(&mut self, args: &crate::cli::args::Args) {
        // 命令行参数优先级最高
        if !args.data_dir.is_empty() {
            self.data_dir = PathBuf::from(&args.data_dir);
        }
        if !args.data_url.is_empty() {
            self.data_base_url = Some(args.data_url.clone());
        }
        if args.debug {
            self.debug = true;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(base_url) = &self.data_base_url {
            url::Url::parse(base_url)
                .map_err(|e| anyhow::anyhow!("Invalid dataset base URL '{}': {}", base_url, e))?;
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
