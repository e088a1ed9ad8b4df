//! 翻译配置管理模块
//!
//! 提供简化的配置管理，支持环境变量、配置文件和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{ConfigManager, TranslationConfig};

/// 配置常量
pub mod constants {
    use std::time::Duration;

    // 分块相关
    /// 单个分块的最大字符数，与请求长度上限无关，不对外开放配置
    pub const CHUNK_SIZE: usize = 800;
    pub const PARAGRAPH_SEPARATOR: &str = "\n\n";
    pub const CHUNK_JOINER: &str = "\n";

    // 默认API设置
    pub const DEFAULT_API_URL: &str = "https://ark.cn-beijing.volces.com/api/v3/responses";
    pub const DEFAULT_MODEL: &str = "doubao-seed-translation-250915";
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_MAX_RETRIES: u32 = 0;
    pub const RETRY_BASE_DELAY: Duration = Duration::from_millis(200);
    pub const MAX_RETRIES_LIMIT: u32 = 10;
    pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;

    // 准入控制
    pub const DEFAULT_MAX_TEXT_LENGTH: usize = 5000;
    pub const DEFAULT_RATE_LIMIT_RPM: u32 = 30;
    pub const DEFAULT_RATE_LIMIT_BURST: u32 = 30;

    // 缓存设置
    pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600); // 1小时
    pub const DEFAULT_CACHE_MAX_SIZE: usize = 1000;
    pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(600);
    pub const MAX_CLEANUP_INTERVAL_SECS: u64 = 86_400;

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "translator.toml",
        "config.toml",
        "~/.config/doubao-translator/config.toml",
    ];

    // 按优先级加载的 .env 文件
    pub const ENV_FILES: &[&str] = &[".env.local", ".env"];
}
