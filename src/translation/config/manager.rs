//! 简化的配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值。
//! 优先级：内置默认值 < 配置文件 < 环境变量。

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::env::{self, EnvVar};
use crate::translation::core::client::ProviderConfig;
use crate::translation::core::rate_limiter::RateLimiterConfig;
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::storage::cache::CacheConfig;

/// 翻译配置
///
/// 所有数值在交给核心组件之前都经过 [`TranslationConfig::validate`] 校验。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationConfig {
    // 服务提供方
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,

    // 缓存配置
    pub cache_ttl_secs: u64,
    pub cache_max_size: usize,
    pub cache_cleanup_interval_secs: u64,

    // 准入控制
    pub max_text_length: usize,
    pub rate_limit_rpm: u32,
    pub rate_limit_burst: u32,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: constants::DEFAULT_API_URL.to_string(),
            model: constants::DEFAULT_MODEL.to_string(),
            request_timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT.as_secs(),
            max_retries: constants::DEFAULT_MAX_RETRIES,

            cache_ttl_secs: constants::DEFAULT_CACHE_TTL.as_secs(),
            cache_max_size: constants::DEFAULT_CACHE_MAX_SIZE,
            cache_cleanup_interval_secs: constants::DEFAULT_CLEANUP_INTERVAL.as_secs(),

            max_text_length: constants::DEFAULT_MAX_TEXT_LENGTH,
            rate_limit_rpm: constants::DEFAULT_RATE_LIMIT_RPM,
            rate_limit_burst: constants::DEFAULT_RATE_LIMIT_BURST,
        }
    }
}

impl TranslationConfig {
    /// 创建带指定密钥的默认配置
    pub fn with_api_key(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            ..Self::default()
        }
    }

    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(TranslationError::ConfigError(format!(
                "{} 未设置",
                env::provider::ApiKey::NAME
            )));
        }

        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(TranslationError::ConfigError(format!(
                "API地址必须以 http:// 或 https:// 开头: {}",
                self.api_url
            )));
        }

        if self.model.trim().is_empty() {
            return Err(TranslationError::ConfigError("模型标识不能为空".to_string()));
        }

        if self.request_timeout_secs == 0 {
            return Err(TranslationError::ConfigError("请求超时必须大于0".to_string()));
        }

        if self.request_timeout_secs > constants::MAX_REQUEST_TIMEOUT_SECS {
            return Err(TranslationError::ConfigError(format!(
                "请求超时不能超过{}秒: {}",
                constants::MAX_REQUEST_TIMEOUT_SECS,
                self.request_timeout_secs
            )));
        }

        if self.max_retries > constants::MAX_RETRIES_LIMIT {
            return Err(TranslationError::ConfigError(format!(
                "重试次数不能超过{}: {}",
                constants::MAX_RETRIES_LIMIT,
                self.max_retries
            )));
        }

        if self.cache_max_size == 0 {
            return Err(TranslationError::ConfigError("缓存大小不能为0".to_string()));
        }

        if self.cache_ttl_secs == 0 {
            return Err(TranslationError::ConfigError("缓存TTL必须大于0".to_string()));
        }

        if self.cache_cleanup_interval_secs == 0 {
            return Err(TranslationError::ConfigError("缓存清理间隔必须大于0".to_string()));
        }

        if self.cache_cleanup_interval_secs > constants::MAX_CLEANUP_INTERVAL_SECS {
            return Err(TranslationError::ConfigError(format!(
                "缓存清理间隔不能超过{}秒: {}",
                constants::MAX_CLEANUP_INTERVAL_SECS,
                self.cache_cleanup_interval_secs
            )));
        }

        if self.max_text_length == 0 {
            return Err(TranslationError::ConfigError("最大文本长度不能为0".to_string()));
        }

        if self.rate_limit_rpm == 0 {
            return Err(TranslationError::ConfigError("每分钟请求数必须大于0".to_string()));
        }

        if self.rate_limit_burst == 0 {
            return Err(TranslationError::ConfigError("突发容量必须大于0".to_string()));
        }

        Ok(())
    }

    /// 应用环境变量覆盖
    ///
    /// 无法解析的值会记录警告并保留原值。
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{cache, limits, provider};

        if let Some(api_key) = env_value::<_, provider::ApiKey>() {
            self.api_key = api_key;
        }

        if let Some(api_url) = env_value::<_, provider::ApiUrl>() {
            tracing::info!("环境变量覆盖 API URL: {}", api_url);
            self.api_url = api_url;
        }

        if let Some(model) = env_value::<_, provider::Model>() {
            self.model = model;
        }

        if let Some(timeout) = env_value::<_, provider::RequestTimeout>() {
            self.request_timeout_secs = timeout.as_secs().max(1);
        }

        if let Some(retries) = env_value::<_, provider::MaxRetries>() {
            self.max_retries = retries;
        }

        if let Some(ttl) = env_value::<_, cache::Ttl>() {
            self.cache_ttl_secs = ttl.as_secs().max(1);
        }

        if let Some(size) = env_value::<_, cache::MaxSize>() {
            self.cache_max_size = size;
        }

        if let Some(interval) = env_value::<_, cache::CleanupInterval>() {
            self.cache_cleanup_interval_secs = interval.as_secs().max(1);
        }

        if let Some(max_len) = env_value::<_, limits::MaxTextLength>() {
            self.max_text_length = max_len;
        }

        if let Some(rpm) = env_value::<_, limits::RateLimitRpm>() {
            self.rate_limit_rpm = rpm;
        }

        if let Some(burst) = env_value::<_, limits::RateLimitBurst>() {
            self.rate_limit_burst = burst;
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cache_cleanup_interval_secs)
    }

    /// 令牌补充间隔：60秒 / 每分钟请求数
    pub fn rate_limit_interval(&self) -> Duration {
        Duration::from_secs(60) / self.rate_limit_rpm.max(1)
    }

    /// 转换为缓存配置
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            max_size: self.cache_max_size,
            ttl: self.cache_ttl(),
            cleanup_interval: self.cleanup_interval(),
        }
    }

    /// 转换为翻译服务提供方客户端配置
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            api_key: self.api_key.clone(),
            api_url: self.api_url.clone(),
            model: self.model.clone(),
            timeout: self.request_timeout(),
            max_retries: self.max_retries,
        }
    }

    /// 转换为限流器配置
    pub fn rate_limiter_config(&self) -> RateLimiterConfig {
        RateLimiterConfig {
            refill_interval: self.rate_limit_interval(),
            burst: self.rate_limit_burst,
        }
    }
}

/// 读取已设置的环境变量，解析失败时记录警告并忽略
fn env_value<T, V: EnvVar<T>>() -> Option<T> {
    match V::get_set() {
        Some(Ok(value)) => Some(value),
        Some(Err(e)) => {
            tracing::warn!("忽略无效的环境变量，保留默认值: {}", e);
            None
        }
        None => None,
    }
}

/// 配置管理器
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: TranslationConfig,
}

impl ConfigManager {
    /// 按 .env → 配置文件 → 环境变量 的顺序加载并校验配置
    pub fn new() -> TranslationResult<Self> {
        Self::load_dotenv();

        let mut config = Self::load_config()?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config })
    }

    /// 从指定配置文件加载，环境变量仍然可以覆盖文件中的值
    pub fn from_file(path: &str) -> TranslationResult<Self> {
        Self::load_dotenv();

        let expanded_path = shellexpand::tilde(path);
        tracing::info!("加载配置文件: {}", expanded_path);
        let mut config = Self::load_from_file(expanded_path.as_ref())?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config })
    }

    /// 使用现成配置创建（仍然会校验）
    pub fn from_config(config: TranslationConfig) -> TranslationResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// 获取配置
    pub fn get_config(&self) -> &TranslationConfig {
        &self.config
    }

    pub fn into_config(self) -> TranslationConfig {
        self.config
    }

    /// 查找并加载配置文件
    fn load_config() -> TranslationResult<TranslationConfig> {
        if let Some(path) = env::core::ConfigPath::get_set() {
            let path = path?;
            let expanded_path = shellexpand::tilde(&path);
            tracing::info!("加载配置文件: {}", expanded_path);
            return Self::load_from_file(expanded_path.as_ref());
        }

        for path in constants::CONFIG_PATHS {
            let expanded_path = shellexpand::tilde(path);
            if Path::new(expanded_path.as_ref()).exists() {
                tracing::info!("加载配置文件: {}", expanded_path);
                return Self::load_from_file(expanded_path.as_ref());
            }
        }

        tracing::info!("未找到配置文件，使用默认配置");
        Ok(TranslationConfig::default())
    }

    /// 从指定文件加载配置
    pub fn load_from_file(path: &str) -> TranslationResult<TranslationConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TranslationError::ConfigError(format!("读取配置文件失败 {}: {}", path, e)))?;

        if path.ends_with(".toml") {
            Ok(toml::from_str(&content)?)
        } else {
            Ok(serde_json::from_str(&content)?)
        }
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        for env_file in constants::ENV_FILES {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::info!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: &str) -> TranslationResult<()> {
        let config = TranslationConfig::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| TranslationError::ConfigError(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| TranslationError::ConfigError(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}
