//! 翻译模块
//!
//! 翻译请求前端的全部核心逻辑：
//! - **core**: 请求编排服务、提供方客户端、限流器
//! - **pipeline**: 文本分块
//! - **storage**: 翻译结果缓存
//! - **config**: 配置管理
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use doubao_translator::translation::{ConfigManager, TranslationService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigManager::new()?.into_config();
//! let service = TranslationService::from_config(&config)?;
//!
//! let outcome = service.translate("Hello, world", "en", "zh").await?;
//! println!("{} (cached: {})", outcome.text, outcome.cached);
//!
//! service.shutdown().await;
//! # Ok(())
//! # }
//! ```

/// 配置管理模块
pub mod config;

/// 核心翻译服务模块
pub mod core;

/// 错误处理模块
pub mod error;

/// 文本处理管道模块
pub mod pipeline;

/// 存储管理模块
pub mod storage;

pub use config::{constants, ConfigManager, TranslationConfig};

pub use core::{
    DoubaoClient, HealthLevel, HealthStatus, ProviderConfig, ProviderError, RateLimiter,
    RateLimiterConfig, ServiceOptions, ServiceStats, TranslationOutcome, TranslationProvider,
    TranslationService,
};

pub use error::{ErrorCategory, ErrorSeverity, TranslationError, TranslationResult};

pub use pipeline::split_text;

pub use storage::{cache_key, CacheConfig, CacheEntry, CacheStats, TranslationCache};
