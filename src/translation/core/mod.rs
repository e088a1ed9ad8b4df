//! 翻译系统核心模块
//!
//! - **服务层** (`service.rs`): 单个翻译请求的编排，统计与健康检查
//! - **客户端** (`client.rs`): 提供方接口与豆包 API 客户端
//! - **限流器** (`rate_limiter.rs`): 进程级令牌桶
//!
//! ```text
//! TranslationService (service.rs)
//!     ├── RateLimiter (rate_limiter.rs)
//!     ├── TranslationCache (storage/cache.rs)
//!     ├── split_text (pipeline/chunker.rs)
//!     └── TranslationProvider (client.rs)
//!             └── DoubaoClient
//! ```

pub mod client;
pub mod rate_limiter;
pub mod service;

pub use client::{
    parse_response_text, DoubaoClient, ProviderConfig, ProviderError, ProviderResponse,
    TranslationProvider,
};
pub use rate_limiter::{RateLimiter, RateLimiterConfig};

/// 统一翻译服务，对外的主要入口
pub use service::TranslationService;

pub use service::{
    HealthLevel, HealthStatus, ServiceOptions, ServiceStats, ServiceStatsSnapshot,
    TranslationOutcome,
};
