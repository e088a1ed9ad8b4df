//! 翻译模块统一错误处理
//!
//! 提供结构化错误类型和错误处理机制

use std::fmt;

use thiserror::Error;

use crate::env::EnvError;

/// 翻译错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    /// 配置错误（构造阶段致命，不会出现在单个请求中）
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 速率限制错误
    #[error("请求过于频繁，请稍后再试")]
    RateLimitExceeded,

    /// 输入文本超过长度上限
    #[error("文本长度超过限制（最大{max}字符，实际{length}字符）")]
    InputTooLarge { length: usize, max: usize },

    /// 输入验证错误
    #[error("输入无效: {0}")]
    InvalidInput(String),

    /// 翻译服务提供方错误（网络、非200状态、无法解析的响应）
    #[error("翻译失败: {0}")]
    ProviderFailure(String),

    /// 缓存已满，新结果不会被缓存
    #[error("缓存已满（最大容量: {max_size}）")]
    CacheFull { max_size: usize },

    /// 超时错误
    #[error("操作超时: {0}")]
    TimeoutError(String),

    /// 内部错误
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl TranslationError {
    /// 检查错误是否可重试
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslationError::ProviderFailure(_) => true,
            TranslationError::TimeoutError(_) => true,
            TranslationError::RateLimitExceeded => false, // 需要等待
            TranslationError::CacheFull { .. } => false,
            TranslationError::ConfigError(_) => false,
            TranslationError::InputTooLarge { .. } => false,
            TranslationError::InvalidInput(_) => false,
            TranslationError::InternalError(_) => false,
        }
    }

    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TranslationError::ConfigError(_) => ErrorSeverity::Critical,
            TranslationError::RateLimitExceeded => ErrorSeverity::Warning,
            TranslationError::InputTooLarge { .. } => ErrorSeverity::Info,
            TranslationError::InvalidInput(_) => ErrorSeverity::Info,
            TranslationError::ProviderFailure(_) => ErrorSeverity::Error,
            TranslationError::CacheFull { .. } => ErrorSeverity::Warning,
            TranslationError::TimeoutError(_) => ErrorSeverity::Warning,
            TranslationError::InternalError(_) => ErrorSeverity::Critical,
        }
    }

    /// 获取错误类别
    ///
    /// 类别决定调用方看到的状态分类：限流、输入错误或上游失败。
    pub fn category(&self) -> ErrorCategory {
        match self {
            TranslationError::ConfigError(_) => ErrorCategory::Configuration,
            TranslationError::RateLimitExceeded => ErrorCategory::RateLimit,
            TranslationError::InputTooLarge { .. } => ErrorCategory::Input,
            TranslationError::InvalidInput(_) => ErrorCategory::Input,
            TranslationError::ProviderFailure(_) => ErrorCategory::Upstream,
            TranslationError::TimeoutError(_) => ErrorCategory::Upstream,
            TranslationError::CacheFull { .. } => ErrorCategory::Cache,
            TranslationError::InternalError(_) => ErrorCategory::Internal,
        }
    }

    /// 创建带上下文的错误
    pub fn with_context<T: fmt::Display>(mut self, context: T) -> Self {
        let current_msg = match &self {
            TranslationError::ConfigError(msg)
            | TranslationError::InvalidInput(msg)
            | TranslationError::ProviderFailure(msg)
            | TranslationError::TimeoutError(msg)
            | TranslationError::InternalError(msg) => Some(msg.clone()),
            // 结构化变体不携带自由文本
            _ => None,
        };
        let Some(current_msg) = current_msg else {
            return self;
        };
        let new_msg = format!("{} (上下文: {})", current_msg, context);

        match &mut self {
            TranslationError::ConfigError(msg)
            | TranslationError::InvalidInput(msg)
            | TranslationError::ProviderFailure(msg)
            | TranslationError::TimeoutError(msg)
            | TranslationError::InternalError(msg) => *msg = new_msg,
            _ => {}
        }

        self
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    RateLimit,
    Input,
    Upstream,
    Cache,
    Internal,
}

impl From<EnvError> for TranslationError {
    fn from(error: EnvError) -> Self {
        TranslationError::ConfigError(error.to_string())
    }
}

impl From<std::io::Error> for TranslationError {
    fn from(error: std::io::Error) -> Self {
        TranslationError::InternalError(format!("IO错误: {}", error))
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::ConfigError(format!("JSON解析错误: {}", error))
    }
}

impl From<toml::de::Error> for TranslationError {
    fn from(error: toml::de::Error) -> Self {
        TranslationError::ConfigError(format!("TOML解析错误: {}", error))
    }
}

impl From<tokio::time::error::Elapsed> for TranslationError {
    fn from(error: tokio::time::error::Elapsed) -> Self {
        TranslationError::TimeoutError(format!("异步操作超时: {}", error))
    }
}

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;

/// 错误处理助手函数
pub mod helpers {
    use super::*;

    /// 记录并返回错误
    pub fn log_error<T>(error: TranslationError) -> TranslationResult<T> {
        match error.severity() {
            ErrorSeverity::Info => tracing::info!("翻译信息: {}", error),
            ErrorSeverity::Warning => tracing::warn!("翻译警告: {}", error),
            ErrorSeverity::Error => tracing::error!("翻译错误: {}", error),
            ErrorSeverity::Critical => tracing::error!("翻译严重错误: {}", error),
        }

        Err(error)
    }

    /// 创建配置错误
    pub fn config_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::ConfigError(msg.to_string())
    }

    /// 创建输入验证错误
    pub fn validation_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::InvalidInput(msg.to_string())
    }

    /// 创建上游服务错误
    pub fn provider_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::ProviderFailure(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_classification() {
        assert_eq!(
            TranslationError::RateLimitExceeded.category(),
            ErrorCategory::RateLimit
        );
        assert_eq!(
            TranslationError::InputTooLarge { length: 10, max: 5 }.category(),
            ErrorCategory::Input
        );
        assert_eq!(
            TranslationError::ProviderFailure("502".into()).category(),
            ErrorCategory::Upstream
        );
        assert_eq!(
            TranslationError::TimeoutError("30s".into()).category(),
            ErrorCategory::Upstream
        );
        assert_eq!(
            TranslationError::CacheFull { max_size: 2 }.category(),
            ErrorCategory::Cache
        );
    }

    #[test]
    fn test_messages_are_human_readable() {
        let err = TranslationError::InputTooLarge { length: 6000, max: 5000 };
        assert!(err.to_string().contains("5000"));

        let err = TranslationError::CacheFull { max_size: 2 };
        assert!(err.to_string().contains('2'));
    }

    #[test]
    fn test_with_context() {
        let err = helpers::provider_error("HTTP 500").with_context("chunk 2");
        assert_eq!(
            err,
            TranslationError::ProviderFailure("HTTP 500 (上下文: chunk 2)".to_string())
        );

        // 结构化变体保持不变
        let err = TranslationError::RateLimitExceeded.with_context("ignored");
        assert_eq!(err, TranslationError::RateLimitExceeded);
    }

    #[test]
    fn test_retryable() {
        assert!(TranslationError::ProviderFailure("x".into()).is_retryable());
        assert!(!TranslationError::RateLimitExceeded.is_retryable());
        assert!(!TranslationError::InvalidInput("x".into()).is_retryable());
    }
}
