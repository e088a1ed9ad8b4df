//! # Doubao Translator
//!
//! 豆包翻译 API 的请求前端：把任意长度的文本分块翻译后重新拼接，
//! 并缓存最终结果，重复请求不再调用提供方。
//!
//! ## 模块组织
//!
//! - `env` - 类型化的环境变量读取
//! - `translation` - 缓存、分块、限流与请求编排
//! - `web` - HTTP 服务（`web` 特性）

pub mod env;
pub mod translation;
#[cfg(feature = "web")]
pub mod web;

pub use translation::{TranslationConfig, TranslationError, TranslationResult, TranslationService};
