//! 翻译服务提供方客户端
//!
//! 定义按分块调用的 [`TranslationProvider`] 接口，以及基于 reqwest 的豆包 API 实现。
//! 响应解析是独立的纯函数，两种响应格式用 [`ProviderResponse`] 表示。

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::translation::config::constants;
use crate::translation::error::{TranslationError, TranslationResult};

// ============================================================================
// 错误类型
// ============================================================================

/// 提供方调用错误
///
/// 保留区分细节用于日志，在服务边界统一转换为 [`TranslationError::ProviderFailure`]。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("网络请求失败: {0}")]
    Network(String),

    #[error("请求超时: {0}")]
    Timeout(String),

    #[error("API错误: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("无法解析API响应: {0}")]
    Parse(String),

    #[error("构造请求失败: {0}")]
    Request(String),
}

impl ProviderError {
    /// 网络错误、超时、5xx 与 429 可以重试
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Network(_) | ProviderError::Timeout(_) => true,
            ProviderError::Status { status, .. } => *status >= 500 || *status == 429,
            ProviderError::Parse(_) | ProviderError::Request(_) => false,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ProviderError::Timeout(error.to_string())
        } else if error.is_builder() {
            ProviderError::Request(error.to_string())
        } else {
            ProviderError::Network(error.to_string())
        }
    }
}

impl From<ProviderError> for TranslationError {
    fn from(error: ProviderError) -> Self {
        TranslationError::ProviderFailure(error.to_string())
    }
}

// ============================================================================
// 提供方接口
// ============================================================================

/// 翻译服务提供方
///
/// 给定一段文本、可为空的源语言和目标语言，返回译文或失败。
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    async fn translate_chunk(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, ProviderError>;
}

// ============================================================================
// 请求格式
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ProviderRequest<'a> {
    pub model: &'a str,
    pub input: Vec<InputMessage<'a>>,
}

#[derive(Debug, Serialize)]
pub struct InputMessage<'a> {
    pub role: &'static str,
    pub content: Vec<InputContent<'a>>,
}

#[derive(Debug, Serialize)]
pub struct InputContent<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: &'a str,
    pub translation_options: TranslationOptions<'a>,
}

#[derive(Debug, Serialize)]
pub struct TranslationOptions<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_language: Option<&'a str>,
    pub target_language: &'a str,
}

impl<'a> ProviderRequest<'a> {
    /// 构造单分块翻译请求，源语言为空时省略 `source_language`
    pub fn new(model: &'a str, text: &'a str, source_lang: &'a str, target_lang: &'a str) -> Self {
        let source_language = (!source_lang.is_empty()).then_some(source_lang);

        Self {
            model,
            input: vec![InputMessage {
                role: "user",
                content: vec![InputContent {
                    kind: "input_text",
                    text,
                    translation_options: TranslationOptions {
                        source_language,
                        target_language: target_lang,
                    },
                }],
            }],
        }
    }
}

// ============================================================================
// 响应格式
// ============================================================================

/// 结构化输出格式（`status == "completed"`）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompletedResponse {
    pub status: String,
    pub output: Vec<OutputItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub role: String,
    pub content: Vec<OutputContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// 旧版 `choices[0].message.content` 格式
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LegacyResponse {
    pub choices: Vec<LegacyChoice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LegacyChoice {
    pub message: LegacyMessage,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LegacyMessage {
    pub content: String,
}

/// 提供方响应，两种格式之一
#[derive(Debug, Clone)]
pub enum ProviderResponse {
    Completed(CompletedResponse),
    Legacy(LegacyResponse),
}

impl ProviderResponse {
    /// 解析响应体
    ///
    /// 先尝试结构化格式，只有在带有完成标记时才采用；否则回退到旧版格式，
    /// 旧版格式需要至少一个 choice。
    pub fn parse(body: &str) -> Result<Self, ProviderError> {
        if let Ok(completed) = serde_json::from_str::<CompletedResponse>(body) {
            if completed.status == "completed" {
                return Ok(ProviderResponse::Completed(completed));
            }
        }

        match serde_json::from_str::<LegacyResponse>(body) {
            Ok(legacy) if !legacy.choices.is_empty() => Ok(ProviderResponse::Legacy(legacy)),
            Ok(_) => Err(ProviderError::Parse("响应中没有可用的译文".to_string())),
            Err(e) => Err(ProviderError::Parse(e.to_string())),
        }
    }

    /// 提取译文
    ///
    /// 结构化格式取第一个 assistant 消息中的第一个 `output_text`，
    /// 没有时报错，不会再回退到旧版格式。
    pub fn into_text(self) -> Result<String, ProviderError> {
        match self {
            ProviderResponse::Completed(completed) => completed
                .output
                .into_iter()
                .filter(|item| item.kind == "message" && item.role == "assistant")
                .flat_map(|item| item.content)
                .find(|content| content.kind == "output_text")
                .map(|content| content.text)
                .ok_or_else(|| ProviderError::Parse("响应中没有 output_text".to_string())),
            ProviderResponse::Legacy(legacy) => legacy
                .choices
                .into_iter()
                .next()
                .map(|choice| choice.message.content)
                .ok_or_else(|| ProviderError::Parse("响应中没有 choices".to_string())),
        }
    }
}

/// 从响应体中提取译文
pub fn parse_response_text(body: &str) -> Result<String, ProviderError> {
    ProviderResponse::parse(body)?.into_text()
}

// ============================================================================
// 豆包客户端
// ============================================================================

/// 客户端配置
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    /// 单次 HTTP 请求超时
    pub timeout: Duration,
    /// 可重试错误的最大重试次数，0 表示不重试
    pub max_retries: u32,
}

impl ProviderConfig {
    pub fn new(api_key: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: api_url.into(),
            model: constants::DEFAULT_MODEL.to_string(),
            timeout: constants::DEFAULT_REQUEST_TIMEOUT,
            max_retries: constants::DEFAULT_MAX_RETRIES,
        }
    }
}

/// 豆包翻译 API 客户端
#[derive(Debug, Clone)]
pub struct DoubaoClient {
    config: ProviderConfig,
    http: reqwest::Client,
}

impl DoubaoClient {
    pub fn new(config: ProviderConfig) -> TranslationResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TranslationError::ConfigError(format!("创建HTTP客户端失败: {}", e)))?;

        tracing::info!(
            "翻译客户端已初始化: url={}, model={}, timeout={:?}",
            config.api_url,
            config.model,
            config.timeout
        );

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    async fn send_once(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, ProviderError> {
        let request = ProviderRequest::new(&self.config.model, text, source_lang, target_lang);

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != reqwest::StatusCode::OK {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_response_text(&body)
    }
}

#[async_trait]
impl TranslationProvider for DoubaoClient {
    async fn translate_chunk(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, ProviderError> {
        let mut attempt = 0;

        loop {
            match self.send_once(text, source_lang, target_lang).await {
                Ok(translated) => return Ok(translated),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = constants::RETRY_BASE_DELAY * 2u32.saturating_pow(attempt);
                    attempt += 1;
                    tracing::warn!(
                        "翻译请求失败，{:?} 后重试 ({}/{}): {}",
                        delay,
                        attempt,
                        self.config.max_retries,
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
