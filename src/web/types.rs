//! Web 模块的数据类型定义

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use crate::translation::{
    CacheStats, ErrorCategory, HealthLevel, TranslationError, TranslationService,
};

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TranslationService>,
}

impl AppState {
    pub fn new(service: Arc<TranslationService>) -> Self {
        Self { service }
    }
}

/// 翻译请求
#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    /// 源语言，缺省或为空时由提供方自动检测
    #[serde(default)]
    pub source: String,
    pub target: String,
}

/// 翻译响应
#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub success: bool,
    pub text: String,
    pub cached: bool,
}

/// 错误响应
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// 支持的语言列表
#[derive(Debug, Serialize, Deserialize)]
pub struct LanguagesResponse {
    pub success: bool,
    pub languages: BTreeMap<String, String>,
}

/// 健康检查响应
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthLevel,
    /// Unix 时间戳（秒）
    pub time: i64,
    pub components: HashMap<String, HealthLevel>,
}

/// 缓存统计响应
#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    pub success: bool,
    #[serde(flatten)]
    pub stats: CacheStats,
    pub hit_rate: f64,
}

/// API 错误，按错误类别映射 HTTP 状态码
#[derive(Debug)]
pub struct ApiError(pub TranslationError);

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self.0.category() {
            ErrorCategory::RateLimit => StatusCode::TOO_MANY_REQUESTS,
            ErrorCategory::Input => StatusCode::BAD_REQUEST,
            ErrorCategory::Upstream => StatusCode::BAD_GATEWAY,
            ErrorCategory::Configuration | ErrorCategory::Cache | ErrorCategory::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<TranslationError> for ApiError {
    fn from(error: TranslationError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            success: false,
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
