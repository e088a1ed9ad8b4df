//! 语言列表与健康检查

use std::collections::BTreeMap;

use axum::{extract::State, response::Json};

use crate::web::types::{AppState, HealthResponse, LanguagesResponse};

/// 支持的语言代码及显示名称
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("zh", "中文（简体）"),
    ("zh-Hant", "中文（繁体）"),
    ("en", "英语"),
    ("ja", "日语"),
    ("ko", "韩语"),
    ("de", "德语"),
    ("fr", "法语"),
    ("es", "西班牙语"),
    ("it", "意大利语"),
    ("pt", "葡萄牙语"),
    ("ru", "俄语"),
    ("th", "泰语"),
    ("vi", "越南语"),
    ("ar", "阿拉伯语"),
];

pub async fn get_languages() -> Json<LanguagesResponse> {
    let languages: BTreeMap<String, String> = SUPPORTED_LANGUAGES
        .iter()
        .map(|(code, name)| (code.to_string(), name.to_string()))
        .collect();

    Json(LanguagesResponse {
        success: true,
        languages,
    })
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let health = state.service.get_health();

    Json(HealthResponse {
        status: health.overall,
        time: chrono::Utc::now().timestamp(),
        components: health.components,
    })
}
