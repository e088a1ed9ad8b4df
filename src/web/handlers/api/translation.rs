//! 翻译 API 处理器

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};

use crate::web::types::{ApiError, AppState, TranslateRequest, TranslateResponse};

/// 翻译文本
///
/// 请求体无法解析时同样先经过限流检查。
pub async fn translate_text(
    State(state): State<AppState>,
    payload: Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return Err(state.service.reject_malformed(rejection.body_text()).into());
        }
    };

    let outcome = state
        .service
        .translate(&request.text, &request.source, &request.target)
        .await?;

    Ok(Json(TranslateResponse {
        success: true,
        text: outcome.text,
        cached: outcome.cached,
    }))
}
