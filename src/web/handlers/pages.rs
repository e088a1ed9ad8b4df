//! 页面处理器

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::web::WebConfig;

/// 主页处理器，返回静态目录中的 index.html
pub async fn index(State(config): State<WebConfig>) -> Response {
    let Some(static_dir) = config.static_dir else {
        return (StatusCode::NOT_FOUND, "未配置静态文件目录").into_response();
    };

    match tokio::fs::read_to_string(static_dir.join("index.html")).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::debug!("读取 index.html 失败: {}", e);
            (StatusCode::NOT_FOUND, "index.html 不存在").into_response()
        }
    }
}
