//! Web 路由定义

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::web::{handlers::*, types::AppState, WebConfig};

/// 创建 API 路由
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/api/translate", post(translate_text))
        .route("/api/languages", get(get_languages))
        .route("/api/health", get(health_check))
        .route("/api/cache/stats", get(get_cache_stats))
        .route("/api/cache/clear", post(clear_cache))
}

/// 创建完整的应用路由：API、主页、静态文件与 CORS
pub fn create_router(app_state: AppState, config: &WebConfig) -> Router {
    let index_page = Router::new()
        .route("/", get(index))
        .with_state(config.clone());

    let mut app = create_routes().with_state(app_state).merge(index_page);

    if let Some(static_dir) = &config.static_dir {
        app = app.nest_service("/static", ServeDir::new(static_dir));
    }

    app.layer(CorsLayer::permissive())
}
