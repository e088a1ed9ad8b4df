//! 缓存相关API处理器

use axum::{extract::State, response::Json};

use crate::web::types::{AppState, CacheStatsResponse};

/// 获取缓存统计信息
pub async fn get_cache_stats(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    let stats = state.service.cache().stats();
    let hit_rate = stats.hit_rate();
    Json(CacheStatsResponse {
        success: true,
        stats,
        hit_rate,
    })
}

/// 清空缓存
pub async fn clear_cache(State(state): State<AppState>) -> Json<serde_json::Value> {
    let cache = state.service.cache();
    let cleared = cache.size();
    cache.clear();

    tracing::info!("已清空缓存，删除 {} 个条目", cleared);
    Json(serde_json::json!({
        "success": true,
        "message": format!("成功清理 {} 个缓存条目", cleared),
        "deleted_count": cleared
    }))
}
