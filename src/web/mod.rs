//! Web 服务器模块
//!
//! 通过 HTTP 提供翻译、语言列表、健康检查与缓存管理接口

pub mod config;
pub mod handlers;
pub mod routes;
pub mod types;

pub use config::*;
pub use handlers::*;
pub use routes::*;
pub use types::*;

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::translation::{TranslationResult, TranslationService};

/// Web 服务器
pub struct WebServer {
    config: WebConfig,
    service: Arc<TranslationService>,
}

impl WebServer {
    /// 创建新的 Web 服务器
    pub fn new(config: WebConfig, service: Arc<TranslationService>) -> Self {
        Self { config, service }
    }

    /// 启动 Web 服务器，收到 Ctrl-C 后优雅退出
    pub async fn start(&self) -> TranslationResult<()> {
        let listener = TcpListener::bind(self.config.listen_address()).await?;
        tracing::info!("Web 服务器启动于 http://{}", self.config.listen_address());

        self.serve(listener, shutdown_signal()).await
    }

    /// 在给定的监听器上提供服务，直到 `shutdown` 完成
    ///
    /// 服务器停止接收请求后关闭翻译服务的后台任务。
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> TranslationResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = create_router(AppState::new(Arc::clone(&self.service)), &self.config);

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;

        self.service.shutdown().await;
        result?;

        tracing::info!("Web 服务器已停止");
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("收到退出信号，开始关闭"),
        Err(e) => tracing::error!("无法监听退出信号: {}", e),
    }
}
