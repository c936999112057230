//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了开关服务的HTTP接口。

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use crate::error::Result;
use crate::manager::FlagService;
use axum::routing::get;
use axum::Router;
use tracing::info;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/flags",
            get(handlers::list_flags).post(handlers::save_flag),
        )
        .route(
            "/flags/{key}",
            get(handlers::get_flag).delete(handlers::delete_flag),
        )
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
}

/// 启动HTTP服务，收到 Ctrl+C 后优雅退出
pub async fn serve(bind: &str, service: &FlagService) -> Result<()> {
    let router = build_router(AppState::from(service));
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
