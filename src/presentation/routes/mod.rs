// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::dispatcher::RequestDispatcher;
use crate::presentation::handlers::{metrics_handler, scrape_handler};
use axum::{
    routing::{get, post},
    Extension, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// 创建应用路由
///
/// # 返回值
///
/// 返回未挂载依赖的路由
pub fn routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/version", get(version))
        .route("/metrics", get(metrics_handler::metrics))
        .route("/scrape", post(scrape_handler::scrape_jobs))
}

/// 创建完整的应用
///
/// 挂载请求追踪、CORS 以及处理器需要的依赖
pub fn app(dispatcher: Arc<RequestDispatcher>, metrics: PrometheusHandle) -> Router {
    routes()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(Extension(dispatcher))
        .layer(Extension(metrics))
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
