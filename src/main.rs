// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use jobcrawlrs::config::settings::Settings;
use jobcrawlrs::domain::services::dispatcher::RequestDispatcher;
use jobcrawlrs::domain::services::extractor::IndeedExtractor;
use jobcrawlrs::domain::services::identity_provider::RandomUserAgentProvider;
use jobcrawlrs::engines::chromium_renderer::ChromiumRenderer;
use jobcrawlrs::engines::traits::Renderer;
use jobcrawlrs::infrastructure::metrics::init_metrics;
use jobcrawlrs::infrastructure::snapshot_store::LocalSnapshotStore;
use jobcrawlrs::presentation::routes;
use jobcrawlrs::utils::telemetry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    let settings = Arc::new(Settings::new()?);

    // 2. Initialize logging
    telemetry::init_telemetry(&settings.logging)?;
    info!("Starting jobcrawlrs...");

    // 3. Initialize Prometheus metrics
    let metrics = init_metrics()?;

    // 4. Launch browser
    let renderer = Arc::new(ChromiumRenderer::launch(&settings.browser).await?);
    info!(engine = renderer.name(), "Browser ready");

    // 5. Initialize components
    let dispatcher = RequestDispatcher::from_settings(
        &settings,
        renderer.clone(),
        Arc::new(RandomUserAgentProvider::new()),
        Arc::new(IndeedExtractor::new()?),
        Arc::new(LocalSnapshotStore::new(&settings.diagnostics.snapshot_dir)),
    )?;
    info!(
        detail_concurrency = dispatcher.detail_gate().capacity(),
        country_concurrency = dispatcher.country_gate().capacity(),
        "Dispatcher initialized"
    );

    // 6. Start HTTP server
    let app = routes::app(Arc::new(dispatcher), metrics);
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // 7. Close browser
    match Arc::try_unwrap(renderer) {
        Ok(renderer) => renderer.shutdown().await,
        Err(_) => warn!("Browser still in use at shutdown, leaving it to the OS"),
    }
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
