// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use axum_test::TestServer;
use jobcrawlrs::config::settings::Settings;
use jobcrawlrs::domain::services::dispatcher::RequestDispatcher;
use jobcrawlrs::domain::services::extractor::IndeedExtractor;
use jobcrawlrs::domain::services::identity_provider::FixedIdentity;
use jobcrawlrs::engines::stub_renderer::StubRenderer;
use jobcrawlrs::engines::traits::{EngineError, RenderContext, Renderer};
use jobcrawlrs::infrastructure::snapshot_store::InMemorySnapshotStore;
use jobcrawlrs::presentation::routes;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;

pub struct TestApp {
    pub server: TestServer,
    pub renderer: Arc<StubRenderer>,
    pub snapshots: Arc<InMemorySnapshotStore>,
}

/// 渲染引擎在打开上下文时崩溃
pub struct PanickingRenderer;

#[async_trait]
impl Renderer for PanickingRenderer {
    async fn open_context(&self, _identity: &str) -> Result<Box<dyn RenderContext>, EngineError> {
        panic!("renderer crashed");
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}

/// 内置默认配置，去掉所有随机延迟并缩短超时
pub fn test_settings() -> Settings {
    let mut settings = Settings::defaults().expect("default settings");
    settings.scraper.navigation_timeout_ms = 1_000;
    settings.scraper.listing_marker_timeout_ms = 1_000;
    settings.scraper.detail_marker_timeout_ms = 1_000;
    settings.scraper.page_delay_min_ms = 0;
    settings.scraper.page_delay_max_ms = 0;
    settings.scraper.detail_delay_min_ms = 0;
    settings.scraper.detail_delay_max_ms = 0;
    settings
}

pub fn create_test_app() -> TestApp {
    let renderer = Arc::new(StubRenderer::new());
    let snapshots = Arc::new(InMemorySnapshotStore::new());
    let server = create_server(renderer.clone(), snapshots.clone());

    TestApp {
        server,
        renderer,
        snapshots,
    }
}

pub fn create_server(
    renderer: Arc<dyn Renderer>,
    snapshots: Arc<InMemorySnapshotStore>,
) -> TestServer {
    let dispatcher = RequestDispatcher::from_settings(
        &test_settings(),
        renderer,
        Arc::new(FixedIdentity("integration-test".to_string())),
        Arc::new(IndeedExtractor::new().expect("selectors")),
        snapshots,
    )
    .expect("dispatcher");
    let metrics = PrometheusBuilder::new().build_recorder().handle();

    TestServer::new(routes::app(Arc::new(dispatcher), metrics)).expect("test server")
}
