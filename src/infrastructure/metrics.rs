// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// 初始化指标系统
///
/// 安装全局 Prometheus recorder 并注册指标说明，返回的句柄由 `/metrics` 路由渲染
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_metrics();
    info!("Prometheus recorder installed");
    Ok(handle)
}

fn describe_metrics() {
    describe_counter!("scrape_requests_total", "Total number of accepted scrape requests");
    describe_counter!(
        "scrape_pages_visited_total",
        "Total number of results pages fully processed"
    );
    describe_counter!("detail_fetches_total", "Total number of job detail fetches");
    describe_counter!(
        "detail_fetch_failures_total",
        "Total number of job detail fetches that produced a placeholder record"
    );
    describe_counter!(
        "country_runs_total",
        "Total number of country runs, labelled by termination status"
    );
    describe_histogram!(
        "scrape_duration_seconds",
        "Wall-clock duration of scrape requests in seconds"
    );
}
