// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::Settings;
use crate::domain::models::job::{AggregateReport, ScrapeRequest};
use crate::domain::repositories::snapshot_repository::SnapshotRepository;
use crate::domain::services::admission_gate::{AdmissionGate, GateError};
use crate::domain::services::country_scraper::{CountryScraper, PaginationOptions};
use crate::domain::services::detail_fetcher::{DetailFetchOptions, DetailFetcher};
use crate::domain::services::extractor::SiteExtractor;
use crate::domain::services::identity_provider::IdentityProvider;
use crate::domain::services::search_url::SearchUrlBuilder;
use crate::engines::traits::Renderer;
use futures::stream::{FuturesUnordered, StreamExt};
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info, info_span, Instrument};

/// 请求分发错误类型
#[derive(Error, Debug)]
pub enum DispatchError {
    /// 请求缺少必填参数
    #[error("Validation error: {0}")]
    Validation(String),
    /// 其他意外错误
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// 抓取请求分发器
///
/// 校验请求后为每个国家启动一个任务，任务先经过国家闸门再开始分页抓取。
/// 国家闸门与详情闸门相互独立：国家任务持有的许可不会占用详情抓取的名额。
///
/// 国家任务与调用方解耦：调用方放弃等待（例如客户端断开）时任务继续运行到结束，
/// 渲染上下文照常关闭。
pub struct RequestDispatcher {
    scraper: Arc<CountryScraper>,
    country_gate: AdmissionGate,
}

impl RequestDispatcher {
    pub fn new(scraper: Arc<CountryScraper>, country_gate: AdmissionGate) -> Self {
        Self {
            scraper,
            country_gate,
        }
    }

    /// 按配置组装分发器及其依赖
    ///
    /// 详情闸门在这里创建且只创建一次，由所有国家和所有请求共享
    pub fn from_settings(
        settings: &Settings,
        renderer: Arc<dyn Renderer>,
        identity: Arc<dyn IdentityProvider>,
        extractor: Arc<dyn SiteExtractor>,
        snapshots: Arc<dyn SnapshotRepository>,
    ) -> Result<Self, GateError> {
        let detail_gate = AdmissionGate::new("detail", settings.scraper.detail_concurrency)?;
        let country_gate = AdmissionGate::new("country", settings.scraper.country_concurrency)?;

        let detail_fetcher = Arc::new(DetailFetcher::new(
            renderer.clone(),
            identity.clone(),
            extractor.clone(),
            detail_gate,
            DetailFetchOptions::from_settings(&settings.scraper),
        ));
        let scraper = CountryScraper::new(
            renderer,
            identity,
            extractor,
            detail_fetcher,
            snapshots,
            Arc::new(SearchUrlBuilder::from_settings(&settings.sources)),
            PaginationOptions::from_settings(&settings.scraper),
        );

        Ok(Self::new(Arc::new(scraper), country_gate))
    }

    pub fn country_gate(&self) -> &AdmissionGate {
        &self.country_gate
    }

    pub fn detail_gate(&self) -> &AdmissionGate {
        self.scraper.detail_fetcher().gate()
    }

    /// 执行一次抓取请求
    ///
    /// # 参数
    ///
    /// * `request` - 抓取请求
    ///
    /// # 返回值
    ///
    /// * `Ok(AggregateReport)` - 按国家完成顺序汇总的报告
    /// * `Err(DispatchError::Validation)` - 缺少必填参数，此时不会触碰渲染引擎
    /// * `Err(DispatchError::Unexpected)` - 国家任务异常退出
    pub async fn dispatch(&self, request: ScrapeRequest) -> Result<AggregateReport, DispatchError> {
        if let Some(field) = request.missing_field() {
            return Err(DispatchError::Validation(format!(
                "missing required parameter `{}`",
                field
            )));
        }

        counter!("scrape_requests_total").increment(1);
        info!(
            job_title = %request.job_title,
            location = %request.location,
            countries = ?request.countries,
            "Starting job scraping"
        );

        let started = Instant::now();
        let request = Arc::new(request);
        let mut tasks = FuturesUnordered::new();

        for country in request.countries.iter().cloned() {
            let scraper = self.scraper.clone();
            let gate = self.country_gate.clone();
            let request = request.clone();
            let span = info_span!("country", country = %country);

            // dropping the handle detaches the task instead of aborting it
            tasks.push(tokio::spawn(
                async move {
                    let _permit = gate.admit().await?;
                    Ok::<_, GateError>(scraper.scrape(&request, &country).await)
                }
                .instrument(span),
            ));
        }

        let mut results = Vec::with_capacity(request.countries.len());
        while let Some(joined) = tasks.next().await {
            match joined {
                Ok(Ok(result)) => results.push(result),
                Ok(Err(e)) => {
                    error!("Country task was not admitted: {}", e);
                    return Err(DispatchError::Unexpected(e.to_string()));
                }
                Err(e) => {
                    error!("Country task failed: {}", e);
                    return Err(DispatchError::Unexpected(format!("country task failed: {}", e)));
                }
            }
        }

        let elapsed = started.elapsed();
        histogram!("scrape_duration_seconds").record(elapsed.as_secs_f64());

        let report = AggregateReport::from_results(results, elapsed);
        info!(
            total_jobs = report.total_jobs,
            total_pages = report.total_pages,
            duration_seconds = report.scrape_duration_seconds,
            "Scraping completed"
        );

        Ok(report)
    }
}
