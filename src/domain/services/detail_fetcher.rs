// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ScraperSettings;
use crate::domain::models::job::{JobRecord, NOT_AVAILABLE};
use crate::domain::services::admission_gate::AdmissionGate;
use crate::domain::services::extractor::SiteExtractor;
use crate::domain::services::identity_provider::IdentityProvider;
use crate::engines::traits::{EngineError, Renderer};
use crate::utils::delay::DelayRange;
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// 详情抓取的时间参数
#[derive(Debug, Clone, Copy)]
pub struct DetailFetchOptions {
    pub navigation_timeout: Duration,
    pub marker_timeout: Duration,
    pub pre_fetch_delay: DelayRange,
}

impl DetailFetchOptions {
    pub fn from_settings(settings: &ScraperSettings) -> Self {
        Self {
            navigation_timeout: settings.navigation_timeout(),
            marker_timeout: settings.detail_marker_timeout(),
            pre_fetch_delay: settings.detail_delay(),
        }
    }
}

/// 职位详情抓取器
///
/// 每次抓取都打开独立的渲染上下文，并且必须先通过全局详情闸门。
/// 闸门在所有国家、所有请求之间共享，同时打开的详情上下文不会超过其容量。
///
/// `fetch` 永不失败：任何错误都会被记录并转换为占位记录。
pub struct DetailFetcher {
    renderer: Arc<dyn Renderer>,
    identity: Arc<dyn IdentityProvider>,
    extractor: Arc<dyn SiteExtractor>,
    gate: AdmissionGate,
    options: DetailFetchOptions,
}

impl DetailFetcher {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        identity: Arc<dyn IdentityProvider>,
        extractor: Arc<dyn SiteExtractor>,
        gate: AdmissionGate,
        options: DetailFetchOptions,
    ) -> Self {
        Self {
            renderer,
            identity,
            extractor,
            gate,
            options,
        }
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    /// 抓取单个职位详情
    ///
    /// 等待闸门许可后随机延迟，再打开上下文抓取。许可持有到上下文关闭之后。
    pub async fn fetch(&self, link: &str) -> JobRecord {
        counter!("detail_fetches_total").increment(1);

        let _permit = match self.gate.admit().await {
            Ok(permit) => permit,
            Err(e) => {
                error!(link = %link, "Detail fetch not admitted: {}", e);
                counter!("detail_fetch_failures_total").increment(1);
                return JobRecord::unavailable(link, self.extractor.source());
            }
        };

        self.options.pre_fetch_delay.wait().await;

        match self.try_fetch(link).await {
            Ok(record) => {
                debug!(link = %link, title = %record.title, "Fetched job details");
                record
            }
            Err(e) => {
                error!(link = %link, "Error scraping job details: {}", e);
                counter!("detail_fetch_failures_total").increment(1);
                JobRecord::unavailable(link, self.extractor.source())
            }
        }
    }

    async fn try_fetch(&self, link: &str) -> Result<JobRecord, EngineError> {
        let identity = self.identity.next_identity();
        let context = self.renderer.open_context(&identity).await?;

        let result = async {
            context
                .navigate(link, self.options.navigation_timeout)
                .await?;
            context
                .wait_for_marker(self.extractor.detail_marker(), self.options.marker_timeout)
                .await?;
            context.document().await
        }
        .await;

        // the context is released on every path, success or not
        context.close().await;

        let html = result?;
        let fields = self.extractor.extract_detail(&html);
        let or_na = |value: Option<String>| value.unwrap_or_else(|| NOT_AVAILABLE.to_string());

        Ok(JobRecord {
            title: or_na(fields.title),
            company: or_na(fields.company),
            location: or_na(fields.location),
            salary: or_na(fields.salary),
            link: link.to_string(),
            source: self.extractor.source().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::extractor::IndeedExtractor;
    use crate::domain::services::identity_provider::FixedIdentity;
    use crate::engines::stub_renderer::{fixtures, StubRenderer};
    use futures::future::join_all;

    const JOB: &str = "https://de.indeed.com/viewjob?jk=1";

    fn fetcher(renderer: Arc<StubRenderer>, capacity: usize) -> DetailFetcher {
        DetailFetcher::new(
            renderer,
            Arc::new(FixedIdentity("test-agent".to_string())),
            Arc::new(IndeedExtractor::new().unwrap()),
            AdmissionGate::new("detail", capacity).unwrap(),
            DetailFetchOptions {
                navigation_timeout: Duration::from_secs(1),
                marker_timeout: Duration::from_secs(1),
                pre_fetch_delay: DelayRange::zero(),
            },
        )
    }

    #[tokio::test]
    async fn test_fetch_full_record() {
        let renderer = Arc::new(StubRenderer::new());
        renderer.serve_detail(JOB, fixtures::detail_page("Rust Engineer", "Acme", "Berlin"));

        let record = fetcher(renderer.clone(), 5).fetch(JOB).await;

        assert_eq!(record.title, "Rust Engineer");
        assert_eq!(record.company, "Acme");
        assert_eq!(record.location, "Berlin");
        assert_eq!(record.salary, "55.000 € - 70.000 € pro Jahr");
        assert_eq!(record.link, JOB);
        assert_eq!(record.source, "Indeed");
        assert_eq!(renderer.identities(), vec!["test-agent".to_string()]);
        assert_eq!(renderer.open_detail_contexts(), 0);
    }

    #[tokio::test]
    async fn test_navigation_failure_yields_placeholder() {
        let renderer = Arc::new(StubRenderer::new());
        renderer.fail_navigation(JOB);

        let record = fetcher(renderer, 5).fetch(JOB).await;

        assert_eq!(record, JobRecord::unavailable(JOB, "Indeed"));
        assert!(!record.is_available());
    }

    #[tokio::test]
    async fn test_missing_marker_yields_placeholder_and_closes_context() {
        let renderer = Arc::new(StubRenderer::new());
        renderer.serve_detail(JOB, "<html><body><p>Job expired</p></body></html>");

        let record = fetcher(renderer.clone(), 5).fetch(JOB).await;

        assert_eq!(record.title, NOT_AVAILABLE);
        assert_eq!(record.link, JOB);
        assert_eq!(renderer.contexts_opened(), 1);
        assert_eq!(renderer.open_detail_contexts(), 0);
    }

    #[tokio::test]
    async fn test_partial_fields_use_placeholder() {
        let renderer = Arc::new(StubRenderer::new());
        renderer.serve_detail(JOB, "<html><body><h1>Only a title</h1></body></html>");

        let record = fetcher(renderer, 5).fetch(JOB).await;

        assert_eq!(record.title, "Only a title");
        assert_eq!(record.company, NOT_AVAILABLE);
        assert_eq!(record.location, NOT_AVAILABLE);
        assert_eq!(record.salary, NOT_AVAILABLE);
        assert!(record.is_available());
    }

    #[tokio::test]
    async fn test_concurrent_fetches_respect_gate() {
        let renderer = Arc::new(StubRenderer::new().with_navigation_latency(Duration::from_millis(20)));
        let links: Vec<String> = (0..12)
            .map(|i| format!("https://de.indeed.com/viewjob?jk={}", i))
            .collect();
        for link in &links {
            renderer.serve_detail(link.clone(), fixtures::detail_page("t", "c", "l"));
        }
        let fetcher = fetcher(renderer.clone(), 3);

        let records = join_all(links.iter().map(|link| fetcher.fetch(link))).await;

        assert_eq!(records.len(), 12);
        assert!(records.iter().all(JobRecord::is_available));
        assert!(renderer.peak_detail_contexts() <= 3);
        assert_eq!(renderer.open_detail_contexts(), 0);
        assert_eq!(fetcher.gate().in_flight(), 0);
    }

    #[tokio::test]
    async fn test_closed_gate_yields_placeholder() {
        let renderer = Arc::new(StubRenderer::new());
        let fetcher = fetcher(renderer.clone(), 1);
        fetcher.gate().close();

        let record = fetcher.fetch(JOB).await;

        assert!(!record.is_available());
        assert_eq!(renderer.contexts_opened(), 0);
    }
}
