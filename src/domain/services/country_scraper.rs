// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ScraperSettings;
use crate::domain::models::job::{CountryScrapeResult, JobRecord, ScrapeRequest, Termination};
use crate::domain::repositories::snapshot_repository::{snapshot_name, SnapshotRepository};
use crate::domain::services::deduplicator::DeduplicationSet;
use crate::domain::services::detail_fetcher::DetailFetcher;
use crate::domain::services::extractor::SiteExtractor;
use crate::domain::services::identity_provider::IdentityProvider;
use crate::domain::services::search_url::SearchUrlBuilder;
use crate::engines::traits::{EngineError, RenderContext, Renderer};
use crate::utils::delay::DelayRange;
use futures::stream::{FuturesUnordered, StreamExt};
use metrics::counter;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// 分页参数
#[derive(Debug, Clone, Copy)]
pub struct PaginationOptions {
    /// 最多处理的页数
    pub max_pages: u32,
    /// 每页结果数
    pub page_size: u32,
    pub navigation_timeout: Duration,
    pub listing_marker_timeout: Duration,
    /// 翻页间隔
    pub page_delay: DelayRange,
}

impl PaginationOptions {
    pub fn from_settings(settings: &ScraperSettings) -> Self {
        Self {
            max_pages: settings.max_pages,
            page_size: settings.page_size,
            navigation_timeout: settings.navigation_timeout(),
            listing_marker_timeout: settings.listing_marker_timeout(),
            page_delay: settings.page_delay(),
        }
    }
}

/// 单页处理结果
struct PageOutcome {
    accepted: usize,
    has_next: bool,
}

/// 国家级分页抓取器
///
/// 对一个国家依次处理搜索结果页：导航、等待列表标记、提取存根、
/// 去重后并发抓取详情，再决定是否翻页。
///
/// 任何终止状态都返回已累积的结果，失败只影响当前国家。
pub struct CountryScraper {
    renderer: Arc<dyn Renderer>,
    identity: Arc<dyn IdentityProvider>,
    extractor: Arc<dyn SiteExtractor>,
    detail_fetcher: Arc<DetailFetcher>,
    snapshots: Arc<dyn SnapshotRepository>,
    urls: Arc<SearchUrlBuilder>,
    options: PaginationOptions,
}

impl CountryScraper {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        identity: Arc<dyn IdentityProvider>,
        extractor: Arc<dyn SiteExtractor>,
        detail_fetcher: Arc<DetailFetcher>,
        snapshots: Arc<dyn SnapshotRepository>,
        urls: Arc<SearchUrlBuilder>,
        options: PaginationOptions,
    ) -> Self {
        Self {
            renderer,
            identity,
            extractor,
            detail_fetcher,
            snapshots,
            urls,
            options,
        }
    }

    pub fn detail_fetcher(&self) -> &DetailFetcher {
        &self.detail_fetcher
    }

    /// 抓取一个国家的全部结果页
    ///
    /// 结果页上下文在开始时打开一次，结束时无条件关闭
    pub async fn scrape(&self, request: &ScrapeRequest, country: &str) -> CountryScrapeResult {
        let mut result = CountryScrapeResult::new(country);

        if self.options.max_pages == 0 {
            result.termination = Termination::PageCapReached;
            record_run(&result);
            return result;
        }

        let context = match self
            .renderer
            .open_context(&self.identity.next_identity())
            .await
        {
            Ok(context) => context,
            Err(e) => {
                error!(country = %country, "Failed to open results page context: {}", e);
                result.termination = Termination::NavigationFailed;
                record_run(&result);
                return result;
            }
        };

        let search_url = self.urls.search_url(request, country);
        let termination = self
            .paginate(context.as_ref(), country, &search_url, &mut result)
            .await;
        result.termination = termination;
        context.close().await;

        if result.termination.is_failure() {
            warn!(
                country = %country,
                jobs = result.jobs.len(),
                pages = result.pages_visited,
                termination = result.termination.as_str(),
                "Country stopped early, keeping partial results"
            );
        } else {
            info!(
                country = %country,
                jobs = result.jobs.len(),
                pages = result.pages_visited,
                termination = result.termination.as_str(),
                "Finished scraping country"
            );
        }
        record_run(&result);
        result
    }

    async fn paginate(
        &self,
        context: &dyn RenderContext,
        country: &str,
        search_url: &str,
        result: &mut CountryScrapeResult,
    ) -> Termination {
        let mut seen = DeduplicationSet::new();
        let mut page = 0u32;

        loop {
            let page_url = SearchUrlBuilder::page_url(search_url, page, self.options.page_size);
            info!(country = %country, page = page + 1, url = %page_url, "Scraping results page");

            if let Err(e) = context
                .navigate(&page_url, self.options.navigation_timeout)
                .await
            {
                error!(country = %country, page = page + 1, "Error navigating to results page: {}", e);
                return Termination::NavigationFailed;
            }

            let outcome = match self
                .process_page(context, &page_url, &mut seen, &mut result.jobs)
                .await
            {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(country = %country, page = page + 1, "Error processing results page: {}", e);
                    self.save_snapshot(context, country, page).await;
                    return Termination::ExtractionFailed;
                }
            };

            page += 1;
            result.pages_visited = page;
            counter!("scrape_pages_visited_total").increment(1);
            debug!(
                country = %country,
                page,
                accepted = outcome.accepted,
                total = result.jobs.len(),
                "Results page processed"
            );

            if !outcome.has_next {
                return Termination::Exhausted;
            }
            if page >= self.options.max_pages {
                info!(country = %country, max_pages = self.options.max_pages, "Page cap reached");
                return Termination::PageCapReached;
            }

            self.options.page_delay.wait().await;
        }
    }

    /// 处理已加载的结果页，所有详情抓取完成后才返回
    async fn process_page(
        &self,
        context: &dyn RenderContext,
        page_url: &str,
        seen: &mut DeduplicationSet,
        jobs: &mut Vec<JobRecord>,
    ) -> Result<PageOutcome, EngineError> {
        context
            .wait_for_marker(
                self.extractor.listing_marker(),
                self.options.listing_marker_timeout,
            )
            .await?;
        let html = context.document().await?;

        let stubs = self.extractor.extract_stubs(&html, page_url);
        let has_next = self.extractor.has_next_page(&html);

        let mut on_page = HashSet::new();
        let links: Vec<String> = stubs
            .into_iter()
            .map(|stub| stub.link)
            .filter(|link| !seen.contains(link) && on_page.insert(link.clone()))
            .collect();
        debug!(links = links.len(), "Dispatching detail fetches");

        let mut pending: FuturesUnordered<_> = links
            .iter()
            .map(|link| self.detail_fetcher.fetch(link))
            .collect();

        let mut accepted = 0;
        while let Some(record) = pending.next().await {
            if record.is_available() && seen.insert(record.link.clone()) {
                jobs.push(record);
                accepted += 1;
            }
        }

        Ok(PageOutcome { accepted, has_next })
    }

    /// 保存失败页面快照，失败只记录日志
    async fn save_snapshot(&self, context: &dyn RenderContext, country: &str, page: u32) {
        let html = match context.document().await {
            Ok(html) => html,
            Err(e) => {
                warn!(country = %country, page, "No document available for snapshot: {}", e);
                return;
            }
        };

        match self.snapshots.save(&snapshot_name(country, page), &html).await {
            Ok(location) => info!(location = %location, "Saved page snapshot"),
            Err(e) => warn!(country = %country, page, "Failed to save page snapshot: {}", e),
        }
    }
}

fn record_run(result: &CountryScrapeResult) {
    counter!("country_runs_total", "status" => result.termination.as_str()).increment(1);
}
