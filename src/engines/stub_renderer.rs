// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 内存渲染引擎
//!
//! 按 URL 返回预置 HTML，用 `scraper` 判断内容标记，可注入导航失败，
//! 并记录同时打开的详情页上下文峰值。供单元测试和集成测试使用。

use crate::engines::traits::{EngineError, RenderContext, Renderer};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
enum StubResponse {
    Page { html: String, detail: bool },
    NavigationFailure,
}

#[derive(Debug, Default)]
struct StubStats {
    contexts_opened: AtomicUsize,
    contexts_closed: AtomicUsize,
    active_details: AtomicUsize,
    peak_details: AtomicUsize,
    active_listings: AtomicUsize,
    peak_listings: AtomicUsize,
    navigations: Mutex<Vec<String>>,
    identities: Mutex<Vec<String>>,
}

/// 内存渲染引擎
#[derive(Debug, Default)]
pub struct StubRenderer {
    responses: Arc<RwLock<HashMap<String, StubResponse>>>,
    stats: Arc<StubStats>,
    navigation_latency: Duration,
}

impl StubRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 每次导航前等待的时间，用于制造并发重叠
    pub fn with_navigation_latency(mut self, latency: Duration) -> Self {
        self.navigation_latency = latency;
        self
    }

    /// 注册搜索结果页
    pub fn serve_page(&self, url: impl Into<String>, html: impl Into<String>) {
        self.responses.write().insert(
            url.into(),
            StubResponse::Page {
                html: html.into(),
                detail: false,
            },
        );
    }

    /// 注册详情页，打开期间计入并发统计
    pub fn serve_detail(&self, url: impl Into<String>, html: impl Into<String>) {
        self.responses.write().insert(
            url.into(),
            StubResponse::Page {
                html: html.into(),
                detail: true,
            },
        );
    }

    /// 导航到该 URL 时返回导航错误
    pub fn fail_navigation(&self, url: impl Into<String>) {
        self.responses
            .write()
            .insert(url.into(), StubResponse::NavigationFailure);
    }

    pub fn contexts_opened(&self) -> usize {
        self.stats.contexts_opened.load(Ordering::SeqCst)
    }

    /// 同时打开的详情页上下文峰值
    pub fn peak_detail_contexts(&self) -> usize {
        self.stats.peak_details.load(Ordering::SeqCst)
    }

    /// 当前仍打开的详情页上下文数量
    pub fn open_detail_contexts(&self) -> usize {
        self.stats.active_details.load(Ordering::SeqCst)
    }

    /// 同时打开的结果页上下文峰值
    pub fn peak_listing_contexts(&self) -> usize {
        self.stats.peak_listings.load(Ordering::SeqCst)
    }

    /// 已打开但尚未关闭的上下文数量
    pub fn open_contexts(&self) -> usize {
        self.contexts_opened() - self.stats.contexts_closed.load(Ordering::SeqCst)
    }

    pub fn navigations(&self) -> Vec<String> {
        self.stats.navigations.lock().clone()
    }

    pub fn identities(&self) -> Vec<String> {
        self.stats.identities.lock().clone()
    }
}

#[async_trait]
impl Renderer for StubRenderer {
    async fn open_context(&self, identity: &str) -> Result<Box<dyn RenderContext>, EngineError> {
        self.stats.contexts_opened.fetch_add(1, Ordering::SeqCst);
        self.stats.identities.lock().push(identity.to_string());

        Ok(Box::new(StubContext {
            responses: self.responses.clone(),
            stats: self.stats.clone(),
            latency: self.navigation_latency,
            state: Mutex::new(ContextState::default()),
        }))
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

#[derive(Debug, Default)]
struct ContextState {
    html: Option<String>,
    detail: bool,
    listing: bool,
    closed: bool,
}

struct StubContext {
    responses: Arc<RwLock<HashMap<String, StubResponse>>>,
    stats: Arc<StubStats>,
    latency: Duration,
    state: Mutex<ContextState>,
}

impl StubContext {
    fn mark_detail(&self) {
        let mut state = self.state.lock();
        if !state.detail {
            state.detail = true;
            let active = self.stats.active_details.fetch_add(1, Ordering::SeqCst) + 1;
            self.stats.peak_details.fetch_max(active, Ordering::SeqCst);
        }
    }

    fn mark_listing(&self) {
        let mut state = self.state.lock();
        if !state.listing {
            state.listing = true;
            let active = self.stats.active_listings.fetch_add(1, Ordering::SeqCst) + 1;
            self.stats.peak_listings.fetch_max(active, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl RenderContext for StubContext {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), EngineError> {
        if self.state.lock().closed {
            return Err(EngineError::Closed);
        }
        self.stats.navigations.lock().push(url.to_string());

        let response = self.responses.read().get(url).cloned();
        match &response {
            Some(StubResponse::Page { detail: true, .. }) => self.mark_detail(),
            Some(StubResponse::Page { detail: false, .. }) => self.mark_listing(),
            _ => {}
        }

        if !self.latency.is_zero() {
            if self.latency > timeout {
                tokio::time::sleep(timeout).await;
                return Err(EngineError::Navigation(format!(
                    "{} timed out after {}ms",
                    url,
                    timeout.as_millis()
                )));
            }
            tokio::time::sleep(self.latency).await;
        }

        match response {
            Some(StubResponse::Page { html, .. }) => {
                self.state.lock().html = Some(html);
                Ok(())
            }
            Some(StubResponse::NavigationFailure) => Err(EngineError::Navigation(format!(
                "{} timed out after {}ms",
                url,
                timeout.as_millis()
            ))),
            None => Err(EngineError::Navigation(format!("{}: no stub registered", url))),
        }
    }

    async fn wait_for_marker(&self, selector: &str, timeout: Duration) -> Result<(), EngineError> {
        let html = self.state.lock().html.clone();
        let Some(html) = html else {
            return Err(EngineError::marker_timeout(selector, timeout));
        };

        if contains_selector(&html, selector)? {
            Ok(())
        } else {
            Err(EngineError::marker_timeout(selector, timeout))
        }
    }

    async fn document(&self) -> Result<String, EngineError> {
        let state = self.state.lock();
        if state.closed {
            return Err(EngineError::Closed);
        }
        state
            .html
            .clone()
            .ok_or_else(|| EngineError::Extraction("no document loaded".to_string()))
    }

    async fn close(&self) {
        let mut state = self.state.lock();
        if !state.closed {
            state.closed = true;
            self.stats.contexts_closed.fetch_add(1, Ordering::SeqCst);
            if state.detail {
                self.stats.active_details.fetch_sub(1, Ordering::SeqCst);
            }
            if state.listing {
                self.stats.active_listings.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }
}

fn contains_selector(html: &str, selector: &str) -> Result<bool, EngineError> {
    let selector = Selector::parse(selector)
        .map_err(|e| EngineError::Extraction(format!("Invalid selector: {:?}", e)))?;
    let document = Html::parse_document(html);
    let found = document.select(&selector).next().is_some();
    Ok(found)
}

/// Indeed 风格的测试页面
pub mod fixtures {
    /// 生成搜索结果页，每个链接一张卡片
    pub fn listing_page(links: &[&str], has_next: bool) -> String {
        let cards: String = links
            .iter()
            .map(|link| {
                format!(
                    r#"<div class="job_seen_beacon"><h2><a class="jcs-JobTitle" href="{}"><span>Job</span></a></h2></div>"#,
                    link
                )
            })
            .collect();
        let next = if has_next {
            r#"<nav><a data-testid="pagination-page-next" href="?start=10">Next</a></nav>"#
        } else {
            ""
        };
        format!("<html><body><div id=\"mosaic\">{}</div>{}</body></html>", cards, next)
    }

    /// 没有任何职位卡片的页面
    pub fn empty_page() -> String {
        "<html><body><div class=\"captcha\">Please verify you are human</div></body></html>"
            .to_string()
    }

    /// 生成职位详情页
    pub fn detail_page(title: &str, company: &str, location: &str) -> String {
        format!(
            r#"<html><body>
                <h1>{}</h1>
                <div class="jobsearch-InlineCompanyRating"><div>{}</div></div>
                <div data-testid="inlineHeader-companyLocation"><div>{}</div></div>
                <div id="salaryInfoAndJobType"><span>55.000 € - 70.000 € pro Jahr</span></div>
            </body></html>"#,
            title, company, location
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(1);

    #[tokio::test]
    async fn test_serves_registered_page() {
        let renderer = StubRenderer::new();
        renderer.serve_page("https://example.com/a", fixtures::listing_page(&["/x"], false));

        let context = renderer.open_context("ua").await.unwrap();
        context.navigate("https://example.com/a", TIMEOUT).await.unwrap();
        context
            .wait_for_marker(".job_seen_beacon", TIMEOUT)
            .await
            .unwrap();
        assert!(context.document().await.unwrap().contains("jcs-JobTitle"));
        context.close().await;

        assert_eq!(renderer.contexts_opened(), 1);
        assert_eq!(renderer.open_contexts(), 0);
        assert_eq!(renderer.peak_listing_contexts(), 1);
        assert_eq!(renderer.identities(), vec!["ua".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_marker_times_out() {
        let renderer = StubRenderer::new();
        renderer.serve_page("https://example.com/a", fixtures::empty_page());

        let context = renderer.open_context("ua").await.unwrap();
        context.navigate("https://example.com/a", TIMEOUT).await.unwrap();
        let err = context.wait_for_marker(".job_seen_beacon", TIMEOUT).await;

        assert!(matches!(err, Err(EngineError::MarkerTimeout { .. })));
    }

    #[tokio::test]
    async fn test_navigation_failure_and_unknown_url() {
        let renderer = StubRenderer::new();
        renderer.fail_navigation("https://example.com/down");

        let context = renderer.open_context("ua").await.unwrap();
        let err = context.navigate("https://example.com/down", TIMEOUT).await;
        assert!(matches!(err, Err(EngineError::Navigation(_))));

        let err = context.navigate("https://example.com/unknown", TIMEOUT).await;
        assert!(matches!(err, Err(EngineError::Navigation(_))));
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_tracks_details() {
        let renderer = StubRenderer::new();
        renderer.serve_detail("https://example.com/job", fixtures::detail_page("t", "c", "l"));

        let first = renderer.open_context("ua").await.unwrap();
        let second = renderer.open_context("ua").await.unwrap();
        first.navigate("https://example.com/job", TIMEOUT).await.unwrap();
        second.navigate("https://example.com/job", TIMEOUT).await.unwrap();
        assert_eq!(renderer.open_detail_contexts(), 2);

        first.close().await;
        first.close().await;
        second.close().await;

        assert_eq!(renderer.open_detail_contexts(), 0);
        assert_eq!(renderer.peak_detail_contexts(), 2);
        assert!(matches!(first.document().await, Err(EngineError::Closed)));
    }
}
