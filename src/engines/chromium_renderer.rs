// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::BrowserSettings;
use crate::engines::traits::{EngineError, RenderContext, Renderer};
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// 等待内容标记时的轮询间隔
const MARKER_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Chromium 渲染引擎
///
/// 基于chromiumoxide实现，进程启动时创建一次并通过 Arc 共享，
/// 每次 `open_context` 打开一个新的标签页
pub struct ChromiumRenderer {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl ChromiumRenderer {
    /// 启动本地 Chrome 或连接远程实例
    ///
    /// # 参数
    ///
    /// * `settings` - 浏览器配置
    ///
    /// # 返回值
    ///
    /// * `Ok(ChromiumRenderer)` - 可用的渲染引擎
    /// * `Err(EngineError)` - 启动或连接失败
    pub async fn launch(settings: &BrowserSettings) -> Result<Self, EngineError> {
        let (browser, mut handler) = if let Some(ref url) = settings.remote_debugging_url {
            info!("Connecting to remote Chrome instance at: {}", url);
            Browser::connect(url.as_str()).await.map_err(|e| {
                EngineError::Launch(format!("Failed to connect to remote Chrome: {}", e))
            })?
        } else {
            let mut builder = BrowserConfig::builder()
                .no_sandbox()
                .request_timeout(Duration::from_secs(30));

            if !settings.headless {
                builder = builder.with_head();
            }

            builder = builder
                .arg("--disable-gpu")
                .arg("--disable-dev-shm-usage")
                .arg("--disable-blink-features=AutomationControlled");

            let config = builder.build().map_err(EngineError::Launch)?;
            Browser::launch(config)
                .await
                .map_err(|e| EngineError::Launch(e.to_string()))?
        };

        // The handler drives the CDP connection and must be polled for the
        // browser's lifetime.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            handler_task,
        })
    }

    /// 关闭浏览器
    pub async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser: {}", e);
        }
        self.handler_task.abort();
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn open_context(&self, identity: &str) -> Result<Box<dyn RenderContext>, EngineError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| EngineError::Launch(format!("Failed to open page: {}", e)))?;

        let configured = page.set_user_agent(identity).await.map(|_| ());
        if let Err(e) = configured {
            // A page we cannot configure still has to be released.
            let _ = page.close().await;
            return Err(EngineError::Launch(format!("Failed to set user agent: {}", e)));
        }

        Ok(Box::new(ChromiumContext {
            page: Mutex::new(Some(page)),
        }))
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}

/// 单个 Chrome 标签页
struct ChromiumContext {
    page: Mutex<Option<Page>>,
}

impl ChromiumContext {
    fn page(&self) -> Result<Page, EngineError> {
        self.page.lock().clone().ok_or(EngineError::Closed)
    }
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), EngineError> {
        let page = self.page()?;

        tokio::time::timeout(timeout, page.goto(url))
            .await
            .map_err(|_| {
                EngineError::Navigation(format!(
                    "{} timed out after {}ms",
                    url,
                    timeout.as_millis()
                ))
            })?
            .map_err(|e| EngineError::Navigation(format!("{}: {}", url, e)))?;

        Ok(())
    }

    async fn wait_for_marker(&self, selector: &str, timeout: Duration) -> Result<(), EngineError> {
        let page = self.page()?;
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if let Ok(Ok(_)) = tokio::time::timeout(remaining, page.find_element(selector)).await {
                return Ok(());
            }

            let Some(pause) = next_poll(deadline, Instant::now()) else {
                debug!("Marker {} not found before deadline", selector);
                return Err(EngineError::marker_timeout(selector, timeout));
            };

            tokio::time::sleep(pause).await;
        }
    }

    async fn document(&self) -> Result<String, EngineError> {
        let page = self.page()?;
        page.content()
            .await
            .map_err(|e| EngineError::Extraction(e.to_string()))
    }

    async fn close(&self) {
        let page = self.page.lock().take();
        if let Some(page) = page {
            if let Err(e) = page.close().await {
                warn!("Failed to close page: {}", e);
            }
        }
    }
}

/// 下一次轮询前的等待时间，已到截止时间时返回 `None`
fn next_poll(deadline: Instant, now: Instant) -> Option<Duration> {
    let remaining = deadline.saturating_duration_since(now);
    if remaining.is_zero() {
        None
    } else {
        Some(MARKER_POLL_INTERVAL.min(remaining))
    }
}
