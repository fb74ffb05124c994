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

use crate::utils::delay::DelayRange;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含服务器、抓取并发、站点端点、浏览器、诊断与日志等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 抓取与并发控制配置
    pub scraper: ScraperSettings,
    /// 国家到搜索端点的映射
    pub sources: SourcesSettings,
    /// 浏览器配置
    pub browser: BrowserSettings,
    /// 诊断快照配置
    pub diagnostics: DiagnosticsSettings,
    /// 日志配置
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 抓取配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperSettings {
    /// 全局同时进行的详情抓取上限
    pub detail_concurrency: usize,
    /// 同时进行的国家级抓取上限
    pub country_concurrency: usize,
    /// 每个国家最多翻页数
    pub max_pages: u32,
    /// 每页结果数（用于计算 start 偏移）
    pub page_size: u32,
    /// 页面导航超时（毫秒）
    pub navigation_timeout_ms: u64,
    /// 列表页内容标记等待超时（毫秒）
    pub listing_marker_timeout_ms: u64,
    /// 详情页内容标记等待超时（毫秒）
    pub detail_marker_timeout_ms: u64,
    /// 翻页间隔下限（毫秒）
    pub page_delay_min_ms: u64,
    /// 翻页间隔上限（毫秒）
    pub page_delay_max_ms: u64,
    /// 详情抓取前延迟下限（毫秒）
    pub detail_delay_min_ms: u64,
    /// 详情抓取前延迟上限（毫秒）
    pub detail_delay_max_ms: u64,
}

impl ScraperSettings {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn listing_marker_timeout(&self) -> Duration {
        Duration::from_millis(self.listing_marker_timeout_ms)
    }

    pub fn detail_marker_timeout(&self) -> Duration {
        Duration::from_millis(self.detail_marker_timeout_ms)
    }

    /// 翻页间隔
    pub fn page_delay(&self) -> DelayRange {
        DelayRange::new(self.page_delay_min_ms, self.page_delay_max_ms)
    }

    /// 详情抓取前延迟
    pub fn detail_delay(&self) -> DelayRange {
        DelayRange::new(self.detail_delay_min_ms, self.detail_delay_max_ms)
    }
}

/// 搜索端点配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesSettings {
    /// 未映射国家代码使用的默认端点
    pub default_base_url: String,
    /// 国家代码 -> 端点
    #[serde(default)]
    pub base_urls: HashMap<String, String>,
}

/// 浏览器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSettings {
    /// 远程 Chrome 调试地址，设置后连接远程实例而不是本地启动
    pub remote_debugging_url: Option<String>,
    /// 是否无头模式
    pub headless: bool,
}

/// 诊断配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosticsSettings {
    /// 页面快照保存目录
    pub snapshot_dir: String,
}

/// 日志配置设置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingSettings {
    /// 日志文件路径，未设置时只输出到控制台
    pub file: Option<String>,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、配置文件和环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::defaults_builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("JOBCRAWLRS").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// 仅使用内置默认值创建配置，不读取文件和环境变量
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::defaults_builder()?.build()?.try_deserialize()
    }

    fn defaults_builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            // Server
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3001)?
            // Scraper
            .set_default("scraper.detail_concurrency", 5)?
            .set_default("scraper.country_concurrency", 3)?
            .set_default("scraper.max_pages", 20)?
            .set_default("scraper.page_size", 10)?
            .set_default("scraper.navigation_timeout_ms", 30_000)?
            .set_default("scraper.listing_marker_timeout_ms", 10_000)?
            .set_default("scraper.detail_marker_timeout_ms", 10_000)?
            .set_default("scraper.page_delay_min_ms", 500)?
            .set_default("scraper.page_delay_max_ms", 1500)?
            .set_default("scraper.detail_delay_min_ms", 500)?
            .set_default("scraper.detail_delay_max_ms", 1500)?
            // Sources
            .set_default("sources.default_base_url", "https://de.indeed.com")?
            .set_default("sources.base_urls.de", "https://de.indeed.com")?
            .set_default("sources.base_urls.at", "https://at.indeed.com")?
            .set_default("sources.base_urls.ch", "https://ch.indeed.com")?
            // Browser
            .set_default("browser.headless", true)?
            // Diagnostics
            .set_default("diagnostics.snapshot_dir", "./snapshots")
    }
}
