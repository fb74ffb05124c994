// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// 缺失字段的占位值
///
/// 调用方通过比较该值区分“未抓到数据”，字段永远不会为空或 null
pub const NOT_AVAILABLE: &str = "Not available";

/// 抓取请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    /// 职位名称
    pub job_title: String,
    /// 地点
    pub location: String,
    /// 目标国家代码，按请求顺序
    pub countries: Vec<String>,
    /// 原样透传到搜索 URL 的过滤参数
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
}

impl ScrapeRequest {
    pub fn new(
        job_title: impl Into<String>,
        location: impl Into<String>,
        countries: Vec<String>,
    ) -> Self {
        Self {
            job_title: job_title.into(),
            location: location.into(),
            countries,
            filters: BTreeMap::new(),
        }
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// 检查必填字段
    ///
    /// # 返回值
    ///
    /// 返回第一个缺失字段的名称
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.job_title.trim().is_empty() {
            Some("jobTitle")
        } else if self.location.trim().is_empty() {
            Some("location")
        } else if self.countries.is_empty() {
            Some("countries")
        } else {
            None
        }
    }
}

/// 搜索结果页上的职位存根，只包含详情链接
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobListingStub {
    /// 绝对 URL
    pub link: String,
}

/// 职位详情记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub title: String,
    pub company: String,
    pub location: String,
    /// 没有薪资信息时同样使用占位值
    pub salary: String,
    pub link: String,
    pub source: String,
}

impl JobRecord {
    /// 创建所有字段均为占位值的记录
    pub fn unavailable(link: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            title: NOT_AVAILABLE.to_string(),
            company: NOT_AVAILABLE.to_string(),
            location: NOT_AVAILABLE.to_string(),
            salary: NOT_AVAILABLE.to_string(),
            link: link.into(),
            source: source.into(),
        }
    }

    /// 标题不是占位值时记录才会被保留
    pub fn is_available(&self) -> bool {
        self.title != NOT_AVAILABLE
    }
}

/// 单个国家分页抓取的结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// 没有下一页
    Exhausted,
    /// 达到翻页上限
    PageCapReached,
    /// 页面导航失败
    NavigationFailed,
    /// 内容标记超时或提取失败
    ExtractionFailed,
}

impl Termination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Termination::Exhausted => "exhausted",
            Termination::PageCapReached => "page_cap_reached",
            Termination::NavigationFailed => "navigation_failed",
            Termination::ExtractionFailed => "extraction_failed",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Termination::NavigationFailed | Termination::ExtractionFailed
        )
    }
}

/// 单个国家的抓取结果
#[derive(Debug, Clone, PartialEq)]
pub struct CountryScrapeResult {
    pub country: String,
    pub jobs: Vec<JobRecord>,
    pub pages_visited: u32,
    pub termination: Termination,
}

impl CountryScrapeResult {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            jobs: Vec::new(),
            pages_visited: 0,
            termination: Termination::Exhausted,
        }
    }
}

/// 报告中每个国家的摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountrySummary {
    pub country: String,
    pub jobs: usize,
    pub pages_visited: u32,
    pub status: Termination,
}

/// 聚合抓取报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    pub total_jobs: usize,
    pub scrape_duration_seconds: f64,
    pub total_pages: u32,
    /// 按国家任务完成顺序拼接
    pub jobs: Vec<JobRecord>,
    pub countries: Vec<CountrySummary>,
}

impl AggregateReport {
    /// 按完成顺序汇总各国家结果
    ///
    /// # 参数
    ///
    /// * `results` - 按完成顺序排列的国家结果
    /// * `elapsed` - 整个请求的耗时
    pub fn from_results(results: Vec<CountryScrapeResult>, elapsed: Duration) -> Self {
        let mut jobs = Vec::new();
        let mut countries = Vec::with_capacity(results.len());
        let mut total_pages = 0;

        for result in results {
            total_pages += result.pages_visited;
            countries.push(CountrySummary {
                country: result.country,
                jobs: result.jobs.len(),
                pages_visited: result.pages_visited,
                status: result.termination,
            });
            jobs.extend(result.jobs);
        }

        Self {
            total_jobs: jobs.len(),
            scrape_duration_seconds: (elapsed.as_secs_f64() * 100.0).round() / 100.0,
            total_pages,
            jobs,
            countries,
        }
    }
}
