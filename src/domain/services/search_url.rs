// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::SourcesSettings;
use crate::domain::models::job::ScrapeRequest;
use std::collections::HashMap;

/// 搜索 URL 构建器
///
/// 国家代码映射到站点端点，未知代码回退到默认端点。
/// 过滤参数不做任何校验，原样编码后追加到查询串。
#[derive(Debug, Clone)]
pub struct SearchUrlBuilder {
    default_base_url: String,
    base_urls: HashMap<String, String>,
}

impl SearchUrlBuilder {
    pub fn new(default_base_url: impl Into<String>, base_urls: HashMap<String, String>) -> Self {
        Self {
            default_base_url: trim_base(default_base_url.into()),
            base_urls: base_urls
                .into_iter()
                .map(|(country, url)| (country.to_lowercase(), trim_base(url)))
                .collect(),
        }
    }

    pub fn from_settings(settings: &SourcesSettings) -> Self {
        Self::new(
            settings.default_base_url.clone(),
            settings.base_urls.clone(),
        )
    }

    /// 国家对应的端点
    pub fn base_url(&self, country: &str) -> &str {
        self.base_urls
            .get(&country.to_lowercase())
            .map(String::as_str)
            .unwrap_or(&self.default_base_url)
    }

    /// 第一页搜索 URL
    pub fn search_url(&self, request: &ScrapeRequest, country: &str) -> String {
        let mut url = format!(
            "{}/jobs?q={}&l={}",
            self.base_url(country),
            urlencoding::encode(&request.job_title),
            urlencoding::encode(&request.location)
        );

        for (key, value) in &request.filters {
            url.push_str(&format!(
                "&{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            ));
        }

        url
    }

    /// 指定页（从 0 开始）的 URL
    pub fn page_url(search_url: &str, page: u32, page_size: u32) -> String {
        if page == 0 {
            search_url.to_string()
        } else {
            format!("{}&start={}", search_url, page * page_size)
        }
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
