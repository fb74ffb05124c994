// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::JobListingStub;
use crate::utils::url_utils::{is_web_url, resolve_url};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// 搜索结果卡片
const LISTING_CARD: &str = ".job_seen_beacon, .tapItem";
/// 卡片内的详情链接
const LISTING_LINK: &str = "a.jcs-JobTitle";
/// 下一页按钮
const NEXT_PAGE: &str = r#"a[data-testid="pagination-page-next"]"#;
/// 详情页主内容标记
const DETAIL_MARKER: &str = "h1";
const DETAIL_COMPANY: &str = ".jobsearch-CompanyReview--heading, .icl-u-lg-mr--sm.icl-u-xs-mr--xs, .jobsearch-InlineCompanyRating div:first-child";
const DETAIL_LOCATION: &str = r#"div[data-testid="inlineHeader-companyLocation"]"#;
const DETAIL_SALARY: &str = "#salaryInfoAndJobType span, .salary-snippet-container, .salary-snippet";

/// 详情页字段，缺失时为 None
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFields {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
}

/// 站点提取规则特质
///
/// 所有方法都是针对渲染后 HTML 的纯函数
pub trait SiteExtractor: Send + Sync {
    /// 写入记录 `source` 字段的站点名称
    fn source(&self) -> &str;

    /// 搜索结果页内容标记
    fn listing_marker(&self) -> &str;

    /// 详情页内容标记
    fn detail_marker(&self) -> &str;

    /// 提取职位存根，没有可解析链接的卡片被跳过
    fn extract_stubs(&self, html: &str, page_url: &str) -> Vec<JobListingStub>;

    /// 提取详情字段
    fn extract_detail(&self, html: &str) -> DetailFields;

    /// 是否存在下一页
    fn has_next_page(&self, html: &str) -> bool;
}

/// Indeed 提取规则
pub struct IndeedExtractor {
    card: Selector,
    link: Selector,
    next_page: Selector,
    title: Selector,
    company: Selector,
    location: Selector,
    salary: Selector,
}

impl IndeedExtractor {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            card: parse(LISTING_CARD)?,
            link: parse(LISTING_LINK)?,
            next_page: parse(NEXT_PAGE)?,
            title: parse(DETAIL_MARKER)?,
            company: parse(DETAIL_COMPANY)?,
            location: parse(DETAIL_LOCATION)?,
            salary: parse(DETAIL_SALARY)?,
        })
    }
}

impl SiteExtractor for IndeedExtractor {
    fn source(&self) -> &str {
        "Indeed"
    }

    fn listing_marker(&self) -> &str {
        LISTING_CARD
    }

    fn detail_marker(&self) -> &str {
        DETAIL_MARKER
    }

    fn extract_stubs(&self, html: &str, page_url: &str) -> Vec<JobListingStub> {
        let document = Html::parse_document(html);
        let base = Url::parse(page_url).ok();

        document
            .select(&self.card)
            .filter_map(|card| card.select(&self.link).next())
            .filter_map(|anchor| anchor.value().attr("href"))
            .filter(|href| !href.is_empty() && !href.starts_with('#'))
            .filter_map(|href| match &base {
                Some(base) => resolve_url(base, href).ok(),
                None => Url::parse(href).ok(),
            })
            .filter(is_web_url)
            .map(|url| JobListingStub {
                link: url.to_string(),
            })
            .collect()
    }

    fn extract_detail(&self, html: &str) -> DetailFields {
        let document = Html::parse_document(html);

        DetailFields {
            title: first_text(&document, &self.title),
            company: first_text(&document, &self.company),
            location: first_text(&document, &self.location),
            salary: first_text(&document, &self.salary),
        }
    }

    fn has_next_page(&self, html: &str) -> bool {
        Html::parse_document(html)
            .select(&self.next_page)
            .next()
            .is_some()
    }
}

fn parse(css: &str) -> anyhow::Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow::anyhow!("Invalid selector {}: {:?}", css, e))
}

/// 第一个匹配元素的文本，折叠空白，空文本视为缺失
fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document.select(selector).next().and_then(element_text)
}

fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
