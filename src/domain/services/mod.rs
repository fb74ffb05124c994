// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块包含职位抓取编排的核心逻辑。
///
/// 包含的服务：
/// - 准入闸门（admission_gate）：限制同时进行的详情抓取和国家任务数量
/// - 国家抓取（country_scraper）：单个国家的分页状态机
/// - 去重（deduplicator）：按详情链接去重
/// - 详情抓取（detail_fetcher）：永不失败的单个职位详情抓取
/// - 请求分发（dispatcher）：校验、按国家并发、汇总与计时
/// - 提取规则（extractor）：针对渲染后 HTML 的站点提取规则
/// - 身份提供（identity_provider）：为每个渲染上下文提供 User-Agent
/// - 搜索 URL（search_url）：国家端点映射与分页 URL 构建
pub mod admission_gate;
pub mod country_scraper;
pub mod deduplicator;
pub mod detail_fetcher;
pub mod dispatcher;
pub mod extractor;
pub mod identity_provider;
pub mod search_url;
