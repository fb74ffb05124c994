// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;

/// 去重集合
///
/// 以详情链接为键，只在单个国家的一次分页抓取中使用，不跨国家共享
#[derive(Debug, Default)]
pub struct DeduplicationSet {
    seen: HashSet<String>,
}

impl DeduplicationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, link: &str) -> bool {
        self.seen.contains(link)
    }

    /// 记录链接
    ///
    /// # 返回值
    ///
    /// 链接此前未出现过时返回true
    pub fn insert(&mut self, link: impl Into<String>) -> bool {
        self.seen.insert(link.into())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
