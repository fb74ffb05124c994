// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

/// 快照错误类型
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// IO错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// 其他错误
    #[error("Snapshot error: {0}")]
    Other(String),
}

/// 生成失败页面快照的文件名
///
/// 国家代码中的非字母数字字符被替换为 `_`，避免路径穿越
pub fn snapshot_name(country: &str, page: u32) -> String {
    let country: String = country
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("error_page_{}_{}.html", country, page)
}

/// 诊断快照仓库特质
///
/// 保存提取失败时的渲染页面，仅用于人工排查
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// 保存快照
    ///
    /// # 返回值
    ///
    /// 快照的存放位置
    async fn save(&self, name: &str, html: &str) -> Result<String, SnapshotError>;
}
