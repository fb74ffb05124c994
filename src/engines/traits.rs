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

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// 渲染引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 浏览器启动或连接失败
    #[error("Browser launch failed: {0}")]
    Launch(String),
    /// 导航失败（超时或网络错误）
    #[error("Navigation failed: {0}")]
    Navigation(String),
    /// 内容标记在超时时间内未出现
    #[error("Content marker `{selector}` did not appear within {timeout_ms}ms")]
    MarkerTimeout { selector: String, timeout_ms: u64 },
    /// 读取文档失败
    #[error("Extraction failed: {0}")]
    Extraction(String),
    /// 上下文已关闭
    #[error("Render context is closed")]
    Closed,
}

impl EngineError {
    pub fn marker_timeout(selector: &str, timeout: Duration) -> Self {
        EngineError::MarkerTimeout {
            selector: selector.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }
    }
}

/// 渲染引擎特质
///
/// 打开相互隔离的浏览上下文，获取与释放都有不可忽略的开销
#[async_trait]
pub trait Renderer: Send + Sync {
    /// 使用指定身份（User-Agent）打开新的上下文
    async fn open_context(&self, identity: &str) -> Result<Box<dyn RenderContext>, EngineError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}

/// 单个浏览上下文
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// 在超时时间内导航到指定 URL
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), EngineError>;

    /// 等待匹配选择器的元素出现
    async fn wait_for_marker(&self, selector: &str, timeout: Duration) -> Result<(), EngineError>;

    /// 当前渲染后的 HTML 文档
    async fn document(&self) -> Result<String, EngineError>;

    /// 关闭上下文，可重复调用
    async fn close(&self);
}
