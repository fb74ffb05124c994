// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 默认 User-Agent 池
const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Mobile/15E148 Safari/604.1",
];

/// 身份提供者特质
///
/// 每次打开渲染上下文时提供一个客户端身份（User-Agent）
pub trait IdentityProvider: Send + Sync {
    fn next_identity(&self) -> String;
}

/// 从 User-Agent 池中随机选择
#[derive(Debug, Clone)]
pub struct RandomUserAgentProvider {
    agents: Vec<String>,
}

impl RandomUserAgentProvider {
    pub fn new() -> Self {
        Self::with_agents(DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect())
    }

    /// 使用自定义 User-Agent 池，空池回退到默认池
    pub fn with_agents(agents: Vec<String>) -> Self {
        if agents.is_empty() {
            return Self::new();
        }
        Self { agents }
    }

    pub fn agents(&self) -> &[String] {
        &self.agents
    }
}

impl Default for RandomUserAgentProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for RandomUserAgentProvider {
    fn next_identity(&self) -> String {
        self.agents[rand::random_range(0..self.agents.len())].clone()
    }
}

/// 固定身份，便于测试
#[derive(Debug, Clone)]
pub struct FixedIdentity(pub String);

impl IdentityProvider for FixedIdentity {
    fn next_identity(&self) -> String {
        self.0.clone()
    }
}
