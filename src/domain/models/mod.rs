// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 职位（job）：抓取请求、职位存根、职位记录、国家结果与聚合报告
pub mod job;
