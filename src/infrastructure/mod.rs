// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 包含的子模块：
/// - 指标（metrics）：Prometheus 指标注册与导出
/// - 快照存储（snapshot_store）：快照仓库的本地文件与内存实现
pub mod metrics;
pub mod snapshot_store;
