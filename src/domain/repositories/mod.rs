// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 定义领域层依赖的持久化抽象，具体实现由基础设施层提供。
///
/// - 快照仓库（snapshot_repository）：保存提取失败时的页面快照
pub mod snapshot_repository;
