// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：请求、职位记录和聚合报告
/// - 仓库接口（repositories）：诊断快照的持久化抽象
/// - 服务（services）：分页抓取、并发控制与请求分发
///
/// 领域层只依赖渲染引擎和仓库的抽象接口，不依赖具体实现。
pub mod models;
pub mod repositories;
pub mod services;
