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

use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::trace;

/// 准入闸门错误类型
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GateError {
    /// 容量为 0 的闸门永远不会放行
    #[error("Admission gate `{0}` must have a capacity of at least 1")]
    ZeroCapacity(&'static str),
    /// 闸门已关闭
    #[error("Admission gate `{0}` is closed")]
    Closed(&'static str),
}

/// 并发准入闸门
///
/// 计数信号量，限制同时进行的操作数量。等待者按到达顺序（FIFO）被放行。
/// 克隆出的实例共享同一组许可。
#[derive(Clone, Debug)]
pub struct AdmissionGate {
    /// 闸门名称，用于日志
    name: &'static str,
    /// 共享的信号量
    semaphore: Arc<Semaphore>,
    /// 总容量
    capacity: usize,
}

impl AdmissionGate {
    /// 创建一个新的准入闸门
    ///
    /// # 参数
    ///
    /// * `name` - 闸门名称
    /// * `capacity` - 同时放行的最大数量
    ///
    /// # 返回值
    ///
    /// * `Ok(AdmissionGate)` - 新的闸门
    /// * `Err(GateError)` - 容量为 0
    pub fn new(name: &'static str, capacity: usize) -> Result<Self, GateError> {
        if capacity == 0 {
            return Err(GateError::ZeroCapacity(name));
        }

        Ok(Self {
            name,
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        })
    }

    /// 等待并获取一个许可
    ///
    /// 许可在被 drop 时归还
    pub async fn admit(&self) -> Result<OwnedSemaphorePermit, GateError> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| GateError::Closed(self.name))?;
        trace!(gate = self.name, in_flight = self.in_flight(), "admitted");
        Ok(permit)
    }

    /// 在持有许可期间执行 `work`
    pub async fn run<F, T>(&self, work: F) -> Result<T, GateError>
    where
        F: Future<Output = T>,
    {
        let _permit = self.admit().await?;
        Ok(work.await)
    }

    /// 关闭闸门，所有等待者和后续请求都会失败
    pub fn close(&self) {
        self.semaphore.close();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 当前被占用的许可数量
    pub fn in_flight(&self) -> usize {
        self.capacity - self.semaphore.available_permits()
    }
}
