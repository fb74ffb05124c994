// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

/// 随机延迟区间（毫秒，闭区间）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    /// 创建延迟区间，上下界颠倒时自动交换
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        if min_ms <= max_ms {
            Self { min_ms, max_ms }
        } else {
            Self {
                min_ms: max_ms,
                max_ms: min_ms,
            }
        }
    }

    /// 不等待
    pub fn zero() -> Self {
        Self::new(0, 0)
    }

    pub fn is_zero(&self) -> bool {
        self.max_ms == 0
    }

    /// 在区间内均匀取样
    pub fn sample(&self) -> Duration {
        if self.min_ms == self.max_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rand::random_range(self.min_ms..=self.max_ms))
    }

    /// 取样并等待
    pub async fn wait(&self) {
        if self.is_zero() {
            return;
        }
        tokio::time::sleep(self.sample()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_stay_in_range() {
        let range = DelayRange::new(500, 1500);
        for _ in 0..100 {
            let d = range.sample();
            assert!(d >= Duration::from_millis(500) && d <= Duration::from_millis(1500));
        }
    }

    #[test]
    fn test_inverted_bounds_are_swapped() {
        assert_eq!(DelayRange::new(900, 100), DelayRange::new(100, 900));
    }

    #[tokio::test]
    async fn test_zero_range_returns_immediately() {
        let range = DelayRange::zero();
        assert!(range.is_zero());
        assert_eq!(range.sample(), Duration::ZERO);
        range.wait().await;
    }
}
