//! 检测统计信息

use crate::health::result::CheckResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 一批检测结果的统计信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckStats {
    /// 总检测数
    pub total: usize,
    /// 成功数
    pub success_count: usize,
    /// 失败数
    pub error_count: usize,
    /// 总耗时
    pub total_duration: Duration,
    /// 平均耗时
    pub average_duration: Duration,
    /// 最短耗时
    pub min_duration: Option<Duration>,
    /// 最长耗时
    pub max_duration: Option<Duration>,
    /// 成功率（百分比）
    pub success_rate: f64,
}

impl CheckStats {
    /// 根据检测结果计算统计信息
    pub fn from_results(results: &[CheckResult]) -> Self {
        let mut stats = Self::default();
        for result in results {
            stats.update(result);
        }
        stats
    }

    /// 累加一个检测结果
    pub fn update(&mut self, result: &CheckResult) {
        self.total += 1;
        if result.is_success() {
            self.success_count += 1;
        } else {
            self.error_count += 1;
        }

        self.total_duration = self.total_duration.saturating_add(result.duration);
        self.min_duration = Some(
            self.min_duration
                .map_or(result.duration, |min| min.min(result.duration)),
        );
        self.max_duration = Some(
            self.max_duration
                .map_or(result.duration, |max| max.max(result.duration)),
        );

        let count = u32::try_from(self.total).unwrap_or(u32::MAX);
        self.average_duration = self.total_duration / count;
        self.success_rate = self.success_count as f64 / self.total as f64 * 100.0;
    }

    /// 是否所有检测都成功
    pub fn all_succeeded(&self) -> bool {
        self.total > 0 && self.error_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(success: bool, millis: u64) -> CheckResult {
        let duration = Duration::from_millis(millis);
        if success {
            CheckResult::success("https://example.com".to_string(), 200, duration, 1)
        } else {
            CheckResult::failure(
                "https://example.com".to_string(),
                Some(500),
                String::new(),
                duration,
                1,
            )
        }
    }

    #[test]
    fn test_stats_over_mixed_results() {
        let stats = CheckStats::from_results(&[result(true, 100), result(false, 200)]);

        assert_eq!(stats.total, 2);
        assert_eq!(stats.success_count, 1);
        assert_eq!(stats.error_count, 1);
        assert_eq!(stats.average_duration, Duration::from_millis(150));
        assert_eq!(stats.total_duration, Duration::from_millis(300));
        assert_eq!(stats.min_duration, Some(Duration::from_millis(100)));
        assert_eq!(stats.max_duration, Some(Duration::from_millis(200)));
        assert_eq!(stats.success_rate, 50.0);
        assert!(!stats.all_succeeded());
    }

    #[test]
    fn test_stats_empty() {
        let stats = CheckStats::from_results(&[]);

        assert_eq!(stats.total, 0);
        assert_eq!(stats.success_rate, 0.0);
        assert_eq!(stats.average_duration, Duration::ZERO);
        assert!(stats.min_duration.is_none());
        assert!(!stats.all_succeeded());
    }

    #[test]
    fn test_stats_incremental_update() {
        let mut stats = CheckStats::default();

        stats.update(&result(true, 100));
        assert_eq!(stats.success_rate, 100.0);
        assert_eq!(stats.average_duration, Duration::from_millis(100));
        assert!(stats.all_succeeded());

        stats.update(&result(true, 300));
        stats.update(&result(false, 200));
        assert_eq!(stats.total, 3);
        assert_eq!(stats.average_duration, Duration::from_millis(200));
        assert!((stats.success_rate - 66.666).abs() < 0.01);
    }
}
