//! 配置数据结构定义
//!
//! 定义检测策略和策略文件的结构体及验证逻辑

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 默认的客户端标识
pub const DEFAULT_USER_AGENT: &str = "HealthChecker/1.0";

/// 检测策略，在一次运行期间保持不变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckPolicy {
    /// 单次尝试超时时间
    pub per_attempt_timeout: Duration,
    /// 同时进行的最大检测数
    pub max_concurrency: usize,
    /// 首次失败后的额外重试次数
    pub max_retries: u32,
    /// 作为 User-Agent 发送的客户端标识
    pub user_agent: String,
}

impl Default for CheckPolicy {
    fn default() -> Self {
        Self {
            per_attempt_timeout: Duration::from_secs(default_timeout()),
            max_concurrency: default_max_concurrency(),
            max_retries: default_max_retries(),
            user_agent: default_user_agent(),
        }
    }
}

impl CheckPolicy {
    /// 验证策略
    ///
    /// # 返回
    /// * `Result<(), ConfigError>` - 并发数为0或超时为0时返回错误
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency(self.max_concurrency));
        }

        if self.per_attempt_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(self.per_attempt_timeout));
        }

        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "User-Agent 不能为空".to_string(),
            ));
        }

        Ok(())
    }

    /// 整批检测的总截止时长
    ///
    /// 等于单次超时乘以端点数量。批次很大时这个上限会变得非常宽松，
    /// 这里保留该策略，只做饱和运算防止溢出。
    ///
    /// # 参数
    /// * `endpoint_count` - 端点数量
    ///
    /// # 返回
    /// * `Duration` - 从批次开始计算的总时长
    pub fn batch_deadline(&self, endpoint_count: usize) -> Duration {
        let count = u32::try_from(endpoint_count).unwrap_or(u32::MAX);
        self.per_attempt_timeout.saturating_mul(count)
    }

    /// 可执行的最大尝试次数
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// 策略文件的顶层结构
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PolicyFile {
    /// 检测策略
    #[serde(default)]
    pub policy: PolicySection,
}

/// 策略文件中的 `[policy]` 段
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicySection {
    /// 单次尝试超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// 最大并发检测数
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// 失败重试次数
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// 客户端标识
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for PolicySection {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_concurrency: default_max_concurrency(),
            max_retries: default_max_retries(),
            user_agent: default_user_agent(),
        }
    }
}

impl From<PolicySection> for CheckPolicy {
    fn from(section: PolicySection) -> Self {
        Self {
            per_attempt_timeout: Duration::from_secs(section.timeout_seconds),
            max_concurrency: section.max_concurrency,
            max_retries: section.max_retries,
            user_agent: section.user_agent,
        }
    }
}

// 默认值函数
fn default_timeout() -> u64 {
    10
}
fn default_max_concurrency() -> usize {
    5
}
fn default_max_retries() -> u32 {
    1
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// 策略文件验证函数
///
/// # 参数
/// * `file` - 要验证的策略文件
///
/// # 返回
/// * `Result<(), String>` - 验证结果，错误时返回错误信息
pub fn validate_policy_file(file: &PolicyFile) -> Result<(), String> {
    if file.policy.timeout_seconds == 0 {
        return Err("请求超时时间不能为0".to_string());
    }

    if file.policy.max_concurrency == 0 {
        return Err("最大并发检测数不能为0".to_string());
    }

    if file.policy.user_agent.trim().is_empty() {
        return Err("User-Agent 不能为空".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let policy = CheckPolicy::default();

        assert_eq!(policy.per_attempt_timeout, Duration::from_secs(10));
        assert_eq!(policy.max_concurrency, 5);
        assert_eq!(policy.max_retries, 1);
        assert_eq!(policy.user_agent, "HealthChecker/1.0");
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_concurrency() {
        let policy = CheckPolicy {
            max_concurrency: 0,
            ..CheckPolicy::default()
        };

        assert_eq!(policy.validate(), Err(ConfigError::InvalidConcurrency(0)));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let policy = CheckPolicy {
            per_attempt_timeout: Duration::ZERO,
            ..CheckPolicy::default()
        };

        assert!(matches!(
            policy.validate(),
            Err(ConfigError::InvalidTimeout(_))
        ));
    }

    #[test]
    fn test_batch_deadline_scales_with_endpoints() {
        let policy = CheckPolicy {
            per_attempt_timeout: Duration::from_secs(2),
            ..CheckPolicy::default()
        };

        assert_eq!(policy.batch_deadline(1), Duration::from_secs(2));
        assert_eq!(policy.batch_deadline(5), Duration::from_secs(10));
    }

    #[test]
    fn test_batch_deadline_saturates() {
        let policy = CheckPolicy {
            per_attempt_timeout: Duration::MAX,
            ..CheckPolicy::default()
        };

        assert_eq!(policy.batch_deadline(3), Duration::MAX);
    }

    #[test]
    fn test_max_attempts() {
        let policy = CheckPolicy {
            max_retries: 3,
            ..CheckPolicy::default()
        };
        assert_eq!(policy.max_attempts(), 4);
    }

    #[test]
    fn test_policy_file_serialization() {
        let file = PolicyFile {
            policy: PolicySection {
                timeout_seconds: 5,
                max_concurrency: 20,
                max_retries: 2,
                user_agent: "custom-agent/2.0".to_string(),
            },
        };

        let serialized = toml::to_string(&file).expect("序列化失败");
        assert!(serialized.contains("max_concurrency = 20"));

        let deserialized: PolicyFile = toml::from_str(&serialized).expect("反序列化失败");
        assert_eq!(deserialized, file);
    }

    #[test]
    fn test_policy_section_defaults_from_empty_toml() {
        let file: PolicyFile = toml::from_str("").expect("解析失败");
        let policy = CheckPolicy::from(file.policy);

        assert_eq!(policy, CheckPolicy::default());
    }

    #[test]
    fn test_validate_policy_file() {
        let mut file = PolicyFile::default();
        assert!(validate_policy_file(&file).is_ok());

        file.policy.max_concurrency = 0;
        let result = validate_policy_file(&file);
        assert!(result.unwrap_err().contains("最大并发检测数不能为0"));

        file.policy.max_concurrency = 1;
        file.policy.timeout_seconds = 0;
        let result = validate_policy_file(&file);
        assert!(result.unwrap_err().contains("请求超时时间不能为0"));
    }
}
