//! 健康检测结果数据结构
//!
//! 定义单个端点检测的结果类型和结果状态

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 检测结果状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CheckOutcome {
    /// 收到状态码小于400的响应
    Success {
        /// HTTP状态码
        status_code: u16,
    },
    /// 传输失败、超时或状态码大于等于400
    #[serde(rename = "error")]
    Failure {
        /// 仅在收到响应且状态码 >= 400 时存在
        status_code: Option<u16>,
        /// 错误信息，HTTP错误状态时为空
        error: String,
    },
}

impl CheckOutcome {
    /// 判断是否成功
    pub fn is_success(&self) -> bool {
        matches!(self, CheckOutcome::Success { .. })
    }

    /// 获取HTTP状态码（如果有）
    pub fn status_code(&self) -> Option<u16> {
        match self {
            CheckOutcome::Success { status_code } => Some(*status_code),
            CheckOutcome::Failure { status_code, .. } => *status_code,
        }
    }

    /// 获取错误信息，空字符串视为没有错误信息
    pub fn error_message(&self) -> Option<&str> {
        match self {
            CheckOutcome::Failure { error, .. } if !error.is_empty() => Some(error),
            _ => None,
        }
    }

    /// 状态标签，渲染器使用
    pub fn label(&self) -> &'static str {
        match self {
            CheckOutcome::Success { .. } => "success",
            CheckOutcome::Failure { .. } => "error",
        }
    }
}

impl std::fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 单个端点的检测结果
///
/// 每个提交给调度器的端点恰好产生一个结果。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// 实际探测的规范化地址
    pub endpoint: String,
    /// 检测结果状态
    #[serde(flatten)]
    pub outcome: CheckOutcome,
    /// 从首次尝试开始到最后一次尝试结束的耗时（含退避等待）
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// 完成时间
    pub completed_at: DateTime<Utc>,
    /// 实际执行的尝试次数
    pub attempts: u32,
}

impl CheckResult {
    /// 创建新的检测结果
    ///
    /// # 参数
    /// * `endpoint` - 规范化后的端点地址
    /// * `outcome` - 检测结果状态
    /// * `duration` - 总耗时
    /// * `attempts` - 尝试次数
    pub fn new(endpoint: String, outcome: CheckOutcome, duration: Duration, attempts: u32) -> Self {
        Self {
            endpoint,
            outcome,
            duration,
            completed_at: Utc::now(),
            attempts,
        }
    }

    /// 创建成功结果
    pub fn success(endpoint: String, status_code: u16, duration: Duration, attempts: u32) -> Self {
        Self::new(
            endpoint,
            CheckOutcome::Success { status_code },
            duration,
            attempts,
        )
    }

    /// 创建失败结果
    pub fn failure(
        endpoint: String,
        status_code: Option<u16>,
        error: String,
        duration: Duration,
        attempts: u32,
    ) -> Self {
        Self::new(
            endpoint,
            CheckOutcome::Failure { status_code, error },
            duration,
            attempts,
        )
    }

    /// 设置完成时间
    pub fn with_completed_at(mut self, completed_at: DateTime<Utc>) -> Self {
        self.completed_at = completed_at;
        self
    }

    /// 判断是否成功
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// 获取耗时（毫秒）
    pub fn duration_ms(&self) -> u64 {
        self.duration.as_millis() as u64
    }

    /// 转换为JSON字符串
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// 从JSON字符串创建
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Duration序列化模块，以毫秒表示
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
