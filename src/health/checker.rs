//! 单端点检测执行器
//!
//! 对一个端点执行带重试的检测，超时和整体截止时间由这里统一处理

use crate::config::CheckPolicy;
use crate::error::CheckError;
use crate::health::result::CheckResult;
use crate::health::transport::Transport;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep_until, timeout_at, Instant};
use tracing::debug;

/// 线性退避的基础间隔
pub const BACKOFF_STEP: Duration = Duration::from_millis(500);

/// 大于等于该状态码的响应视为失败
const FAILURE_STATUS_THRESHOLD: u16 = 400;

/// 端点检测器trait，定义检测接口
#[async_trait]
pub trait EndpointChecker: Send + Sync {
    /// 执行一次完整检测（含重试）
    ///
    /// # 参数
    /// * `endpoint` - 规范化后的端点地址
    /// * `policy` - 检测策略
    /// * `deadline` - 整批共享的截止时间
    ///
    /// # 返回
    /// * `CheckResult` - 检测结果，任何失败都折叠进结果中
    async fn check(&self, endpoint: &str, policy: &CheckPolicy, deadline: Instant) -> CheckResult;
}

/// HTTP检测执行器
///
/// 不持有任何可变共享状态，可以被多个工作者同时调用。
pub struct HttpChecker {
    /// 出站传输
    transport: Arc<dyn Transport>,
}

impl HttpChecker {
    /// 创建新的HTTP检测执行器
    ///
    /// # 参数
    /// * `transport` - 出站传输实现
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// 执行单次尝试
    ///
    /// 单次超时和整体截止时间中先到者终止本次尝试。收到响应头之后，
    /// 响应体读取由传输层在同一时限内收尾，状态码不会因此丢失。
    async fn attempt(
        &self,
        endpoint: &str,
        policy: &CheckPolicy,
        deadline: Instant,
    ) -> Result<u16, CheckError> {
        let now = Instant::now();
        let (limit, expiry) = match now.checked_add(policy.per_attempt_timeout) {
            Some(attempt_deadline) if attempt_deadline < deadline => (
                attempt_deadline,
                CheckError::AttemptTimeout(policy.per_attempt_timeout),
            ),
            _ => (deadline, CheckError::DeadlineExceeded),
        };

        let fetch = self.transport.fetch(endpoint, &policy.user_agent, limit);
        match timeout_at(limit, fetch).await {
            Ok(result) => result,
            Err(_) => Err(expiry),
        }
    }

    /// 按已失败的尝试序号计算退避时间
    ///
    /// 第 `attempt_index` 次（从0开始）尝试失败后等待 `(attempt_index + 1) * 500ms`。
    pub fn backoff_delay(attempt_index: u32) -> Duration {
        BACKOFF_STEP.saturating_mul(attempt_index.saturating_add(1))
    }
}

#[async_trait]
impl EndpointChecker for HttpChecker {
    async fn check(&self, endpoint: &str, policy: &CheckPolicy, deadline: Instant) -> CheckResult {
        let start = Instant::now();
        let max_attempts = policy.max_attempts();
        let mut attempts = 0u32;

        loop {
            if Instant::now() >= deadline {
                debug!("端点 {} 在第 {} 次尝试前到达截止时间", endpoint, attempts + 1);
                return CheckResult::failure(
                    endpoint.to_string(),
                    None,
                    CheckError::DeadlineExceeded.to_string(),
                    start.elapsed(),
                    attempts,
                );
            }

            attempts += 1;
            debug!("检测端点 {} 第 {}/{} 次尝试", endpoint, attempts, max_attempts);

            let error = match self.attempt(endpoint, policy, deadline).await {
                Ok(status_code) if status_code < FAILURE_STATUS_THRESHOLD => {
                    return CheckResult::success(
                        endpoint.to_string(),
                        status_code,
                        start.elapsed(),
                        attempts,
                    );
                }
                Ok(status_code) => {
                    // HTTP错误状态是有效结果，不重试
                    return CheckResult::failure(
                        endpoint.to_string(),
                        Some(status_code),
                        String::new(),
                        start.elapsed(),
                        attempts,
                    );
                }
                Err(error) => error,
            };

            if error.is_deadline() || attempts >= max_attempts {
                debug!("端点检测失败: {} - {}", endpoint, error);
                return CheckResult::failure(
                    endpoint.to_string(),
                    None,
                    error.to_string(),
                    start.elapsed(),
                    attempts,
                );
            }

            let wake_at = Instant::now() + Self::backoff_delay(attempts - 1);
            if wake_at >= deadline {
                sleep_until(deadline).await;
                debug!("端点在退避等待中到达截止时间: {}", endpoint);
                return CheckResult::failure(
                    endpoint.to_string(),
                    None,
                    CheckError::DeadlineExceeded.to_string(),
                    start.elapsed(),
                    attempts,
                );
            }

            debug!("端点 {} 尝试失败: {}，等待后重试", endpoint, error);
            sleep_until(wake_at).await;
        }
    }
}
