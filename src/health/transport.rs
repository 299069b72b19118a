//! HTTP传输层
//!
//! 执行器只依赖 [`Transport`] trait，生产环境使用基于 reqwest 的实现，
//! 测试中可以注入脚本化的假实现。

use crate::error::CheckError;
use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::debug;

/// 确认连接可用时最多读取并丢弃的响应体字节数
pub const BODY_READ_LIMIT: usize = 4096;

/// 传输层trait，定义一次出站请求
#[async_trait]
pub trait Transport: Send + Sync {
    /// 对端点发起一次 GET 请求
    ///
    /// 收到响应头后状态码即确定，随后在 `limit` 之前读取并丢弃至多
    /// [`BODY_READ_LIMIT`] 字节的响应体。响应体读取失败或超时不影响返回的状态码。
    /// 等待响应头的超时由调用方负责。
    ///
    /// # 参数
    /// * `endpoint` - 规范化后的端点地址
    /// * `user_agent` - 作为 User-Agent 发送的客户端标识
    /// * `limit` - 本次尝试的截止时间
    ///
    /// # 返回
    /// * `Result<u16, CheckError>` - 状态码或传输错误
    async fn fetch(
        &self,
        endpoint: &str,
        user_agent: &str,
        limit: Instant,
    ) -> Result<u16, CheckError>;
}

/// 基于 reqwest 的传输实现
///
/// 内部的 [`Client`] 自带连接复用池，可以被所有工作者并发使用。
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// 创建新的传输实例
    ///
    /// # 返回
    /// * `Result<Self, CheckError>` - 客户端构建失败时返回错误
    pub fn new() -> Result<Self, CheckError> {
        let client = Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CheckError::Transport(describe_request_error(&e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn fetch(
        &self,
        endpoint: &str,
        user_agent: &str,
        limit: Instant,
    ) -> Result<u16, CheckError> {
        let mut response = self
            .client
            .get(endpoint)
            .header(header::USER_AGENT, user_agent)
            .send()
            .await
            .map_err(|e| CheckError::Transport(describe_request_error(&e)))?;

        let status_code = response.status().as_u16();

        // 读取少量响应体让连接可以回到复用池，结果只用于日志
        let drain = async {
            let mut consumed = 0usize;
            while consumed < BODY_READ_LIMIT {
                match response.chunk().await {
                    Ok(Some(chunk)) => consumed += chunk.len(),
                    Ok(None) => break,
                    Err(e) => return Err(describe_request_error(&e)),
                }
            }
            Ok(consumed)
        };

        match timeout_at(limit, drain).await {
            Ok(Ok(consumed)) => debug!("{} 读取响应体 {} 字节", endpoint, consumed),
            Ok(Err(e)) => debug!(
                "{} 响应体读取失败，按状态码 {} 判定: {}",
                endpoint, status_code, e
            ),
            Err(_) => debug!(
                "{} 响应体读取超时，按状态码 {} 判定",
                endpoint, status_code
            ),
        }

        Ok(status_code)
    }
}

/// 格式化请求错误信息，使其更加清晰易读
pub fn describe_request_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        let detail = error.to_string();
        if detail.contains("dns") || detail.contains("DNS") {
            "DNS resolution failed".to_string()
        } else {
            "Connection refused".to_string()
        }
    } else if error.is_builder() {
        format!("Invalid request: {error}")
    } else if error.is_body() || error.is_decode() {
        "Response body read error".to_string()
    } else {
        let error_str = error.to_string();
        if error_str.contains("certificate")
            || error_str.contains("tls")
            || error_str.contains("ssl")
        {
            "SSL/TLS certificate error".to_string()
        } else {
            format!("Request failed: {error_str}")
        }
    }
}
