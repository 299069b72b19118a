//! 错误处理模块
//!
//! 定义应用程序的统一错误类型

use std::time::Duration;
use thiserror::Error;

/// Health Checker 应用程序的主要错误类型
#[derive(Error, Debug)]
pub enum HealthCheckerError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 健康检测相关错误
    #[error("健康检测错误: {0}")]
    Check(#[from] CheckError),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON序列化错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV输出错误
    #[error("CSV错误: {0}")]
    Csv(#[from] csv::Error),

    /// 其他错误
    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

/// 配置错误类型
///
/// 配置错误在任何检测开始之前返回给调用方，整个批次随之终止。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// 没有任何待检测的端点
    #[error("端点列表为空")]
    EmptyEndpoints,

    /// 并发数必须为正数
    #[error("并发数无效: {0}，必须大于0")]
    InvalidConcurrency(usize),

    /// 单次尝试超时不能为0
    #[error("超时时间无效: {0:?}")]
    InvalidTimeout(Duration),

    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    ParseError(String),

    /// 配置验证错误
    #[error("配置验证失败: {0}")]
    ValidationError(String),

    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVarError { var: String },
}

/// 单次尝试的错误类型
///
/// 这些错误从不向上传播终止批次，只会被折叠进对应端点的检测结果。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// 传输层失败（连接拒绝、DNS、TLS、请求构建失败等）
    #[error("{0}")]
    Transport(String),

    /// 单次尝试超时
    #[error("request timeout after {}ms", .0.as_millis())]
    AttemptTimeout(Duration),

    /// 整体批次截止时间已到
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl CheckError {
    /// 是否为超时类错误（单次超时或整体截止）
    ///
    /// 超时类错误会立即终止该端点剩余的重试。
    pub fn is_deadline(&self) -> bool {
        matches!(self, CheckError::AttemptTimeout(_) | CheckError::DeadlineExceeded)
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, HealthCheckerError>;
