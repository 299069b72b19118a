//! 命令行参数定义
//!
//! 使用clap定义应用程序的命令行接口

use crate::config::CheckPolicy;
use crate::logging::LogConfig;
use crate::output::OutputFormat;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Health Checker - 并发HTTP端点可用性检测工具
#[derive(Parser, Debug, Clone)]
#[command(
    name = "health-checker",
    version = crate::VERSION,
    about = crate::APP_DESCRIPTION,
    long_about = None
)]
pub struct Args {
    /// 要检测的URL列表
    #[arg(value_name = "URLS", help = "要检测的URL列表")]
    pub urls: Vec<String>,

    /// URL列表文件，每行一个URL
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "URL列表文件（每行一个，#开头为注释）"
    )]
    pub file: Option<PathBuf>,

    /// 单次请求超时时间
    #[arg(
        short,
        long,
        value_name = "DURATION",
        value_parser = humantime::parse_duration,
        help = "单次请求超时时间，如 10s、500ms [默认: 10s]"
    )]
    pub timeout: Option<Duration>,

    /// 最大并发检测数
    #[arg(
        short,
        long,
        value_name = "N",
        help = "最大并发检测数 [默认: 5]"
    )]
    pub concurrent: Option<usize>,

    /// 失败重试次数
    #[arg(short, long, value_name = "N", help = "失败重试次数 [默认: 1]")]
    pub retries: Option<u32>,

    /// 输出格式
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, help = "输出格式")]
    pub format: OutputFormat,

    /// 客户端标识
    #[arg(
        long,
        value_name = "STRING",
        help = "请求使用的User-Agent [默认: HealthChecker/1.0]"
    )]
    pub user_agent: Option<String>,

    /// 策略文件路径
    #[arg(
        long,
        value_name = "FILE",
        help = "策略文件路径",
        env = "HEALTH_CHECKER_CONFIG"
    )]
    pub config: Option<PathBuf>,

    /// 日志级别
    #[arg(
        short,
        long,
        value_enum,
        default_value = "warn",
        help = "日志级别",
        env = "HEALTH_CHECKER_LOG_LEVEL"
    )]
    pub log_level: LogLevel,

    /// 日志格式
    #[arg(
        long,
        value_enum,
        default_value = "text",
        help = "日志格式",
        env = "HEALTH_CHECKER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// 日志文件路径
    #[arg(
        long,
        value_name = "FILE",
        help = "日志文件路径（不指定时写标准错误）",
        env = "HEALTH_CHECKER_LOG_FILE"
    )]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// 是否提供了任何端点来源
    pub fn has_endpoint_source(&self) -> bool {
        !self.urls.is_empty() || self.file.is_some()
    }

    /// 根据日志相关参数构建日志配置
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.log_level.clone().into(),
            file_path: self.log_file.clone(),
            json_format: self.log_format == LogFormat::Json,
        }
    }

    /// 用显式给出的命令行参数覆盖基础策略
    ///
    /// # 参数
    /// * `base` - 来自策略文件或默认值的策略
    ///
    /// # 返回
    /// * `CheckPolicy` - 合并后的策略
    pub fn apply_overrides(&self, base: CheckPolicy) -> CheckPolicy {
        CheckPolicy {
            per_attempt_timeout: self.timeout.unwrap_or(base.per_attempt_timeout),
            max_concurrency: self.concurrent.unwrap_or(base.max_concurrency),
            max_retries: self.retries.unwrap_or(base.max_retries),
            user_agent: self.user_agent.clone().unwrap_or(base.user_agent),
        }
    }
}

/// 日志级别枚举
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum LogLevel {
    /// 调试级别
    Debug,
    /// 信息级别
    Info,
    /// 警告级别
    Warn,
    /// 错误级别
    Error,
}

/// 日志格式枚举
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// 文本格式
    Text,
    /// JSON格式
    Json,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}
