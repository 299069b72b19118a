//! Health Checker - 并发HTTP端点可用性检测工具
//!
//! 这是一个用Rust编写的批量端点检测工具，支持：
//! - 地址规范化与带退避的失败重试
//! - 有界并发调度，每个端点恰好一个结果
//! - 表格、JSON、CSV和简单文本输出
//! - 结构化日志记录

pub mod cli;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod output;

// 重新导出主要类型
pub use config::CheckPolicy;
pub use error::HealthCheckerError;
pub use health::{CheckOutcome, CheckResult, CheckScheduler, CheckStats, HttpChecker};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
