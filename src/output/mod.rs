//! 结果输出模块
//!
//! 将已经计算完成的检测结果渲染为表格、JSON、CSV或简单文本

pub mod formats;
pub mod summary;

use crate::error::Result;
use crate::health::CheckResult;
use clap::ValueEnum;
use std::io::Write;

pub use formats::{render_csv, render_json, render_simple, render_table};
pub use summary::render_stats;

/// 输出格式枚举
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// 表格格式
    #[default]
    Table,
    /// JSON格式
    Json,
    /// CSV格式
    Csv,
    /// 简单文本格式
    Simple,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Simple => write!(f, "simple"),
        }
    }
}

/// 按指定格式渲染检测结果
///
/// # 参数
/// * `format` - 输出格式
/// * `results` - 检测结果
/// * `writer` - 输出目标
pub fn render<W: Write>(
    format: OutputFormat,
    results: &[CheckResult],
    writer: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Table => render_table(results, writer),
        OutputFormat::Json => render_json(results, writer),
        OutputFormat::Csv => render_csv(results, writer),
        OutputFormat::Simple => render_simple(results, writer),
    }
}

/// 四舍五入到毫秒后格式化耗时
pub(crate) fn format_duration(duration: std::time::Duration) -> String {
    let rounded = std::time::Duration::from_millis(
        ((duration.as_micros() + 500) / 1000).min(u64::MAX as u128) as u64,
    );
    humantime::format_duration(rounded).to_string()
}
