//! 统计信息输出

use crate::error::Result;
use crate::health::{CheckResult, CheckStats};
use crate::output::format_duration;
use std::io::Write;

/// 输出统计信息块，结果为空时不输出
pub fn render_stats<W: Write>(results: &[CheckResult], writer: &mut W) -> Result<()> {
    if results.is_empty() {
        return Ok(());
    }

    let stats = CheckStats::from_results(results);

    writeln!(writer, "\n{}", "=".repeat(50))?;
    writeln!(writer, "统计信息:")?;
    writeln!(writer, "  总检测数: {}", stats.total)?;
    writeln!(writer, "  成功: {}", stats.success_count)?;
    writeln!(writer, "  失败: {}", stats.error_count)?;
    writeln!(writer, "  平均耗时: {}", format_duration(stats.average_duration))?;
    writeln!(writer, "  总耗时: {}", format_duration(stats.total_duration))?;
    writeln!(writer, "  成功率: {:.1}%", stats.success_rate)?;

    Ok(())
}
