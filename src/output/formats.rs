//! 四种结果渲染器

use crate::error::Result;
use crate::health::CheckResult;
use crate::output::format_duration;
use chrono::SecondsFormat;
use colored::Colorize;
use std::io::Write;

const TABLE_HEADERS: [&str; 5] = ["URL", "Status", "Code", "Duration", "Attempts"];
const CSV_HEADERS: [&str; 6] = ["URL", "Status", "StatusCode", "Duration", "Timestamp", "Attempts"];

/// 表格格式输出，状态列按成功/失败着色
pub fn render_table<W: Write>(results: &[CheckResult], writer: &mut W) -> Result<()> {
    if results.is_empty() {
        return Ok(());
    }

    let rows: Vec<[String; 5]> = results
        .iter()
        .map(|r| {
            [
                r.endpoint.clone(),
                r.outcome.label().to_string(),
                r.outcome
                    .status_code()
                    .map(|c| c.to_string())
                    .unwrap_or_default(),
                format_duration(r.duration),
                r.attempts.to_string(),
            ]
        })
        .collect();

    let mut widths = TABLE_HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header = TABLE_HEADERS
        .iter()
        .zip(widths.iter())
        .map(|(title, &width)| format!("{title:<width$}").green().underline().to_string())
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(writer, "{header}")?;

    for (row, result) in rows.iter().zip(results) {
        let url = format!("{:<width$}", row[0], width = widths[0]).yellow();
        let status = format!("{:<width$}", row[1], width = widths[1]);
        let status = if result.is_success() {
            status.green()
        } else {
            status.red()
        };
        writeln!(
            writer,
            "{}  {}  {:<w2$}  {:<w3$}  {}",
            url,
            status,
            row[2],
            row[3],
            row[4],
            w2 = widths[2],
            w3 = widths[3],
        )?;
    }

    Ok(())
}

/// JSON格式输出，带缩进的数组
pub fn render_json<W: Write>(results: &[CheckResult], writer: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, results)?;
    writeln!(writer)?;
    Ok(())
}

/// CSV格式输出，首行为表头，时间戳为RFC3339
pub fn render_csv<W: Write>(results: &[CheckResult], writer: &mut W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADERS)?;

    for r in results {
        wtr.write_record([
            r.endpoint.clone(),
            r.outcome.label().to_string(),
            r.outcome
                .status_code()
                .map(|c| c.to_string())
                .unwrap_or_default(),
            format_duration(r.duration),
            r.completed_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            r.attempts.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// 简单文本输出，每个结果一行，有错误时追加一行错误信息
pub fn render_simple<W: Write>(results: &[CheckResult], writer: &mut W) -> Result<()> {
    for r in results {
        let icon = if r.is_success() { "✓" } else { "✗" };
        writeln!(
            writer,
            "{} {} - {} (took {})",
            icon,
            r.endpoint,
            r.outcome,
            format_duration(r.duration)
        )?;

        if let Some(error) = r.outcome.error_message() {
            writeln!(writer, "  Error: {error}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use std::time::Duration;

    fn sample_results() -> Vec<CheckResult> {
        let completed_at = DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        vec![
            CheckResult::success(
                "https://example.com".to_string(),
                200,
                Duration::from_millis(120),
                1,
            )
            .with_completed_at(completed_at),
            CheckResult::failure(
                "https://down.example".to_string(),
                None,
                "Connection refused".to_string(),
                Duration::from_millis(1530),
                2,
            )
            .with_completed_at(completed_at),
            CheckResult::failure(
                "https://missing.example".to_string(),
                Some(404),
                String::new(),
                Duration::from_millis(80),
                1,
            )
            .with_completed_at(completed_at),
        ]
    }

    fn to_string<F>(render: F) -> String
    where
        F: FnOnce(&[CheckResult], &mut Vec<u8>) -> Result<()>,
    {
        let mut buffer = Vec::new();
        render(&sample_results(), &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_render_csv() {
        let output = to_string(|r, w| render_csv(r, w));
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "URL,Status,StatusCode,Duration,Timestamp,Attempts");
        assert_eq!(
            lines[1],
            "https://example.com,success,200,120ms,2024-05-01T10:00:00Z,1"
        );
        assert_eq!(
            lines[2],
            "https://down.example,error,,1s 530ms,2024-05-01T10:00:00Z,2"
        );
        assert_eq!(
            lines[3],
            "https://missing.example,error,404,80ms,2024-05-01T10:00:00Z,1"
        );
    }

    #[test]
    fn test_render_json() {
        let output = to_string(|r, w| render_json(r, w));
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["status"], "success");
        assert_eq!(items[1]["error"], "Connection refused");
        assert_eq!(items[2]["status_code"], 404);
        assert!(output.contains("\n  "));
    }

    #[test]
    fn test_render_simple() {
        let output = to_string(|r, w| render_simple(r, w));

        assert!(output.contains("✓ https://example.com - success (took 120ms)"));
        assert!(output.contains("✗ https://down.example - error (took 1s 530ms)"));
        assert!(output.contains("  Error: Connection refused"));
        // HTTP错误状态没有错误信息行
        assert_eq!(output.matches("Error:").count(), 1);
    }

    #[test]
    fn test_render_table() {
        let output = to_string(|r, w| render_table(r, w));
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("URL"));
        assert!(lines[0].contains("Attempts"));
        assert!(lines[1].contains("https://example.com"));
        assert!(lines[1].contains("success"));
        assert!(lines[3].contains("404"));
    }

    #[test]
    fn test_render_table_empty() {
        let mut buffer = Vec::new();
        render_table(&[], &mut buffer).unwrap();
        assert!(buffer.is_empty());
    }
}
