//! Health Checker 主程序入口
//!
//! 并发HTTP端点可用性检测工具

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use health_checker::cli::{Args, CheckCommand, Command};
use health_checker::logging::LoggingSystem;
use tracing::{debug, error};

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let args = Args::parse();

    // 初始化日志系统，默认写到标准错误
    let _logging_system =
        LoggingSystem::setup_logging(args.log_config()).context("初始化日志系统失败")?;

    debug!("{} v{} 启动", health_checker::APP_NAME, health_checker::VERSION);

    if !args.has_endpoint_source() {
        eprintln!("{}", Args::command().render_usage());
        eprintln!("错误: 至少需要提供一个URL，或使用 --file 指定URL列表文件");
        std::process::exit(1);
    }

    if let Err(e) = CheckCommand.execute(&args).await {
        error!("检测执行失败: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
