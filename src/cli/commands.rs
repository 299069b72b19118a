//! CLI命令实现
//!
//! 把命令行参数、策略文件和URL来源组装成一次批量检测

use crate::cli::args::Args;
use crate::config::{
    get_default_config_path, CheckPolicy, PolicyLoader, TomlPolicyLoader, UrlListLoader,
};
use crate::error::{HealthCheckerError, Result};
use crate::health::{CheckResult, CheckScheduler, CheckStats, HttpChecker, ReqwestTransport};
use crate::logging::LoggingSystem;
use crate::output::{render, render_stats};
use async_trait::async_trait;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// 命令处理器trait
#[async_trait]
pub trait Command: Send + Sync {
    /// 执行命令
    async fn execute(&self, args: &Args) -> Result<()>;
}

/// 检测命令
pub struct CheckCommand;

#[async_trait]
impl Command for CheckCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        let results = self.perform_health_check(args).await?;

        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.write_report(args, &results, &mut handle)
    }
}

impl CheckCommand {
    /// 执行一次批量检测
    ///
    /// # 参数
    /// * `args` - 命令行参数
    ///
    /// # 返回
    /// * `Result<Vec<CheckResult>>` - 与输入端点一一对应的检测结果
    pub async fn perform_health_check(&self, args: &Args) -> Result<Vec<CheckResult>> {
        let policy = self.resolve_policy(args).await?;
        let endpoints = self.collect_endpoints(args).await?;

        let transport = ReqwestTransport::new()?;
        let checker = HttpChecker::new(Arc::new(transport));

        let logging = Arc::new(LoggingSystem::new(
            LoggingSystem::current_config().unwrap_or_default(),
        ));
        let scheduler = CheckScheduler::new(Arc::new(checker), policy).with_result_callback(
            Arc::new(move |result: &CheckResult| logging.check_result_log(result)),
        );

        let policy = scheduler.policy();
        info!(
            "开始检测 {} 个端点 (并发 {}, 超时 {:?}, 重试 {})",
            endpoints.len(),
            policy.max_concurrency,
            policy.per_attempt_timeout,
            policy.max_retries
        );

        let results = scheduler.check_all(&endpoints).await?;

        let stats = CheckStats::from_results(&results);
        if stats.all_succeeded() {
            info!("检测完成，{} 个端点全部可用", stats.total);
        } else {
            info!("检测完成，{} 个端点中 {} 个失败", stats.total, stats.error_count);
        }
        Ok(results)
    }

    /// 按输出格式写出结果和统计信息
    pub fn write_report<W: Write>(
        &self,
        args: &Args,
        results: &[CheckResult],
        writer: &mut W,
    ) -> Result<()> {
        render(args.format, results, writer)?;
        render_stats(results, writer)?;
        writer.flush()?;
        Ok(())
    }

    /// 合并策略文件和命令行参数
    ///
    /// 显式指定的策略文件必须存在；未指定时仅在默认路径存在文件时加载。
    pub async fn resolve_policy(&self, args: &Args) -> Result<CheckPolicy> {
        let config_path: Option<PathBuf> = match &args.config {
            Some(path) => Some(path.clone()),
            None => {
                let default_path = get_default_config_path();
                default_path.exists().then_some(default_path)
            }
        };

        let base = match config_path {
            Some(path) => {
                let loader = TomlPolicyLoader::new(true);
                let file = loader.load_from_file(&path).await?;
                debug!("使用策略文件: {}", path.display());
                CheckPolicy::from(file.policy)
            }
            None => CheckPolicy::default(),
        };

        let policy = args.apply_overrides(base);
        policy.validate()?;
        Ok(policy)
    }

    /// 收集命令行和URL文件中的端点，命令行中的URL在前
    pub async fn collect_endpoints(&self, args: &Args) -> Result<Vec<String>> {
        let mut endpoints = args.urls.clone();

        if let Some(file) = &args.file {
            let from_file = UrlListLoader
                .load_from_file(file)
                .await
                .map_err(|e| match e {
                    HealthCheckerError::Io(io) => HealthCheckerError::Other(anyhow::anyhow!(
                        "读取URL文件 {} 失败: {}",
                        file.display(),
                        io
                    )),
                    other => other,
                })?;
            endpoints.extend(from_file);
        }

        Ok(endpoints)
    }
}
