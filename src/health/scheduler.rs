//! 任务调度器模块
//!
//! 将一批端点分发到固定数量的工作者上并发检测，
//! 通过信号量限制同时进行的检测数，并把结果汇总为一个列表

use crate::config::CheckPolicy;
use crate::error::{CheckError, ConfigError};
use crate::health::checker::EndpointChecker;
use crate::health::normalize::normalize;
use crate::health::result::CheckResult;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, info, warn};

/// 检测结果回调函数类型
pub type CheckResultCallback = Arc<dyn Fn(&CheckResult) + Send + Sync>;

/// 截止时间无法表示时使用的上限（约30年）
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// 执行器未按时返回时额外等待的宽限时间
const DEADLINE_GRACE: Duration = Duration::from_millis(100);

/// 工作者异常退出时合成结果使用的错误信息
const ABORTED_MESSAGE: &str = "check aborted before reporting";

/// 带编号的待检测端点
type WorkItem = (usize, String);

/// 批量检测调度器
///
/// 每次调用 [`CheckScheduler::check_all`] 都是一次独立的运行，不保留跨运行的状态。
pub struct CheckScheduler {
    /// 端点检测器
    checker: Arc<dyn EndpointChecker>,
    /// 检测策略
    policy: Arc<CheckPolicy>,
    /// 每收到一个结果时调用
    result_callback: Option<CheckResultCallback>,
}

impl CheckScheduler {
    /// 创建新的调度器
    ///
    /// # 参数
    /// * `checker` - 端点检测器
    /// * `policy` - 检测策略
    ///
    /// # 返回
    /// * `Self` - 调度器实例
    pub fn new(checker: Arc<dyn EndpointChecker>, policy: CheckPolicy) -> Self {
        Self {
            checker,
            policy: Arc::new(policy),
            result_callback: None,
        }
    }

    /// 设置检测结果回调
    pub fn with_result_callback(mut self, callback: CheckResultCallback) -> Self {
        self.result_callback = Some(callback);
        self
    }

    /// 获取检测策略
    pub fn policy(&self) -> &CheckPolicy {
        &self.policy
    }

    /// 并发检测所有端点
    ///
    /// 结果按完成顺序排列，每个输入端点恰好对应一个结果。
    ///
    /// # 参数
    /// * `endpoints` - 原始端点字符串列表
    ///
    /// # 返回
    /// * `Result<Vec<CheckResult>, ConfigError>` - 端点列表为空或策略无效时返回错误，
    ///   此时不会发起任何检测
    pub async fn check_all(&self, endpoints: &[String]) -> Result<Vec<CheckResult>, ConfigError> {
        if endpoints.is_empty() {
            return Err(ConfigError::EmptyEndpoints);
        }
        self.policy.validate()?;

        let started = Instant::now();
        let deadline = started
            .checked_add(self.policy.batch_deadline(endpoints.len()))
            .unwrap_or_else(|| started + FAR_FUTURE);

        let normalized: Vec<String> = endpoints.iter().map(|raw| normalize(raw)).collect();
        let total = normalized.len();

        info!(
            "开始批量检测，端点数量: {}，最大并发: {}，重试次数: {}",
            total, self.policy.max_concurrency, self.policy.max_retries
        );

        // 预先填满工作队列，发送端随即关闭，工作者取空队列后退出
        let (work_tx, work_rx) = mpsc::unbounded_channel::<WorkItem>();
        for item in normalized.iter().cloned().enumerate() {
            if work_tx.send(item).is_err() {
                break;
            }
        }
        drop(work_tx);
        let work_rx = Arc::new(Mutex::new(work_rx));

        let (result_tx, mut result_rx) = mpsc::unbounded_channel::<(usize, CheckResult)>();
        let permits = self.policy.max_concurrency.min(Semaphore::MAX_PERMITS);
        let gate = Arc::new(Semaphore::new(permits));

        let worker_count = self.policy.max_concurrency.min(total);
        let mut workers = JoinSet::new();
        for worker_id in 0..worker_count {
            workers.spawn(run_worker(
                worker_id,
                Arc::clone(&work_rx),
                Arc::clone(&gate),
                Arc::clone(&self.checker),
                Arc::clone(&self.policy),
                deadline,
                result_tx.clone(),
            ));
        }
        drop(result_tx);

        // 所有工作者结束（发送端全部释放）后通道关闭
        let mut reported = vec![false; total];
        let mut results = Vec::with_capacity(total);
        while let Some((index, result)) = result_rx.recv().await {
            if std::mem::replace(&mut reported[index], true) {
                warn!("忽略重复的检测结果: {}", result.endpoint);
                continue;
            }
            if let Some(ref callback) = self.result_callback {
                callback(&result);
            }
            results.push(result);
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!("检测工作者异常退出: {}", e);
            }
        }

        for (index, endpoint) in normalized.into_iter().enumerate() {
            if !reported[index] {
                error!("端点没有上报结果，补充失败结果: {}", endpoint);
                let result = CheckResult::failure(
                    endpoint,
                    None,
                    ABORTED_MESSAGE.to_string(),
                    started.elapsed(),
                    0,
                );
                if let Some(ref callback) = self.result_callback {
                    callback(&result);
                }
                results.push(result);
            }
        }

        let success_count = results.iter().filter(|r| r.is_success()).count();
        info!(
            "批量检测完成，成功: {}，失败: {}，耗时: {}ms",
            success_count,
            results.len() - success_count,
            started.elapsed().as_millis()
        );

        Ok(results)
    }
}

/// 工作者循环：取出下一个端点，获取许可，执行检测，上报结果
async fn run_worker(
    worker_id: usize,
    queue: Arc<Mutex<mpsc::UnboundedReceiver<WorkItem>>>,
    gate: Arc<Semaphore>,
    checker: Arc<dyn EndpointChecker>,
    policy: Arc<CheckPolicy>,
    deadline: Instant,
    results: mpsc::UnboundedSender<(usize, CheckResult)>,
) {
    debug!("检测工作者 {} 启动", worker_id);

    loop {
        let next = queue.lock().await.recv().await;
        let Some((index, endpoint)) = next else {
            break;
        };

        let result = match gate.acquire().await {
            Ok(_permit) => {
                let started = Instant::now();
                let outcome = timeout_at(
                    deadline + DEADLINE_GRACE,
                    checker.check(&endpoint, &policy, deadline),
                )
                .await;
                match outcome {
                    Ok(result) => result,
                    Err(_) => {
                        warn!("端点检测未在截止时间内返回: {}", endpoint);
                        CheckResult::failure(
                            endpoint,
                            None,
                            CheckError::DeadlineExceeded.to_string(),
                            started.elapsed(),
                            1,
                        )
                    }
                }
            }
            Err(_) => {
                warn!("获取并发许可失败: {}", endpoint);
                CheckResult::failure(
                    endpoint,
                    None,
                    "admission gate closed".to_string(),
                    Duration::ZERO,
                    0,
                )
            }
        };

        if results.send((index, result)).is_err() {
            break;
        }
    }

    debug!("检测工作者 {} 退出", worker_id);
}
