//! 健康检测模块
//!
//! 提供端点规范化、单端点检测、并发调度和结果统计功能

pub mod checker;
pub mod normalize;
pub mod result;
pub mod scheduler;
pub mod stats;
pub mod transport;

// 重新导出主要类型
pub use checker::{EndpointChecker, HttpChecker};
pub use normalize::normalize;
pub use result::{CheckOutcome, CheckResult};
pub use scheduler::{CheckResultCallback, CheckScheduler};
pub use stats::CheckStats;
pub use transport::{ReqwestTransport, Transport};
