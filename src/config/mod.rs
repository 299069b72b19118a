//! 配置管理模块
//!
//! 提供检测策略、策略文件解析和URL列表加载功能

pub mod loader;
pub mod types;

// 重新导出主要类型
pub use loader::{
    get_default_config_path, parse_urls, PolicyLoader, TomlPolicyLoader, UrlListLoader,
};
pub use types::{validate_policy_file, CheckPolicy, PolicyFile, PolicySection};
