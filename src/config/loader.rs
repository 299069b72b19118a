//! 配置加载器实现
//!
//! 提供TOML策略文件解析、环境变量替换，以及URL列表文件的读取

use crate::config::types::{validate_policy_file, PolicyFile};
use crate::error::{ConfigError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};

/// URL列表文件中的注释前缀
const COMMENT_PREFIX: char = '#';

/// 策略加载器trait，定义策略加载接口
#[async_trait]
pub trait PolicyLoader: Send + Sync {
    /// 从文件加载策略
    ///
    /// # 参数
    /// * `path` - 策略文件路径
    ///
    /// # 返回
    /// * `Result<PolicyFile>` - 加载的策略或错误
    async fn load_from_file<P: AsRef<Path> + Send>(&self, path: P) -> Result<PolicyFile>;

    /// 从字符串加载策略
    async fn load_from_string(&self, content: &str) -> Result<PolicyFile>;

    /// 验证策略
    fn validate(&self, file: &PolicyFile) -> Result<()>;
}

/// TOML策略加载器实现
#[derive(Debug, Clone)]
pub struct TomlPolicyLoader {
    /// 是否启用环境变量替换
    enable_env_substitution: bool,
}

impl TomlPolicyLoader {
    /// 创建新的TOML策略加载器
    ///
    /// # 参数
    /// * `enable_env_substitution` - 是否启用环境变量替换
    pub fn new(enable_env_substitution: bool) -> Self {
        Self {
            enable_env_substitution,
        }
    }

    /// 替换字符串中的 `${VAR_NAME}` 环境变量
    fn substitute_env_vars(&self, content: &str) -> Result<String> {
        if !self.enable_env_substitution {
            return Ok(content.to_string());
        }

        let env_var_regex = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .map_err(|e| ConfigError::ParseError(format!("正则表达式错误: {e}")))?;

        let mut result = content.to_string();

        for captures in env_var_regex.captures_iter(content) {
            let full_match = &captures[0];
            let var_name = &captures[1];

            match std::env::var(var_name) {
                Ok(value) => {
                    result = result.replace(full_match, &value);
                }
                Err(_) => {
                    return Err(ConfigError::EnvVarError {
                        var: var_name.to_string(),
                    }
                    .into());
                }
            }
        }

        Ok(result)
    }

    fn parse_toml(&self, content: &str) -> Result<PolicyFile> {
        let processed_content = self.substitute_env_vars(content)?;

        let file: PolicyFile = toml::from_str(&processed_content)
            .map_err(|e| ConfigError::ParseError(format!("TOML解析失败: {e}")))?;

        Ok(file)
    }
}

#[async_trait]
impl PolicyLoader for TomlPolicyLoader {
    async fn load_from_file<P: AsRef<Path> + Send>(&self, path: P) -> Result<PolicyFile> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            }
            .into());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::ParseError(format!("读取文件失败: {e}")))?;

        let file = self.parse_toml(&content)?;
        self.validate(&file)?;

        log::info!("成功加载策略文件: {}", path.display());
        log::debug!("策略内容: {:?}", file);

        Ok(file)
    }

    async fn load_from_string(&self, content: &str) -> Result<PolicyFile> {
        let file = self.parse_toml(content)?;
        self.validate(&file)?;

        log::debug!("成功解析策略字符串");

        Ok(file)
    }

    fn validate(&self, file: &PolicyFile) -> Result<()> {
        validate_policy_file(file).map_err(|e| ConfigError::ValidationError(e).into())
    }
}

/// URL列表加载器
///
/// 文件每行一个URL，空行和以 `#` 开头的行会被忽略。
#[derive(Debug, Clone, Default)]
pub struct UrlListLoader;

impl UrlListLoader {
    /// 从文件读取URL列表
    ///
    /// # 参数
    /// * `path` - URL列表文件路径
    ///
    /// # 返回
    /// * `Result<Vec<String>>` - 文件中的URL（未规范化）
    pub async fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<String>> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let urls = parse_urls(&content);

        log::debug!("从 {} 读取到 {} 个URL", path.display(), urls.len());

        Ok(urls)
    }
}

/// 解析换行分隔的URL文本
pub fn parse_urls(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(COMMENT_PREFIX))
        .map(str::to_string)
        .collect()
}

/// 获取默认策略文件路径
///
/// 当前目录存在 `health-checker.toml` 时优先使用，否则使用用户配置目录下的
/// `health-checker/config.toml`。
pub fn get_default_config_path() -> PathBuf {
    let local = PathBuf::from("health-checker.toml");
    if local.exists() {
        return local;
    }

    dirs::config_dir()
        .map(|config_dir| config_dir.join("health-checker").join("config.toml"))
        .unwrap_or(local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TEST_POLICY_TOML: &str = r#"
[policy]
timeout_seconds = 5
max_concurrency = 10
max_retries = 2
user_agent = "custom-agent/1.0"
"#;

    #[tokio::test]
    async fn test_toml_parsing() {
        let loader = TomlPolicyLoader::new(false);
        let file = loader.load_from_string(TEST_POLICY_TOML).await.unwrap();

        assert_eq!(file.policy.timeout_seconds, 5);
        assert_eq!(file.policy.max_concurrency, 10);
        assert_eq!(file.policy.max_retries, 2);
        assert_eq!(file.policy.user_agent, "custom-agent/1.0");
    }

    #[tokio::test]
    async fn test_partial_toml_uses_defaults() {
        let loader = TomlPolicyLoader::new(false);
        let file = loader
            .load_from_string("[policy]\nmax_retries = 4\n")
            .await
            .unwrap();

        assert_eq!(file.policy.max_retries, 4);
        assert_eq!(file.policy.timeout_seconds, 10);
        assert_eq!(file.policy.max_concurrency, 5);
    }

    #[tokio::test]
    async fn test_invalid_toml() {
        let loader = TomlPolicyLoader::new(false);
        let result = loader.load_from_string("[policy\nbroken").await;

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("TOML解析失败"));
    }

    #[tokio::test]
    async fn test_validation_rejects_zero_concurrency() {
        let loader = TomlPolicyLoader::new(false);
        let result = loader
            .load_from_string("[policy]\nmax_concurrency = 0\n")
            .await;

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("最大并发检测数不能为0"));
    }

    #[tokio::test]
    #[serial]
    async fn test_env_var_substitution() {
        env::set_var("HC_TEST_AGENT", "agent-from-env/3.1");

        let loader = TomlPolicyLoader::new(true);
        let file = loader
            .load_from_string("[policy]\nuser_agent = \"${HC_TEST_AGENT}\"\n")
            .await
            .unwrap();

        assert_eq!(file.policy.user_agent, "agent-from-env/3.1");

        env::remove_var("HC_TEST_AGENT");
    }

    #[tokio::test]
    #[serial]
    async fn test_env_var_substitution_missing_var() {
        env::remove_var("HC_MISSING_VAR");

        let loader = TomlPolicyLoader::new(true);
        let result = loader
            .load_from_string("[policy]\nuser_agent = \"${HC_MISSING_VAR}\"\n")
            .await;

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("HC_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_env_vars_disabled() {
        let loader = TomlPolicyLoader::new(false);
        let content = "test ${VAR} content";
        let result = loader.substitute_env_vars(content).unwrap();
        assert_eq!(result, content);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(TEST_POLICY_TOML.as_bytes()).unwrap();

        let loader = TomlPolicyLoader::new(false);
        let policy = loader.load_from_file(file.path()).await.unwrap();
        assert_eq!(policy.policy.max_concurrency, 10);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let loader = TomlPolicyLoader::new(false);
        let result = loader
            .load_from_file("/nonexistent/health-checker.toml")
            .await;

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("配置文件不存在"));
    }

    #[test]
    fn test_parse_urls_skips_blank_and_comment_lines() {
        let content = "\n# production\nhttps://example.com\n   \nexample.org\n  # indented comment\n  http://localhost:8080  \n";
        let urls = parse_urls(content);

        assert_eq!(
            urls,
            vec![
                "https://example.com".to_string(),
                "example.org".to_string(),
                "http://localhost:8080".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_urls_empty() {
        assert!(parse_urls("").is_empty());
        assert!(parse_urls("# only comments\n\n").is_empty());
    }

    #[tokio::test]
    async fn test_url_list_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "https://a.example").unwrap();
        writeln!(file, "# skip").unwrap();
        writeln!(file, "b.example").unwrap();

        let urls = UrlListLoader.load_from_file(file.path()).await.unwrap();
        assert_eq!(urls, vec!["https://a.example", "b.example"]);
    }

    #[tokio::test]
    async fn test_url_list_missing_file() {
        let result = UrlListLoader.load_from_file("/nonexistent/urls.txt").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_get_default_config_path() {
        let path = get_default_config_path();
        let path = path.to_string_lossy();
        assert!(path.contains("health-checker"));
    }
}
