//! 端点地址规范化

/// 可识别的协议前缀
const KNOWN_SCHEMES: [&str; 2] = ["http://", "https://"];

/// 缺少协议时补上的默认前缀
const DEFAULT_SCHEME: &str = "https://";

/// 将原始端点字符串规范化为可请求的地址
///
/// 未以 `http://` 或 `https://` 开头的输入会被补上 `https://`。
/// 该函数从不失败，格式错误的输入原样交给执行器去拒绝。
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if KNOWN_SCHEMES
        .iter()
        .any(|scheme| trimmed.starts_with(scheme))
    {
        trimmed.to_string()
    } else {
        format!("{DEFAULT_SCHEME}{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adds_default_scheme() {
        assert_eq!(normalize("example.com"), "https://example.com");
        assert_eq!(normalize("example.com/health"), "https://example.com/health");
    }

    #[test]
    fn test_keeps_known_schemes() {
        assert_eq!(normalize("http://example.com"), "http://example.com");
        assert_eq!(normalize("https://example.com"), "https://example.com");
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(normalize("  example.com \n"), "https://example.com");
    }

    #[test]
    fn test_unknown_scheme_passes_through_with_prefix() {
        assert_eq!(normalize("ftp://example.com"), "https://ftp://example.com");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "example.com",
            "http://example.com",
            "https://example.com",
            "  spaced.example  ",
            "",
            "not a url",
            "ftp://files.example",
        ];

        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {input:?}");
        }
    }
}
