//! 运行时配置
//!
//! 后端地址在编译期通过环境变量 `CAMPUS_API_URL` 注入（Trunk 构建时读取），
//! 未设置时使用本地开发地址。

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
const API_URL_VAR: Option<&str> = option_env!("CAMPUS_API_URL");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// REST API 根地址，不带末尾斜杠
    pub api_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::resolve(API_URL_VAR)
    }

    pub fn with_base_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            api_base_url: url.trim().trim_end_matches('/').to_string(),
        }
    }

    fn resolve(var: Option<&str>) -> Self {
        match var.map(str::trim).filter(|v| !v.is_empty()) {
            Some(url) => Self::with_base_url(url),
            None => Self::with_base_url(DEFAULT_API_BASE_URL),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_local_backend() {
        assert_eq!(AppConfig::resolve(None).api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(AppConfig::resolve(Some("  ")).api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn trims_trailing_slashes() {
        let config = AppConfig::resolve(Some("https://cms.example.edu/api//"));
        assert_eq!(config.api_base_url, "https://cms.example.edu/api");
    }
}
