//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `PX4_AGENTS__*` 覆盖（双下划线表示嵌套，如 `PX4_AGENTS__LLM__PROVIDER=openai`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 环境变量覆盖前缀
pub const ENV_PREFIX: &str = "PX4_AGENTS";

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub search: SearchSection,
    pub fetch: FetchSection,
}

/// [app] 段
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    /// 每个会话保留的对话轮数（回放给 LLM）
    #[serde(default = "default_max_context_turns")]
    pub max_context_turns: usize,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            max_context_turns: default_max_context_turns(),
        }
    }
}

fn default_max_context_turns() -> usize {
    20
}

/// [llm] 段：后端选择
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    /// 后端：deepseek / openai / mock；实际选择还取决于可用的 API Key
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub base_url: Option<String>,
    #[serde(default)]
    pub deepseek: LlmModelSection,
    #[serde(default)]
    pub openai: LlmModelSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: None,
            deepseek: LlmModelSection::default(),
            openai: LlmModelSection::default(),
        }
    }
}

fn default_provider() -> String {
    "deepseek".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmModelSection {
    pub model: Option<String>,
}

/// [search] 段：检索服务端点、引擎、站点限定与凭据环境变量名
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSection {
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_search_engine")]
    pub engine: String,
    /// 检索限定站点（拼接为 `site:<site>`）
    #[serde(default = "default_search_site")]
    pub site: String,
    /// 存放 API Key 的环境变量名
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// 检索请求超时（秒）；未设置则不限时
    pub timeout_secs: Option<u64>,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            engine: default_search_engine(),
            site: default_search_site(),
            api_key_env: default_api_key_env(),
            timeout_secs: None,
        }
    }
}

fn default_search_endpoint() -> String {
    "https://serpapi.com/search".to_string()
}

fn default_search_engine() -> String {
    "google".to_string()
}

fn default_search_site() -> String {
    "px4.io".to_string()
}

fn default_api_key_env() -> String {
    "SERPAPI_KEY".to_string()
}

/// [fetch] 段：页面抓取超时、正文截断上限、HTML 转文本的折行宽度
#[derive(Debug, Clone, Deserialize)]
pub struct FetchSection {
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    #[serde(default = "default_wrap_width")]
    pub wrap_width: usize,
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout_secs(),
            max_chars: default_max_chars(),
            wrap_width: default_wrap_width(),
        }
    }
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_max_chars() -> usize {
    crate::tools::MAX_CONTENT_CHARS
}

fn default_wrap_width() -> usize {
    120
}

/// 从 config 目录加载配置，环境变量 PX4_AGENTS__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 PX4_AGENTS__*
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.search.site, "px4.io");
        assert_eq!(cfg.search.engine, "google");
        assert_eq!(cfg.search.api_key_env, "SERPAPI_KEY");
        assert_eq!(cfg.fetch.timeout_secs, 10);
        assert_eq!(cfg.fetch.max_chars, 8000);
        assert_eq!(cfg.app.max_context_turns, 20);
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[search]\nsite = \"docs.px4.io\"\n\n[fetch]\ntimeout_secs = 3\n\n[llm]\nprovider = \"mock\""
        )
        .unwrap();

        let cfg = load_config(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(cfg.search.site, "docs.px4.io");
        assert_eq!(cfg.fetch.timeout_secs, 3);
        assert_eq!(cfg.fetch.max_chars, 8000);
        assert_eq!(cfg.llm.provider, "mock");
    }
}
