//! Web 检索：调用 SerpApi（Google 引擎），限定站点，取排名第一的结果
//!
//! 请求参数：engine、q = "{query} site:{site}"、api_key（未配置时省略，由服务端报错）。
//! 响应 organic_results 为空或缺失时返回 Ok(None)，由调用方决定兜底文案。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::SearchSection;
use crate::core::AgentError;

/// 排名第一的检索结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    /// 结果链接；服务端可能缺省
    pub link: Option<String>,
}

impl SearchResult {
    /// 从单条 organic result 读取字段：title 缺省为 "No title"，snippet 缺省为空
    pub fn from_organic(entry: &Value) -> Self {
        let field = |name: &str| entry.get(name).and_then(Value::as_str).map(String::from);
        Self {
            title: field("title").unwrap_or_else(|| "No title".to_string()),
            snippet: field("snippet").unwrap_or_default(),
            link: field("link"),
        }
    }
}

/// 站点限定检索能力
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, site: &str) -> Result<Option<SearchResult>, AgentError>;
}

/// 拼接带站点限定的查询串
pub fn build_query(query: &str, site: &str) -> String {
    format!("{} site:{}", query, site)
}

/// 从响应 JSON 中取首条 organic result
pub fn parse_top_result(body: &Value) -> Option<SearchResult> {
    body.get("organic_results")
        .and_then(Value::as_array)
        .and_then(|results| results.first())
        .map(SearchResult::from_organic)
}

/// SerpApi 客户端；API Key 在构造时读取一次
pub struct SerpApiClient {
    client: Client,
    endpoint: String,
    engine: String,
    api_key: Option<String>,
}

impl SerpApiClient {
    pub fn new(
        endpoint: impl Into<String>,
        engine: impl Into<String>,
        api_key: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, AgentError> {
        let mut builder = Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder
            .build()
            .map_err(|e| AgentError::ConfigError(format!("http client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            engine: engine.into(),
            api_key,
        })
    }

    /// 按 [search] 配置创建；凭据从 api_key_env 指定的环境变量读取，缺失不在此处报错
    pub fn from_config(cfg: &SearchSection) -> Result<Self, AgentError> {
        let api_key = std::env::var(&cfg.api_key_env).ok();
        if api_key.is_none() {
            tracing::warn!(env = %cfg.api_key_env, "search API key not set; requests will likely fail");
        }
        Self::new(
            cfg.endpoint.clone(),
            cfg.engine.clone(),
            api_key,
            cfg.timeout_secs.map(Duration::from_secs),
        )
    }
}

#[async_trait]
impl SearchProvider for SerpApiClient {
    async fn search(&self, query: &str, site: &str) -> Result<Option<SearchResult>, AgentError> {
        let q = build_query(query, site);
        tracing::info!(q = %q, engine = %self.engine, "web search");

        let mut params = vec![("engine", self.engine.as_str()), ("q", q.as_str())];
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.as_str()));
        }

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .map_err(|e| AgentError::SearchTransport(format!("Request failed: {}", e)))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| AgentError::SearchTransport(format!("Read body: {}", e)))?;

        if !status.is_success() {
            // 服务端错误通常带 {"error": "..."}，优先透出
            let detail = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(String::from))
                .unwrap_or(body);
            return Err(AgentError::SearchTransport(format!("HTTP {}: {}", status, detail)));
        }

        let data: Value = serde_json::from_str(&body)
            .map_err(|e| AgentError::SearchTransport(format!("Invalid JSON: {}", e)))?;
        Ok(parse_top_result(&data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_query_appends_site() {
        assert_eq!(build_query("PX4 GPS setup", "px4.io"), "PX4 GPS setup site:px4.io");
    }

    #[test]
    fn test_parse_top_result_takes_first() {
        let body = json!({
            "organic_results": [
                {"title": "GPS & Compass", "snippet": "Connect the GPS", "link": "https://docs.px4.io/main/en/gps_compass/"},
                {"title": "Second", "snippet": "", "link": "https://px4.io/"}
            ]
        });
        let top = parse_top_result(&body).unwrap();
        assert_eq!(top.title, "GPS & Compass");
        assert_eq!(top.snippet, "Connect the GPS");
        assert_eq!(top.link.as_deref(), Some("https://docs.px4.io/main/en/gps_compass/"));
    }

    #[test]
    fn test_parse_empty_or_missing_results() {
        assert!(parse_top_result(&json!({"organic_results": []})).is_none());
        assert!(parse_top_result(&json!({"search_metadata": {}})).is_none());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let top = parse_top_result(&json!({"organic_results": [{}]})).unwrap();
        assert_eq!(top.title, "No title");
        assert_eq!(top.snippet, "");
        assert!(top.link.is_none());
    }
}
