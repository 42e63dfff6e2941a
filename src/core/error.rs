//! Agent 错误类型
//!
//! 管线内部统一返回 `Result<_, AgentError>`；仅在 Agent 对外边界（invoke）转换为固定格式的字符串。

use thiserror::Error;

use crate::llm::LlmError;

/// 管线各步骤可能出现的错误（检索、抓取、生成、配置）
#[derive(Error, Debug)]
pub enum AgentError {
    /// 检索请求失败：网络错误、非 2xx、响应无法解析或服务端返回 error 字段
    #[error("search request failed: {0}")]
    SearchTransport(String),

    /// 检索结果为空（正常的"无数据"结果，不视为故障）
    #[error("search returned no results")]
    SearchEmptyResult,

    /// 首条结果缺少链接，无法继续抓取
    #[error("top search result has no link")]
    SearchResultMissingLink,

    /// 页面抓取失败：超时或 HTTP 错误
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// LLM 未返回任何文本（正常的"无数据"结果，不视为故障）
    #[error("LLM returned an empty response")]
    GenerationEmptyResponse,

    #[error("LLM error: {0}")]
    Generation(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl AgentError {
    /// 是否为"无数据"类结果（返回兜底文案，不记为失败）
    pub fn is_empty_result(&self) -> bool {
        matches!(
            self,
            AgentError::SearchEmptyResult
                | AgentError::SearchResultMissingLink
                | AgentError::GenerationEmptyResponse
        )
    }
}

impl From<LlmError> for AgentError {
    fn from(e: LlmError) -> Self {
        AgentError::Generation(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result_kinds() {
        assert!(AgentError::SearchEmptyResult.is_empty_result());
        assert!(AgentError::GenerationEmptyResponse.is_empty_result());
        assert!(AgentError::SearchResultMissingLink.is_empty_result());
        assert!(!AgentError::Fetch("HTTP 404".into()).is_empty_result());
        assert!(!AgentError::SearchTransport("boom".into()).is_empty_result());
    }

    #[test]
    fn test_llm_error_embeds_message() {
        let err: AgentError = LlmError::ApiError("quota exceeded".to_string()).into();
        assert!(matches!(err, AgentError::Generation(_)));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn test_config_error_display() {
        let err = AgentError::ConfigError("http client: bad proxy".into());
        assert_eq!(err.to_string(), "Config error: http client: bad proxy");
        assert!(!err.is_empty_result());
    }
}
