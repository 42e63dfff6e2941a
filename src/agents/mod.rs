//! Agent 层：三种 PX4 智能体共享的请求处理管线
//!
//! - **command**: 直接生成（查询原样交给 LLM，返回 NSH 命令）
//! - **search**: 仅检索（站点限定检索，格式化首条结果，不调用 LLM）
//! - **summarizer**: 检索 + 抓取 + 摘要
//!
//! 每次调用先获取或创建会话；内部以 `Result<String, AgentError>` 传递，
//! 只在 `invoke` 边界转换为字符串，任何错误都不会越过 Agent 边界。

pub mod card;
pub mod command;
pub mod generator;
pub mod search;
pub mod stream;
pub mod summarizer;

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::config::AppConfig;
use crate::core::AgentError;
use crate::llm::create_llm_from_config;
use crate::session::SessionStore;
use crate::tools::{HttpFetcher, SerpApiClient};

pub use card::{AgentCapabilities, AgentCard, AgentSkill};
pub use command::Px4CommandAgent;
pub use generator::ResponseGenerator;
pub use search::Px4SearchAgent;
pub use stream::{single_result, TaskResult};
pub use summarizer::Px4SummarizerAgent;

/// 所有 Agent 仅接受并产出纯文本
pub const SUPPORTED_CONTENT_TYPES: &[&str] = &["text", "text/plain"];

/// Agent 身份：会话作用域（app_name）与固定的用户 ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentIdentity {
    pub app_name: String,
    pub user_id: String,
}

impl AgentIdentity {
    pub fn new(app_name: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
        }
    }
}

/// 统一的 Agent 接口
#[async_trait]
pub trait Agent: Send + Sync {
    /// 会话作用域名，同时用于日志
    fn name(&self) -> &str;

    fn card(&self) -> AgentCard;

    fn supported_content_types(&self) -> &'static [&'static str] {
        SUPPORTED_CONTENT_TYPES
    }

    /// 处理一次查询，总是返回字符串（失败时为错误描述或兜底文案）
    async fn invoke(&self, query: &str, session_id: &str) -> String;

    /// 兼容流式调用方：只产出一个 `{is_task_complete: true, content}`
    fn stream<'a>(&'a self, query: &'a str, session_id: &'a str) -> BoxStream<'a, TaskResult> {
        single_result(self.invoke(query, session_id))
    }
}

/// Agent 边界：成功原样返回；"无数据"类结果换成兜底文案；其余错误渲染为 `Error {doing}: {message}`
pub(crate) fn into_reply<F>(
    agent: &str,
    doing: &str,
    outcome: Result<String, AgentError>,
    fallback: F,
) -> String
where
    F: Fn(&AgentError) -> Option<&'static str>,
{
    match outcome {
        Ok(text) => text,
        Err(e) => match fallback(&e) {
            Some(message) if e.is_empty_result() => {
                tracing::debug!(agent = %agent, reason = %e, "no data, returning fallback");
                message.to_string()
            }
            _ => {
                tracing::warn!(agent = %agent, error = %e, "request failed");
                format!("Error {}: {}", doing, e)
            }
        },
    }
}

/// 按配置构建三种 Agent，共享同一个会话存储与 LLM 后端
pub fn build_agents(cfg: &AppConfig) -> Result<Vec<Arc<dyn Agent>>, AgentError> {
    let sessions = Arc::new(SessionStore::new(cfg.app.max_context_turns));
    let llm = create_llm_from_config(&cfg.llm);
    let search = Arc::new(SerpApiClient::from_config(&cfg.search)?);
    let fetcher = Arc::new(HttpFetcher::from_config(&cfg.fetch)?);

    let agents: Vec<Arc<dyn Agent>> = vec![
        Arc::new(Px4CommandAgent::new(llm.clone(), sessions.clone())),
        Arc::new(Px4SearchAgent::new(
            search.clone(),
            cfg.search.site.clone(),
            sessions.clone(),
        )),
        Arc::new(Px4SummarizerAgent::new(
            llm,
            search,
            fetcher,
            cfg.search.site.clone(),
            sessions,
        )),
    ];
    Ok(agents)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_fallback(_: &AgentError) -> Option<&'static str> {
        None
    }

    #[test]
    fn test_into_reply_passes_success_through() {
        assert_eq!(into_reply("a", "doing x", Ok("fine".into()), no_fallback), "fine");
    }

    #[test]
    fn test_into_reply_renders_errors() {
        let out = into_reply(
            "a",
            "during search",
            Err(AgentError::SearchTransport("HTTP 500".into())),
            no_fallback,
        );
        assert!(out.starts_with("Error during search: "));
        assert!(out.contains("HTTP 500"));
    }

    #[test]
    fn test_into_reply_uses_fallback_for_empty_results() {
        let out = into_reply("a", "during search", Err(AgentError::SearchEmptyResult), |e| {
            matches!(e, AgentError::SearchEmptyResult).then_some("nothing")
        });
        assert_eq!(out, "nothing");
    }

    #[test]
    fn test_build_agents_with_defaults() {
        let agents = build_agents(&AppConfig::default()).unwrap();
        let names: Vec<&str> = agents.iter().map(|a| a.name()).collect();
        assert_eq!(
            names,
            vec!["px4_command_agent", "px4_search_agent", "px4_summarizer_agent"]
        );
        assert!(agents
            .iter()
            .all(|a| a.supported_content_types() == ["text", "text/plain"]));
    }
}
