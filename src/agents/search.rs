//! PX4 文档检索 Agent：站点限定检索，把首条结果格式化为三行文本（不调用 LLM）

use std::sync::Arc;

use async_trait::async_trait;

use super::{into_reply, Agent, AgentCard, AgentIdentity, AgentSkill};
use crate::core::AgentError;
use crate::session::SessionStore;
use crate::tools::{SearchProvider, SearchResult};

pub const APP_NAME: &str = "px4_search_agent";
pub const USER_ID: &str = "px4_search_user";

pub const NO_RESULTS: &str = "No relevant PX4 results found.";

/// 三行格式：加粗标题、摘要、链接
pub fn format_result(result: &SearchResult) -> String {
    format!(
        "**{}**\n{}\n{}",
        result.title,
        result.snippet,
        result.link.as_deref().unwrap_or("")
    )
}

pub struct Px4SearchAgent {
    identity: AgentIdentity,
    sessions: Arc<SessionStore>,
    search: Arc<dyn SearchProvider>,
    site: String,
}

impl Px4SearchAgent {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        site: impl Into<String>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self {
            identity: AgentIdentity::new(APP_NAME, USER_ID),
            sessions,
            search,
            site: site.into(),
        }
    }

    async fn run(&self, query: &str, session_id: &str) -> Result<String, AgentError> {
        self.sessions
            .get_or_create(&self.identity.app_name, &self.identity.user_id, session_id)
            .await;
        let top = self
            .search
            .search(query, &self.site)
            .await?
            .ok_or(AgentError::SearchEmptyResult)?;
        Ok(format_result(&top))
    }
}

#[async_trait]
impl Agent for Px4SearchAgent {
    fn name(&self) -> &str {
        &self.identity.app_name
    }

    fn card(&self) -> AgentCard {
        AgentCard::text_only(
            "PX4SearchAgent",
            "This agent performs PX4 documentation search using Google API.",
            AgentSkill::new(
                "px4_search",
                "PX4 Search Tool",
                "Searches PX4 documentation using Google Search API",
            )
            .with_tags(&["px4", "search", "docs"])
            .with_examples(&["How to calibrate PX4?", "PX4 GPS setup"]),
        )
    }

    async fn invoke(&self, query: &str, session_id: &str) -> String {
        tracing::info!(agent = APP_NAME, session = %session_id, "invoke");
        let outcome = self.run(query, session_id).await;
        into_reply(APP_NAME, "during search", outcome, |e| {
            matches!(e, AgentError::SearchEmptyResult).then_some(NO_RESULTS)
        })
    }
}
