//! PX4 文档摘要 Agent：检索 → 抓取首条结果页面 → 截断正文 → 交给 LLM 摘要

use std::sync::Arc;

use async_trait::async_trait;

use super::{into_reply, Agent, AgentCard, AgentIdentity, AgentSkill, ResponseGenerator};
use crate::core::AgentError;
use crate::llm::LlmClient;
use crate::session::SessionStore;
use crate::tools::{truncate_chars, PageFetcher, SearchProvider, MAX_CONTENT_CHARS};

pub const APP_NAME: &str = "px4_summarizer_agent";
pub const USER_ID: &str = "px4_summarizer_user";
pub const INSTRUCTION: &str = "You are a technical summarizer. Read PX4 documentation and respond with a clear, concise summary.";

pub const NO_DOCUMENTATION: &str = "No relevant PX4 documentation found.";
pub const NO_LINK: &str = "PX4 documentation link not found.";
pub const NO_SUMMARY: &str = "Failed to generate summary.";

/// 摘要提示词；正文先截断到 MAX_CONTENT_CHARS
pub fn summary_prompt(content: &str) -> String {
    format!(
        "Summarize the following PX4 documentation content for a technical audience:\n\n{}",
        truncate_chars(content, MAX_CONTENT_CHARS)
    )
}

pub struct Px4SummarizerAgent {
    identity: AgentIdentity,
    sessions: Arc<SessionStore>,
    search: Arc<dyn SearchProvider>,
    fetcher: Arc<dyn PageFetcher>,
    site: String,
    generator: ResponseGenerator,
}

impl Px4SummarizerAgent {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        search: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn PageFetcher>,
        site: impl Into<String>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self {
            identity: AgentIdentity::new(APP_NAME, USER_ID),
            sessions,
            search,
            fetcher,
            site: site.into(),
            generator: ResponseGenerator::new(llm, INSTRUCTION),
        }
    }

    async fn run(&self, query: &str, session_id: &str) -> Result<String, AgentError> {
        let session = self
            .sessions
            .get_or_create(&self.identity.app_name, &self.identity.user_id, session_id)
            .await;

        let top = self
            .search
            .search(query, &self.site)
            .await?
            .ok_or(AgentError::SearchEmptyResult)?;
        let link = top
            .link
            .filter(|l| !l.trim().is_empty())
            .ok_or(AgentError::SearchResultMissingLink)?;

        let content = self.fetcher.fetch(&link).await?;
        self.generator
            .generate(&summary_prompt(&content), &session, &self.identity)
            .await
    }
}

#[async_trait]
impl Agent for Px4SummarizerAgent {
    fn name(&self) -> &str {
        &self.identity.app_name
    }

    fn card(&self) -> AgentCard {
        AgentCard::text_only(
            "PX4SummarizerAgent",
            "This agent fetches and summarizes PX4 documentation using LLM.",
            AgentSkill::new(
                "px4_summarizer",
                "PX4 Summarizer",
                "Summarizes relevant PX4 documentation based on input query",
            )
            .with_tags(&["px4", "summary", "docs"])
            .with_examples(&["Explain offboard mode", "How does PX4 mixer work?"]),
        )
    }

    async fn invoke(&self, query: &str, session_id: &str) -> String {
        tracing::info!(agent = APP_NAME, session = %session_id, "invoke");
        let outcome = self.run(query, session_id).await;
        into_reply(APP_NAME, "while summarizing PX4 documentation", outcome, |e| match e {
            AgentError::SearchEmptyResult => Some(NO_DOCUMENTATION),
            AgentError::SearchResultMissingLink => Some(NO_LINK),
            AgentError::GenerationEmptyResponse => Some(NO_SUMMARY),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{MockLlmClient, ResponseEvent};
    use crate::tools::SearchResult;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedSearch(Option<SearchResult>);

    #[async_trait]
    impl SearchProvider for FixedSearch {
        async fn search(&self, _query: &str, _site: &str) -> Result<Option<SearchResult>, AgentError> {
            Ok(self.0.clone())
        }
    }

    struct FixedPage {
        body: Result<String, String>,
        calls: AtomicUsize,
    }

    impl FixedPage {
        fn ok(body: impl Into<String>) -> Arc<Self> {
            Arc::new(Self {
                body: Ok(body.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                body: Err(message.to_string()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl PageFetcher for FixedPage {
        async fn fetch(&self, _url: &str) -> Result<String, AgentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.body.clone().map_err(AgentError::Fetch)
        }
    }

    fn offboard(link: Option<&str>) -> Option<SearchResult> {
        Some(SearchResult {
            title: "Offboard Mode".to_string(),
            snippet: "External control".to_string(),
            link: link.map(String::from),
        })
    }

    fn agent(
        llm: Arc<MockLlmClient>,
        search: Option<SearchResult>,
        page: Arc<FixedPage>,
    ) -> Px4SummarizerAgent {
        Px4SummarizerAgent::new(
            llm,
            Arc::new(FixedSearch(search)),
            page,
            "px4.io",
            Arc::new(SessionStore::default()),
        )
    }

    #[tokio::test]
    async fn test_summarizes_fetched_page() {
        let llm = Arc::new(MockLlmClient::with_reply(["Offboard mode lets a companion computer steer the vehicle."]));
        let page = FixedPage::ok("Offboard mode requires a 2 Hz setpoint stream.");
        let agent = agent(llm.clone(), offboard(Some("https://docs.px4.io/main/en/flight_modes/offboard.html")), page.clone());

        let out = agent.invoke("Explain offboard mode", "s1").await;
        assert_eq!(out, "Offboard mode lets a companion computer steer the vehicle.");
        assert_eq!(page.calls.load(Ordering::SeqCst), 1);

        let prompt = llm.last_messages().last().map(|m| m.content.clone()).unwrap();
        assert_eq!(
            prompt,
            "Summarize the following PX4 documentation content for a technical audience:\n\nOffboard mode requires a 2 Hz setpoint stream."
        );
    }

    #[tokio::test]
    async fn test_long_content_is_truncated_in_prompt() {
        let llm = Arc::new(MockLlmClient::with_reply(["summary"]));
        let page = FixedPage::ok("x".repeat(MAX_CONTENT_CHARS + 1234));
        let agent = agent(llm.clone(), offboard(Some("https://docs.px4.io/a")), page);

        agent.invoke("mixer", "s1").await;
        let prompt = llm.last_messages().last().map(|m| m.content.clone()).unwrap();
        let embedded = prompt.split("\n\n").nth(1).unwrap();
        assert_eq!(embedded.chars().count(), MAX_CONTENT_CHARS);
    }

    #[tokio::test]
    async fn test_no_results_skips_fetch_and_llm() {
        let llm = Arc::new(MockLlmClient::with_reply(["unused"]));
        let page = FixedPage::ok("unused");
        let agent = agent(llm.clone(), None, page.clone());

        assert_eq!(agent.invoke("nothing", "s1").await, NO_DOCUMENTATION);
        assert_eq!(page.calls.load(Ordering::SeqCst), 0);
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_link_skips_fetch() {
        let llm = Arc::new(MockLlmClient::with_reply(["unused"]));
        let page = FixedPage::ok("unused");
        let agent = agent(llm.clone(), offboard(None), page.clone());

        assert_eq!(agent.invoke("offboard", "s1").await, NO_LINK);
        assert_eq!(page.calls.load(Ordering::SeqCst), 0);
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_returned_as_text() {
        let llm = Arc::new(MockLlmClient::with_reply(["unused"]));
        let agent = agent(llm.clone(), offboard(Some("https://docs.px4.io/a")), FixedPage::failing("HTTP 404 Not Found"));

        let out = agent.invoke("offboard", "s1").await;
        assert!(out.starts_with("Error while summarizing PX4 documentation: "));
        assert!(out.contains("HTTP 404 Not Found"));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_generation_falls_back() {
        let llm = Arc::new(MockLlmClient::with_events(vec![ResponseEvent::default()]));
        let agent = agent(llm, offboard(Some("https://docs.px4.io/a")), FixedPage::ok("text"));
        assert_eq!(agent.invoke("offboard", "s1").await, NO_SUMMARY);
    }

    #[test]
    fn test_summary_prompt_short_content_unchanged() {
        let content = "y".repeat(MAX_CONTENT_CHARS);
        assert!(summary_prompt(&content).ends_with(&content));
    }
}
