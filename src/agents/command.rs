//! PX4 命令生成 Agent：把自然语言指令直接交给 LLM，返回对应的 NSH 命令

use std::sync::Arc;

use async_trait::async_trait;

use super::{into_reply, Agent, AgentCard, AgentIdentity, AgentSkill, ResponseGenerator};
use crate::core::AgentError;
use crate::llm::LlmClient;
use crate::session::SessionStore;

pub const APP_NAME: &str = "px4_command_agent";
pub const USER_ID: &str = "px4_command_user";
pub const INSTRUCTION: &str = "Given a user instruction, output the exact PX4 NSH command that accomplishes the task. Only return the command, nothing else.";

pub const NO_COMMAND: &str = "Unable to generate command.";

pub struct Px4CommandAgent {
    identity: AgentIdentity,
    sessions: Arc<SessionStore>,
    generator: ResponseGenerator,
}

impl Px4CommandAgent {
    pub fn new(llm: Arc<dyn LlmClient>, sessions: Arc<SessionStore>) -> Self {
        Self {
            identity: AgentIdentity::new(APP_NAME, USER_ID),
            sessions,
            generator: ResponseGenerator::new(llm, INSTRUCTION),
        }
    }

    async fn run(&self, query: &str, session_id: &str) -> Result<String, AgentError> {
        let session = self
            .sessions
            .get_or_create(&self.identity.app_name, &self.identity.user_id, session_id)
            .await;
        self.generator.generate(query, &session, &self.identity).await
    }
}

#[async_trait]
impl Agent for Px4CommandAgent {
    fn name(&self) -> &str {
        &self.identity.app_name
    }

    fn card(&self) -> AgentCard {
        AgentCard::text_only(
            "PX4CommandAgent",
            "This agent translates natural language into PX4-compatible shell commands.",
            AgentSkill::new(
                "px4_command",
                "PX4 Command Generator",
                "Converts user input into PX4 shell commands",
            )
            .with_tags(&["px4", "commands", "nsh"])
            .with_examples(&["Disarm the drone", "Switch to offboard mode", "Reboot autopilot"]),
        )
    }

    async fn invoke(&self, query: &str, session_id: &str) -> String {
        tracing::info!(agent = APP_NAME, session = %session_id, "invoke");
        let outcome = self.run(query, session_id).await;
        into_reply(APP_NAME, "generating command", outcome, |e| {
            matches!(e, AgentError::GenerationEmptyResponse).then_some(NO_COMMAND)
        })
    }
}
