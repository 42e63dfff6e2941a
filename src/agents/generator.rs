//! 响应生成：把提示词交给 LLM，只保留事件流的最后一个事件并提取文本
//!
//! 指令文本（人设）在构造时固定；每次调用回放会话历史，成功后把本轮对话写回会话。

use std::sync::Arc;

use futures_util::StreamExt;

use super::AgentIdentity;
use crate::core::AgentError;
use crate::llm::{LlmClient, ResponseEvent};
use crate::memory::Message;
use crate::session::Session;

pub struct ResponseGenerator {
    llm: Arc<dyn LlmClient>,
    instruction: String,
}

impl ResponseGenerator {
    pub fn new(llm: Arc<dyn LlmClient>, instruction: impl Into<String>) -> Self {
        Self {
            llm,
            instruction: instruction.into(),
        }
    }

    /// 生成回复；LLM 没有给出任何文本时返回 `GenerationEmptyResponse`
    pub async fn generate(
        &self,
        prompt: &str,
        session: &Session,
        identity: &AgentIdentity,
    ) -> Result<String, AgentError> {
        let history = session.history().await;
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(self.instruction.as_str()));
        messages.extend(history);
        messages.push(Message::user(prompt));

        tracing::debug!(
            agent = %identity.app_name,
            user = %identity.user_id,
            session = %session.id(),
            backend = %self.llm.name(),
            "dispatching prompt"
        );

        let mut events = self.llm.run(&messages).await?;
        let mut last_event: Option<ResponseEvent> = None;
        while let Some(event) = events.next().await {
            last_event = Some(event?);
        }

        let text = last_event
            .as_ref()
            .and_then(ResponseEvent::joined_text)
            .ok_or(AgentError::GenerationEmptyResponse)?;
        session.push_turn(prompt, text.as_str()).await;
        Ok(text)
    }
}
