//! Mock LLM 客户端（用于测试，无需 API）
//!
//! 未设置脚本时回显最后一条 User 消息；可预置事件序列或固定错误，并记录收到的消息与调用次数。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use futures_util::stream;

use crate::llm::{EventStream, LlmClient, LlmError, ResponseEvent};
use crate::memory::{Message, Role};

#[derive(Debug, Default)]
pub struct MockLlmClient {
    script: Option<Vec<ResponseEvent>>,
    error: Option<String>,
    calls: AtomicUsize,
    last_messages: Mutex<Vec<Message>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 每次调用都按顺序发出这些事件（可为空序列）
    pub fn with_events(events: Vec<ResponseEvent>) -> Self {
        Self {
            script: Some(events),
            ..Self::default()
        }
    }

    /// 每次调用发出一个只含给定文本片段的事件
    pub fn with_reply<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_events(vec![ResponseEvent::from_texts(texts)])
    }

    /// 每次调用都返回 API 错误
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// 最近一次调用收到的消息
    pub fn last_messages(&self) -> Vec<Message> {
        self.last_messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn run(&self, messages: &[Message]) -> Result<EventStream, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_messages.lock() {
            *last = messages.to_vec();
        }

        if let Some(err) = &self.error {
            return Err(LlmError::ApiError(err.clone()));
        }

        let events = match &self.script {
            Some(events) => events.clone(),
            None => {
                let last_user = messages
                    .iter()
                    .rev()
                    .find(|m| m.role == Role::User)
                    .map(|m| m.content.as_str())
                    .unwrap_or("(no input)");
                vec![ResponseEvent::from_texts([format!("Echo from Mock: {}", last_user)])]
            }
        };
        Ok(Box::pin(stream::iter(events.into_iter().map(Ok))))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
