//! LLM 客户端抽象
//!
//! 后端（OpenAI 兼容 / DeepSeek / Mock）实现 LlmClient::run：发送消息列表，返回响应事件流。
//! 调用方只关心最后一个事件（见 `agents::generator`）。

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::memory::Message;

/// LLM 调用错误
#[derive(Error, Debug, Clone)]
pub enum LlmError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Stream error: {0}")]
    StreamError(String),
}

/// 响应内容的一个片段；text 可缺省（如工具调用片段）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// 事件内容：角色 + 片段列表
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// 响应事件；content 为空表示该事件不携带文本（如中间状态）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEvent {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub content: Option<Content>,
}

impl ResponseEvent {
    /// 由若干文本片段构造一个模型事件
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            author: None,
            content: Some(Content {
                role: Some("model".to_string()),
                parts: texts.into_iter().map(Part::text).collect(),
            }),
        }
    }

    /// 非空文本片段按出现顺序以换行拼接；没有任何文本时返回 None
    pub fn joined_text(&self) -> Option<String> {
        let texts: Vec<&str> = self
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .filter(|t| !t.is_empty())
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.join("\n"))
        }
    }
}

/// 响应事件流
pub type EventStream = Pin<Box<dyn Stream<Item = Result<ResponseEvent, LlmError>> + Send>>;

/// LLM 客户端 trait
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 发送消息列表（首条通常为 System 指令），返回响应事件流
    async fn run(&self, messages: &[Message]) -> Result<EventStream, LlmError>;

    /// 后端名称（日志用）
    fn name(&self) -> &str {
        "llm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joined_text_single_part() {
        let event = ResponseEvent::from_texts(["commander arm"]);
        assert_eq!(event.joined_text().as_deref(), Some("commander arm"));
    }

    #[test]
    fn test_joined_text_skips_empty_parts() {
        let event = ResponseEvent {
            author: None,
            content: Some(Content {
                role: None,
                parts: vec![Part::text("line1"), Part::default(), Part::text(""), Part::text("line2")],
            }),
        };
        assert_eq!(event.joined_text().as_deref(), Some("line1\nline2"));
    }

    #[test]
    fn test_joined_text_absent_content() {
        assert_eq!(ResponseEvent::default().joined_text(), None);
        let no_parts = ResponseEvent {
            author: None,
            content: Some(Content::default()),
        };
        assert_eq!(no_parts.joined_text(), None);
    }

    #[test]
    fn test_event_schema_defaults_missing_fields() {
        let event: ResponseEvent =
            serde_json::from_str(r#"{"content": {"parts": [{"text": "ok"}, {}]}}"#).unwrap();
        assert_eq!(event.joined_text().as_deref(), Some("ok"));
    }
}
