//! 会话管理
//!
//! 会话按 (app_name, user_id, session_id) 三元组索引，首次引用时惰性创建，进程生命周期内复用。
//! 不做过期与淘汰：会话表随不同 session_id 无界增长，仅 `reset` 可清空。

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::memory::{ConversationMemory, Message};

/// 会话键：(应用作用域, 用户, 会话 ID)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
}

impl SessionKey {
    pub fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }
}

/// 单个会话：不透明状态表 + 对话历史
pub struct Session {
    key: SessionKey,
    state: RwLock<HashMap<String, Value>>,
    history: RwLock<ConversationMemory>,
}

impl Session {
    fn new(key: SessionKey, max_context_turns: usize) -> Self {
        Self {
            key,
            state: RwLock::new(HashMap::new()),
            history: RwLock::new(ConversationMemory::new(max_context_turns)),
        }
    }

    pub fn id(&self) -> &str {
        &self.key.session_id
    }

    pub async fn state_get(&self, name: &str) -> Option<Value> {
        self.state.read().await.get(name).cloned()
    }

    pub async fn state_set(&self, name: impl Into<String>, value: Value) {
        self.state.write().await.insert(name.into(), value);
    }

    pub async fn state_len(&self) -> usize {
        self.state.read().await.len()
    }

    /// 当前保留的对话历史（按时间顺序）
    pub async fn history(&self) -> Vec<Message> {
        self.history.read().await.messages().to_vec()
    }

    /// 记录一轮完成的对话
    pub async fn push_turn(&self, user: impl Into<String>, assistant: impl Into<String>) {
        self.history.write().await.push_turn(user, assistant);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("key", &self.key).finish()
    }
}

/// 会话存储：进程内单表，单锁保护
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionKey, Arc<Session>>>,
    max_context_turns: usize,
}

impl SessionStore {
    pub fn new(max_context_turns: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_context_turns,
        }
    }

    /// 获取或创建会话；同一三元组始终返回同一个 `Arc<Session>`
    pub async fn get_or_create(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> Arc<Session> {
        let key = SessionKey::new(app_name, user_id, session_id);
        if let Some(session) = self.sessions.read().await.get(&key) {
            return session.clone();
        }

        // 写锁内再查一次，并发首次引用只会创建一个会话
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(key)
            .or_insert_with_key(|key| {
                tracing::debug!(
                    app = %key.app_name,
                    user = %key.user_id,
                    session = %key.session_id,
                    "session created"
                );
                Arc::new(Session::new(key.clone(), self.max_context_turns))
            })
            .clone()
    }

    pub async fn get(&self, app_name: &str, user_id: &str, session_id: &str) -> Option<Arc<Session>> {
        let key = SessionKey::new(app_name, user_id, session_id);
        self.sessions.read().await.get(&key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// 清空会话表；之后的引用会创建全新的会话
    pub async fn reset(&self) {
        self.sessions.write().await.clear();
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(20)
    }
}
