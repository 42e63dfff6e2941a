//! PX4 智能体：把自然语言查询转成文本结果的三种 Agent
//!
//! 模块划分：
//! - **agents**: Agent 接口与三种实现（命令生成 / 文档检索 / 文档摘要）、响应生成、流式适配
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型
//! - **llm**: LLM 客户端抽象、响应事件模型与实现（OpenAI 兼容 / DeepSeek / Mock）
//! - **memory**: 会话内对话历史
//! - **observability**: 日志初始化
//! - **session**: 会话存储（按 app/user/session 三元组获取或创建）
//! - **tools**: Web 检索（SerpApi）与页面抓取

pub mod agents;
pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod session;
pub mod tools;

pub use agents::{Agent, Px4CommandAgent, Px4SearchAgent, Px4SummarizerAgent, TaskResult};
pub use crate::core::AgentError;
pub use session::{Session, SessionStore};
