//! LLM 层：客户端抽象、响应事件模型与实现（OpenAI 兼容 / DeepSeek / Mock）

pub mod factory;
pub mod mock;
pub mod openai;
pub mod traits;

pub use factory::{create_deepseek_client, create_llm_from_config, DEEPSEEK_CHAT};
pub use mock::MockLlmClient;
pub use openai::OpenAiClient;
pub use traits::{Content, EventStream, LlmClient, LlmError, Part, ResponseEvent};
