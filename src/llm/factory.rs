//! 按配置与环境变量选择 LLM 后端（DeepSeek / OpenAI 兼容 / Mock）

use std::sync::Arc;

use crate::config::LlmSection;
use crate::llm::{LlmClient, MockLlmClient, OpenAiClient};

/// DeepSeek 提供与 OpenAI 兼容的接口
pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
pub const DEEPSEEK_CHAT: &str = "deepseek-chat";

/// 创建 DeepSeek 客户端：Key 取 `DEEPSEEK_API_KEY`，其次 `OPENAI_API_KEY`；模型默认 deepseek-chat
pub fn create_deepseek_client(model: Option<&str>) -> OpenAiClient {
    let api_key = std::env::var("DEEPSEEK_API_KEY")
        .or_else(|_| std::env::var("OPENAI_API_KEY"))
        .ok();
    let model = model
        .map(String::from)
        .or_else(|| std::env::var("DEEPSEEK_MODEL").ok())
        .unwrap_or_else(|| DEEPSEEK_CHAT.to_string());
    OpenAiClient::new(Some(DEEPSEEK_BASE_URL), &model, api_key.as_deref())
}

/// 后端种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    DeepSeek,
    OpenAi,
    Mock,
}

/// 先按配置的 provider 选择；该 provider 无可用 Key（或 provider 未知）时按已有 Key 兜底，均无则 Mock
fn select_backend(provider: &str, has_deepseek_key: bool, has_openai_key: bool) -> Backend {
    match provider {
        "mock" => Backend::Mock,
        "deepseek" if has_deepseek_key || has_openai_key => Backend::DeepSeek,
        "openai" if has_openai_key => Backend::OpenAi,
        _ if has_deepseek_key => Backend::DeepSeek,
        _ if has_openai_key => Backend::OpenAi,
        _ => Backend::Mock,
    }
}

/// 按配置与环境变量构造 LLM 客户端
pub fn create_llm_from_config(llm: &LlmSection) -> Arc<dyn LlmClient> {
    let provider = llm.provider.to_lowercase();
    let backend = if provider == "mock" {
        Backend::Mock
    } else {
        select_backend(
            &provider,
            std::env::var("DEEPSEEK_API_KEY").is_ok(),
            std::env::var("OPENAI_API_KEY").is_ok(),
        )
    };

    match backend {
        Backend::DeepSeek => {
            let model = llm
                .deepseek
                .model
                .clone()
                .unwrap_or_else(|| llm.model.clone());
            tracing::info!("Using DeepSeek LLM ({})", model);
            Arc::new(create_deepseek_client(Some(&model)))
        }
        Backend::OpenAi => {
            let model = llm
                .openai
                .model
                .clone()
                .unwrap_or_else(|| "gpt-4o-mini".to_string());
            tracing::info!("Using OpenAI LLM ({})", model);
            Arc::new(OpenAiClient::new(llm.base_url.as_deref(), &model, None))
        }
        Backend::Mock if provider == "mock" => {
            tracing::info!("Using Mock LLM (configured)");
            Arc::new(MockLlmClient::new())
        }
        Backend::Mock => {
            tracing::warn!("No API key set for provider {}, using Mock LLM", provider);
            Arc::new(MockLlmClient::new())
        }
    }
}
