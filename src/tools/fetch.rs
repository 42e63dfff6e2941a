//! 页面抓取：限时 GET、HTML 转纯文本、按字符数硬截断
//!
//! 对 HTML 响应使用 html2text 的无修饰模式提取纯文本（不输出标题井号、强调星号、链接脚注等），
//! 失败时退回简易标签剥离，文本节点按行拼接；
//! 提取后无条件截断到 max_chars 个字符，不考虑词句边界。

use std::time::Duration;

use async_trait::async_trait;
use html2text::config::plain_no_decorate;
use reqwest::Client;

use crate::config::FetchSection;
use crate::core::AgentError;

/// 正文截断上限（字符）
pub const MAX_CONTENT_CHARS: usize = 8000;

/// 页面抓取能力
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 抓取 URL 并返回截断后的纯文本
    async fn fetch(&self, url: &str) -> Result<String, AgentError>;
}

/// 保留前 max_chars 个字符（按 Unicode 标量计数）；未超出时原样返回
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// 简易去除 HTML 标签，各文本节点按行拼接（html2text 失败时的回退）
pub fn strip_html_tags(html: &str) -> String {
    let mut nodes = Vec::new();
    let mut current = String::new();
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                let node = current.trim();
                if !node.is_empty() {
                    nodes.push(node.to_string());
                }
                current.clear();
            }
            '>' => in_tag = false,
            _ if !in_tag => current.push(c),
            _ => {}
        }
    }
    let tail = current.trim();
    if !tail.is_empty() {
        nodes.push(tail.to_string());
    }
    nodes.join("\n")
}

/// 判断内容是否像 HTML（需提取可读文本）
fn looks_like_html(s: &str) -> bool {
    let s = s.trim_start();
    s.starts_with("<!")
        || s.starts_with("<html")
        || s.starts_with("<HTML")
        || (s.len() > 20
            && s.contains('<')
            && (s.contains("</") || s.contains("<meta") || s.contains("<head") || s.contains("<title")))
}

/// 基于 reqwest 的页面抓取器
pub struct HttpFetcher {
    client: Client,
    max_chars: usize,
    wrap_width: usize,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, max_chars: usize, wrap_width: usize) -> Result<Self, AgentError> {
        const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AgentError::ConfigError(format!("http client: {}", e)))?;
        Ok(Self {
            client,
            max_chars,
            wrap_width,
        })
    }

    pub fn from_config(cfg: &FetchSection) -> Result<Self, AgentError> {
        Self::new(
            Duration::from_secs(cfg.timeout_secs),
            cfg.max_chars,
            cfg.wrap_width,
        )
    }

    /// 将 HTML 转为纯文本，丢弃标记与结构修饰
    fn html_to_text(&self, html: &str) -> String {
        match plain_no_decorate().string_from_read(html.as_bytes(), self.wrap_width) {
            Ok(text) if !text.trim().is_empty() => text,
            _ => strip_html_tags(html),
        }
    }

    /// 从响应正文提取纯文本并截断
    pub fn extract(&self, body: &str) -> String {
        let body = body.trim_start_matches('\u{FEFF}');
        let text = if looks_like_html(body) {
            self.html_to_text(body)
        } else {
            body.to_string()
        };
        truncate_chars(&text, self.max_chars)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AgentError> {
        tracing::info!(url = %url, "fetching page");
        let resp = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AgentError::Fetch(format!("Request timed out: {}", e))
            } else {
                AgentError::Fetch(format!("Request failed: {}", e))
            }
        })?;
        if !resp.status().is_success() {
            return Err(AgentError::Fetch(format!("HTTP {}", resp.status())));
        }
        let body = resp
            .text()
            .await
            .map_err(|e| AgentError::Fetch(format!("Read body: {}", e)))?;

        let text = self.extract(&body);
        tracing::debug!(url = %url, chars = text.chars().count(), "page text extracted");
        Ok(text)
    }
}
