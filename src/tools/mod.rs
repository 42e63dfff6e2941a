//! 外部能力：Web 检索（SerpApi）与页面抓取

pub mod fetch;
pub mod web_search;

pub use fetch::{strip_html_tags, truncate_chars, HttpFetcher, PageFetcher, MAX_CONTENT_CHARS};
pub use web_search::{build_query, parse_top_result, SearchProvider, SearchResult, SerpApiClient};
