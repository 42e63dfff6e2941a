//! PX4 agents 单次运行入口
//!
//! 用法：`px4-agents <command|search|summarizer> <query...>`。
//! 加载 .env 与配置，构建三种 Agent，对一个查询调用 stream 并把唯一的结果以 JSON 打印到 stdout。

use anyhow::{bail, Context};
use futures_util::StreamExt;
use px4_agents::{agents::build_agents, config::load_config, observability};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    observability::init();

    let mut args = std::env::args().skip(1);
    let (Some(which), query) = (args.next(), args.collect::<Vec<_>>().join(" ")) else {
        bail!("usage: px4-agents <command|search|summarizer> <query...>");
    };
    if query.trim().is_empty() {
        bail!("query must not be empty");
    }

    let cfg = load_config(None).context("Failed to load config")?;
    let agents = build_agents(&cfg).context("Failed to build agents")?;
    let wanted = format!("px4_{}_agent", which.to_lowercase());
    let Some(agent) = agents.iter().find(|a| a.name() == wanted) else {
        bail!("unknown agent: {} (expected command, search or summarizer)", which);
    };

    let session_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(agent = %agent.name(), session = %session_id, "running query");

    let mut results = agent.stream(&query, &session_id);
    while let Some(result) = results.next().await {
        println!("{}", serde_json::to_string(&result)?);
    }
    Ok(())
}
