use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use claude_agent::{ClaudeCli, McpServerConfig, ToolSet};
use clap::Args;
use modernizer_core::config::ServerConfig;
use modernizer_server::AppState;

use crate::tools;

/// Name the tool server is registered under; tools appear to the model as
/// `mcp__repo__<tool>`.
pub const MCP_SERVER_NAME: &str = "repo";

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// YAML config file; flags and environment variables override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Port to listen on [default: 8000]
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Model used when a request carries no model_id
    #[arg(long, env = "DEFAULT_MODEL_ID")]
    pub default_model: Option<String>,

    /// AWS region for Bedrock [default: us-east-1]
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Agent runs allowed at once; further requests get 503 [default: 4]
    #[arg(long, env = "MAX_CONCURRENT_RUNS")]
    pub max_concurrent_runs: Option<usize>,

    /// Path to the claude executable [default: claude]
    #[arg(long, env = "CLAUDE_PATH")]
    pub claude_path: Option<String>,

    /// Agent turn limit per run [default: 60]
    #[arg(long, env = "MAX_TURNS")]
    pub max_turns: Option<u32>,
}

impl ServeArgs {
    /// Layer flags and environment over the config file over built-in defaults.
    pub fn resolve(self) -> Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => ServerConfig::default(),
        };
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(model) = self.default_model {
            config.default_model = model;
        }
        if let Some(region) = self.region {
            config.region = region;
        }
        if let Some(n) = self.max_concurrent_runs {
            config.max_concurrent_runs = n;
        }
        if let Some(path) = self.claude_path {
            config.claude_path = path;
        }
        if let Some(turns) = self.max_turns {
            config.max_turns = turns;
        }
        Ok(config)
    }
}

/// The repository tools, served by this same binary's `mcp` subcommand.
pub fn repo_tool_set() -> Result<ToolSet> {
    let exe = std::env::current_exe().context("cannot locate the modernizer executable")?;
    let server = McpServerConfig {
        name: MCP_SERVER_NAME.to_string(),
        command: exe.to_string_lossy().into_owned(),
        args: vec!["mcp".to_string()],
        env: Default::default(),
    };
    let allowed_tools = tools::all_tools()
        .iter()
        .map(|t| server.qualified_tool_name(t.name()))
        .collect();
    Ok(ToolSet {
        servers: vec![server],
        allowed_tools,
    })
}

pub fn run(args: ServeArgs) -> Result<()> {
    let config = args.resolve()?;
    let agents = ClaudeCli {
        executable: config.claude_path.clone(),
        max_turns: config.max_turns,
        use_bedrock: true,
    };
    let tools = repo_tool_set()?;

    tracing::info!(
        default_model = %config.default_model,
        region = %config.region,
        max_concurrent_runs = config.max_concurrent_runs,
        claude = %config.claude_path,
        "starting modernizer"
    );

    let port = config.port;
    let state = AppState::new(config, Arc::new(agents), tools);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(modernizer_server::serve(state, port))
}
