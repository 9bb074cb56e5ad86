use std::sync::Arc;

use claude_agent::{AgentFactory, ToolSet};
use modernizer_core::config::ServerConfig;

use crate::bridge::WorkerPool;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub agents: Arc<dyn AgentFactory>,
    pub pool: WorkerPool,
    /// Tools handed to every run; per-run credentials are layered on top.
    pub tools: Arc<ToolSet>,
}

impl AppState {
    pub fn new(config: ServerConfig, agents: Arc<dyn AgentFactory>, tools: ToolSet) -> Self {
        let pool = WorkerPool::new(config.max_concurrent_runs);
        Self {
            config: Arc::new(config),
            agents,
            pool,
            tools: Arc::new(tools),
        }
    }
}
