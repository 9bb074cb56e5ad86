//! `claude-agent`: blocking driver for the Claude CLI subprocess.
//!
//! Implements the `--output-format stream-json` protocol and exposes it as a
//! callback-driven [`Agent`]: the caller hands over a prompt and a sink for
//! [`Notification`]s, and the call returns once the model has finished.
//!
//! # Architecture
//!
//! ```text
//! ClaudeCli (AgentFactory)
//!     │  connect(model, region)
//!     ▼
//! Agent::invoke   ← builds QueryOptions, MCP config, Bedrock env
//!     │
//!     ▼
//! ClaudeProcess   ← spawns `claude --print --output-format stream-json …`
//!     │              reads JSONL from stdout on the calling thread
//!     ▼
//! Notification    ← text deltas, tool start / finish
//! ```

pub mod agent;
pub mod cli;
pub mod error;
pub mod types;

pub(crate) mod process;

#[cfg(test)]
mod tests;

pub use agent::{Agent, AgentFactory, Notification, ToolSet};
pub use cli::ClaudeCli;
pub use error::ClaudeAgentError;
pub use types::{McpServerConfig, Message, PermissionMode, QueryOptions, ResultMessage};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, ClaudeAgentError>;
