//! The blocking agent interface the server drives.
//!
//! An [`Agent`] runs one prompt to completion on the calling thread and
//! reports progress through a callback. Implementations must invoke the
//! callback from that same thread, in the order events happen.

use crate::types::McpServerConfig;
use crate::Result;

/// A progress notification raised by an agent while it works.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A fragment of the model's reply text.
    Text(String),
    /// The model asked for a tool.
    ToolStarted { name: String },
    /// A tool call returned.
    ToolFinished { is_error: bool },
    /// Something the agent emitted that has no mapping; carries a short
    /// description for logging.
    Unrecognized(String),
}

/// The tools an agent may call for one run.
#[derive(Debug, Clone, Default)]
pub struct ToolSet {
    pub servers: Vec<McpServerConfig>,
    /// Fully qualified tool names (`mcp__<server>__<tool>`).
    pub allowed_tools: Vec<String>,
}

impl ToolSet {
    /// Add `vars` to the environment of every server in the set.
    pub fn with_env<'a>(mut self, vars: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let vars: Vec<_> = vars.into_iter().collect();
        for server in &mut self.servers {
            for (k, v) in &vars {
                server.env.insert((*k).to_string(), (*v).to_string());
            }
        }
        self
    }
}

/// A connected model session able to run prompts.
pub trait Agent: Send {
    /// Run `prompt` to completion and return the agent's final text.
    ///
    /// Blocks the calling thread. `on_event` is called synchronously for
    /// every notification, before this method returns.
    fn invoke(
        &mut self,
        system_prompt: &str,
        tools: &ToolSet,
        prompt: &str,
        on_event: &mut dyn FnMut(Notification),
    ) -> Result<String>;
}

/// Creates agents bound to a model.
pub trait AgentFactory: Send + Sync {
    fn connect(&self, model_id: &str, region: &str) -> Result<Box<dyn Agent>>;
}
