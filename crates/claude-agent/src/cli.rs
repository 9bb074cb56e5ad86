use std::path::PathBuf;

use crate::agent::{Agent, AgentFactory, Notification, ToolSet};
use crate::process::ClaudeProcess;
use crate::types::{
    ContentBlock, Message, PartialEvent, PermissionMode, QueryOptions, SystemPayload,
    UserContentBlock,
};
use crate::{ClaudeAgentError, Result};

/// Built-in Claude tools an analysis run must never reach for; the agent
/// works exclusively through the MCP tools it is handed.
const BUILTIN_TOOLS: &[&str] = &[
    "Bash",
    "Edit",
    "Write",
    "Read",
    "Glob",
    "Grep",
    "NotebookEdit",
    "WebFetch",
    "WebSearch",
    "Task",
];

/// [`AgentFactory`] backed by the `claude` command-line client.
#[derive(Debug, Clone)]
pub struct ClaudeCli {
    pub executable: String,
    pub max_turns: u32,
    /// Route model calls through AWS Bedrock in the requested region.
    pub use_bedrock: bool,
}

impl Default for ClaudeCli {
    fn default() -> Self {
        Self {
            executable: "claude".to_string(),
            max_turns: 60,
            use_bedrock: true,
        }
    }
}

impl AgentFactory for ClaudeCli {
    fn connect(&self, model_id: &str, region: &str) -> Result<Box<dyn Agent>> {
        let executable = which::which(&self.executable)
            .map_err(|e| ClaudeAgentError::NotInstalled(format!("{}: {e}", self.executable)))?;
        if model_id.trim().is_empty() {
            return Err(ClaudeAgentError::Process("model id is empty".into()));
        }
        Ok(Box::new(ClaudeCliAgent {
            executable,
            model_id: model_id.to_string(),
            region: region.to_string(),
            max_turns: self.max_turns,
            use_bedrock: self.use_bedrock,
        }))
    }
}

struct ClaudeCliAgent {
    executable: PathBuf,
    model_id: String,
    region: String,
    max_turns: u32,
    use_bedrock: bool,
}

impl ClaudeCliAgent {
    fn options(&self, system_prompt: &str, tools: &ToolSet) -> QueryOptions {
        let mut opts = QueryOptions {
            model: Some(self.model_id.clone()),
            max_turns: Some(self.max_turns),
            allowed_tools: tools.allowed_tools.clone(),
            disallowed_tools: BUILTIN_TOOLS.iter().map(|t| t.to_string()).collect(),
            permission_mode: PermissionMode::DontAsk,
            system_prompt: Some(system_prompt.to_string()),
            mcp_servers: tools.servers.clone(),
            path_to_executable: Some(self.executable.to_string_lossy().into_owned()),
            include_partial_messages: true,
            no_session_persistence: true,
            ..Default::default()
        };
        if self.use_bedrock {
            opts.env.insert("CLAUDE_CODE_USE_BEDROCK".into(), "1".into());
            opts.env.insert("AWS_REGION".into(), self.region.clone());
        }
        opts
    }
}

impl Agent for ClaudeCliAgent {
    fn invoke(
        &mut self,
        system_prompt: &str,
        tools: &ToolSet,
        prompt: &str,
        on_event: &mut dyn FnMut(Notification),
    ) -> Result<String> {
        let opts = self.options(system_prompt, tools);
        tracing::debug!(model = %self.model_id, tools = tools.allowed_tools.len(), "spawning claude");
        let mut process = ClaudeProcess::spawn(prompt, &opts)?;
        drive(&mut process, on_event)
    }
}

/// Read `process` to its terminal result, translating stream-json messages
/// into notifications along the way.
pub(crate) fn drive(
    process: &mut ClaudeProcess,
    on_event: &mut dyn FnMut(Notification),
) -> Result<String> {
    while let Some(msg) = process.next_message()? {
        match msg {
            Message::StreamEvent(ev) => match ev.classify() {
                PartialEvent::TextDelta(text) => on_event(Notification::Text(text.to_string())),
                PartialEvent::UnknownDelta(kind) => {
                    on_event(Notification::Unrecognized(format!("stream delta {kind}")))
                }
                PartialEvent::Ignored => {}
            },
            Message::Assistant(turn) if turn.parent_tool_use_id.is_none() => {
                for block in turn.message.content {
                    if let ContentBlock::ToolUse { name, .. } = block {
                        on_event(Notification::ToolStarted { name });
                    }
                }
            }
            Message::User(turn) if turn.parent_tool_use_id.is_none() => {
                for block in turn.message.content {
                    if let UserContentBlock::ToolResult { is_error, .. } = block {
                        on_event(Notification::ToolFinished {
                            is_error: is_error.unwrap_or(false),
                        });
                    }
                }
            }
            Message::Assistant(_) | Message::User(_) => {}
            Message::System(sys) => {
                if let SystemPayload::Init(init) = sys.payload {
                    tracing::debug!(
                        session_id = %sys.session_id,
                        model = %init.model,
                        mcp_servers = init.mcp_servers.len(),
                        "claude session started"
                    );
                }
            }
            Message::Result(result) => {
                tracing::debug!(
                    session_id = result.session_id(),
                    turns = result.num_turns(),
                    cost_usd = result.cost_usd(),
                    "claude run finished"
                );
                process.kill();
                return match result.result_text() {
                    Some(text) if !result.is_error() => Ok(text.to_string()),
                    _ => Err(ClaudeAgentError::Failed(result.describe_failure())),
                };
            }
        }
    }

    Err(process
        .wait_exit_error()
        .unwrap_or_else(|| ClaudeAgentError::Process("stream ended without a result".into())))
}
