use serde::Deserialize;
use std::collections::HashMap;

// ─── Wire messages ────────────────────────────────────────────────────────

/// One line of `claude --output-format stream-json`, keyed on `"type"`.
///
/// Only the types the driver reacts to are modelled; the process reader
/// skips lines whose `"type"` is not listed here.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    System(SystemMessage),
    Assistant(AssistantMessage),
    User(UserMessage),
    Result(ResultMessage),
    StreamEvent(StreamEventMessage),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemMessage {
    pub session_id: String,
    #[serde(flatten)]
    pub payload: SystemPayload,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "subtype", rename_all = "snake_case")]
pub enum SystemPayload {
    Init(SystemInit),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemInit {
    pub model: String,
    #[serde(default)]
    pub tools: Vec<String>,
    /// `{name, status}` per configured server; only counted for logging.
    #[serde(default)]
    pub mcp_servers: Vec<serde_json::Value>,
}

/// A finished model turn. Tool calls show up here as `tool_use` blocks.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantMessage {
    pub message: AssistantContent,
    /// Set when the turn belongs to a sub-agent rather than the main loop.
    #[serde(default)]
    pub parent_tool_use_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantContent {
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    /// thinking, redacted_thinking, server tool blocks, ...
    #[serde(other)]
    Other,
}

/// Tool output handed back to the model.
#[derive(Debug, Clone, Deserialize)]
pub struct UserMessage {
    pub message: UserContent,
    #[serde(default)]
    pub parent_tool_use_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserContent {
    pub content: Vec<UserContentBlock>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserContentBlock {
    ToolResult {
        tool_use_id: String,
        #[serde(default)]
        is_error: Option<bool>,
    },
    #[serde(other)]
    Other,
}

// ─── Result ───────────────────────────────────────────────────────────────

/// Last line of every run, keyed on `"subtype"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "subtype", rename_all = "snake_case")]
pub enum ResultMessage {
    Success(ResultSuccess),
    ErrorDuringExecution(ResultError),
    ErrorMaxTurns(ResultError),
    ErrorMaxBudgetUsd(ResultError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultSuccess {
    pub session_id: String,
    pub result: String,
    #[serde(default)]
    pub is_error: bool,
    #[serde(default)]
    pub num_turns: u32,
    #[serde(default)]
    pub total_cost_usd: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultError {
    pub session_id: String,
    #[serde(default)]
    pub num_turns: u32,
    #[serde(default)]
    pub total_cost_usd: f64,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl ResultMessage {
    fn summary(&self) -> (&str, u32, f64) {
        match self {
            ResultMessage::Success(r) => (&r.session_id, r.num_turns, r.total_cost_usd),
            ResultMessage::ErrorDuringExecution(r)
            | ResultMessage::ErrorMaxTurns(r)
            | ResultMessage::ErrorMaxBudgetUsd(r) => (&r.session_id, r.num_turns, r.total_cost_usd),
        }
    }

    pub fn session_id(&self) -> &str {
        self.summary().0
    }

    pub fn num_turns(&self) -> u32 {
        self.summary().1
    }

    pub fn cost_usd(&self) -> f64 {
        self.summary().2
    }

    /// A `success` subtype can still carry `is_error: true` (e.g. an API error
    /// surfaced as the result text).
    pub fn is_error(&self) -> bool {
        !matches!(self, ResultMessage::Success(r) if !r.is_error)
    }

    pub fn result_text(&self) -> Option<&str> {
        match self {
            ResultMessage::Success(r) => Some(&r.result),
            _ => None,
        }
    }

    pub fn describe_failure(&self) -> String {
        match self {
            ResultMessage::Success(r) => r.result.clone(),
            ResultMessage::ErrorMaxTurns(r) => {
                format!("agent stopped after reaching the turn limit ({})", r.num_turns)
            }
            ResultMessage::ErrorMaxBudgetUsd(_) => "agent exceeded its budget".to_string(),
            ResultMessage::ErrorDuringExecution(r) if !r.errors.is_empty() => r.errors.join("; "),
            ResultMessage::ErrorDuringExecution(_) => "agent failed during execution".to_string(),
        }
    }
}

// ─── Partial stream events ────────────────────────────────────────────────

/// Wrapper around one raw Messages API streaming event
/// (`--include-partial-messages`).
#[derive(Debug, Clone, Deserialize)]
pub struct StreamEventMessage {
    pub event: serde_json::Value,
    #[serde(default)]
    pub parent_tool_use_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PartialEvent<'a> {
    /// A text token of the top-level assistant reply.
    TextDelta(&'a str),
    Ignored,
    /// A `content_block_delta` of a kind the driver does not know.
    UnknownDelta(String),
}

impl StreamEventMessage {
    pub fn classify(&self) -> PartialEvent<'_> {
        if self.parent_tool_use_id.is_some() || self.event["type"] != "content_block_delta" {
            return PartialEvent::Ignored;
        }
        let delta = &self.event["delta"];
        match delta["type"].as_str() {
            Some("text_delta") => match delta["text"].as_str() {
                Some(text) => PartialEvent::TextDelta(text),
                None => PartialEvent::UnknownDelta("text_delta without text".into()),
            },
            Some("input_json_delta" | "thinking_delta" | "signature_delta" | "citations_delta") => {
                PartialEvent::Ignored
            }
            Some(other) => PartialEvent::UnknownDelta(other.to_string()),
            None => PartialEvent::UnknownDelta("delta without type".into()),
        }
    }
}

// ─── Invocation ───────────────────────────────────────────────────────────

/// Everything that becomes a flag or environment variable of one `claude`
/// invocation.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Anthropic or Bedrock model id.
    pub model: Option<String>,
    pub max_turns: Option<u32>,
    /// Pre-approved tools; with [`PermissionMode::DontAsk`] nothing else runs.
    pub allowed_tools: Vec<String>,
    pub disallowed_tools: Vec<String>,
    pub permission_mode: PermissionMode,
    pub system_prompt: Option<String>,
    pub mcp_servers: Vec<McpServerConfig>,
    pub env: HashMap<String, String>,
    /// Defaults to `claude` on `PATH`.
    pub path_to_executable: Option<String>,
    pub include_partial_messages: bool,
    pub no_session_persistence: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PermissionMode {
    /// Leave the CLI's own setting alone.
    #[default]
    Default,
    /// Refuse any tool that was not pre-approved instead of prompting.
    DontAsk,
}

impl PermissionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionMode::Default => "default",
            PermissionMode::DontAsk => "dontAsk",
        }
    }
}

/// A stdio MCP server the CLI should launch for the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct McpServerConfig {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    /// Extra environment for the server process only.
    pub env: HashMap<String, String>,
}

impl McpServerConfig {
    /// The name Claude uses for `tool` served by this server.
    pub fn qualified_tool_name(&self, tool: &str) -> String {
        format!("mcp__{}__{}", self.name, tool)
    }
}
