use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ModernizerError, Result};
use crate::prompt::SystemPrompt;

// ---------------------------------------------------------------------------
// AuthKind
// ---------------------------------------------------------------------------

/// How the repository clone authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthKind {
    /// Personal access token injected into an HTTPS URL.
    Pat,
    /// SSH private key material.
    Ssh,
}

impl AuthKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthKind::Pat => "pat",
            AuthKind::Ssh => "ssh",
        }
    }
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthKind {
    type Err = ModernizerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pat" => Ok(AuthKind::Pat),
            "ssh" => Ok(AuthKind::Ssh),
            other => Err(ModernizerError::InvalidAuthKind(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// RunRequest
// ---------------------------------------------------------------------------

fn default_branch() -> String {
    "main".to_string()
}

/// Raw JSON body accepted by `/analyze` and `/chat`.
///
/// Every field defaults so that a missing value reaches [`RunRequestBody::validate`]
/// and is reported as a 400 instead of a deserialization rejection.
#[derive(Clone, Default, Deserialize)]
pub struct RunRequestBody {
    #[serde(default, alias = "gitlab_url")]
    pub repo_url: String,
    #[serde(default)]
    pub auth_type: String,
    #[serde(default)]
    pub credential: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default)]
    pub model_id: String,
    #[serde(default)]
    pub question: Option<String>,
}

impl RunRequestBody {
    /// Validate the body and resolve defaults, producing an immutable [`RunRequest`].
    ///
    /// `mode` decides whether a question is required.
    pub fn validate(self, default_model: &str, mode: SystemPrompt) -> Result<RunRequest> {
        if self.repo_url.trim().is_empty() {
            return Err(ModernizerError::InvalidRequest(
                "repo_url is required".into(),
            ));
        }
        let auth = self.auth_type.parse::<AuthKind>()?;
        if self.credential.trim().is_empty() {
            return Err(ModernizerError::InvalidRequest(
                "credential is required".into(),
            ));
        }

        let question = match mode {
            SystemPrompt::Question => {
                let q = self.question.as_deref().map(str::trim).unwrap_or_default();
                if q.is_empty() {
                    return Err(ModernizerError::InvalidRequest(
                        "question is required".into(),
                    ));
                }
                Some(q.to_string())
            }
            SystemPrompt::Report => None,
        };

        let branch = match self.branch.trim() {
            "" => default_branch(),
            b => b.to_string(),
        };
        let model_id = match self.model_id.trim() {
            "" => default_model.to_string(),
            m => m.to_string(),
        };

        Ok(RunRequest {
            repo_url: self.repo_url.trim().to_string(),
            auth,
            credential: self.credential,
            branch,
            model_id,
            question,
        })
    }
}

/// A validated analysis or Q&A request.
#[derive(Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub repo_url: String,
    pub auth: AuthKind,
    pub credential: String,
    pub branch: String,
    pub model_id: String,
    pub question: Option<String>,
}

impl fmt::Debug for RunRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunRequest")
            .field("repo_url", &self.repo_url)
            .field("auth", &self.auth)
            .field("credential", &"***")
            .field("branch", &self.branch)
            .field("model_id", &self.model_id)
            .field("question", &self.question)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// StreamEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Status,
    Chunk,
    ToolUse,
    ToolResult,
    Done,
    Error,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Status => "status",
            EventKind::Chunk => "chunk",
            EventKind::ToolUse => "tool_use",
            EventKind::ToolResult => "tool_result",
            EventKind::Done => "done",
            EventKind::Error => "error",
        }
    }
}

/// One event of a run, serialized on the wire as `{"event": <kind>, "data": <payload>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamEvent {
    pub event: EventKind,
    pub data: String,
}

impl StreamEvent {
    pub fn new(event: EventKind, data: impl Into<String>) -> Self {
        Self {
            event,
            data: data.into(),
        }
    }

    pub fn status(data: impl Into<String>) -> Self {
        Self::new(EventKind::Status, data)
    }

    pub fn chunk(data: impl Into<String>) -> Self {
        Self::new(EventKind::Chunk, data)
    }

    pub fn tool_use(data: impl Into<String>) -> Self {
        Self::new(EventKind::ToolUse, data)
    }

    pub fn tool_result(data: impl Into<String>) -> Self {
        Self::new(EventKind::ToolResult, data)
    }

    pub fn done(data: impl Into<String>) -> Self {
        Self::new(EventKind::Done, data)
    }

    pub fn error(data: impl Into<String>) -> Self {
        Self::new(EventKind::Error, data)
    }

    /// `done` and `error` end a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self.event, EventKind::Done | EventKind::Error)
    }

    pub fn to_json(&self) -> String {
        // A struct of an enum and a String cannot fail to serialize.
        serde_json::to_string(self).unwrap_or_default()
    }
}
