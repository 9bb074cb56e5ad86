use crate::error::{ModernizerError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ModelOption
// ---------------------------------------------------------------------------

/// A model offered to the client by `GET /models`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOption {
    pub id: String,
    pub label: String,
}

fn default_models() -> Vec<ModelOption> {
    [
        (
            "anthropic.claude-3-5-sonnet-20241022-v2:0",
            "Claude 3.5 Sonnet (recommended)",
        ),
        (
            "anthropic.claude-3-5-haiku-20241022-v1:0",
            "Claude 3.5 Haiku (faster / cheaper)",
        ),
        (
            "anthropic.claude-3-opus-20240229-v1:0",
            "Claude 3 Opus (most capable)",
        ),
    ]
    .into_iter()
    .map(|(id, label)| ModelOption {
        id: id.to_string(),
        label: label.to_string(),
    })
    .collect()
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_model_id")]
    pub default_model: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// Upper bound on simultaneous agent runs across the whole process.
    #[serde(default = "default_max_concurrent_runs")]
    pub max_concurrent_runs: usize,
    #[serde(default = "default_claude_path")]
    pub claude_path: String,
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
    #[serde(default = "default_models")]
    pub models: Vec<ModelOption>,
}

fn default_port() -> u16 {
    8000
}

fn default_model_id() -> String {
    "anthropic.claude-3-5-sonnet-20241022-v2:0".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_max_concurrent_runs() -> usize {
    4
}

fn default_claude_path() -> String {
    "claude".to_string()
}

fn default_max_turns() -> u32 {
    60
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            default_model: default_model_id(),
            region: default_region(),
            max_concurrent_runs: default_max_concurrent_runs(),
            claude_path: default_claude_path(),
            max_turns: default_max_turns(),
            models: default_models(),
        }
    }
}

impl ServerConfig {
    /// Load a YAML config file. Missing keys fall back to their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ModernizerError::ConfigNotFound(path.display().to_string()));
        }
        let data = std::fs::read_to_string(path)?;
        let cfg: ServerConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }
}
