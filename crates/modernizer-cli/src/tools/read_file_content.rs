use super::{optional_usize, required_str, RepoTool};
use modernizer_core::repo::{files::DEFAULT_MAX_LINES, read_file, Workspace};
use serde_json::Value;

pub struct ReadFileContentTool;

impl RepoTool for ReadFileContentTool {
    fn name(&self) -> &str {
        "read_file_content"
    }

    fn description(&self) -> &str {
        "Read a file from a cloned repository, truncated to max_lines lines"
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "repo_path": {
                    "type": "string",
                    "description": "Path returned by clone_repository"
                },
                "relative_path": {
                    "type": "string",
                    "description": "File path relative to the repository root"
                },
                "max_lines": {
                    "type": "integer",
                    "description": "Maximum number of lines to return (default: 300)"
                }
            },
            "required": ["repo_path", "relative_path"]
        })
    }

    fn call(&self, args: Value, ws: &Workspace) -> Result<Value, String> {
        let repo_path = required_str(&args, "repo_path")?;
        let relative = required_str(&args, "relative_path")?;
        let max_lines = optional_usize(&args, "max_lines", DEFAULT_MAX_LINES)?;
        let root = ws.resolve(repo_path).map_err(|e| e.to_string())?;

        let content = read_file(&root, relative, max_lines).map_err(|e| e.to_string())?;
        serde_json::to_value(content).map_err(|e| e.to_string())
    }
}
