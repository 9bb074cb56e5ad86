use super::{optional_usize, required_str, RepoTool};
use modernizer_core::repo::{files::DEFAULT_MAX_FILES, list_files, Workspace};
use serde_json::Value;

pub struct ListRepositoryFilesTool;

impl RepoTool for ListRepositoryFilesTool {
    fn name(&self) -> &str {
        "list_repository_files"
    }

    fn description(&self) -> &str {
        "List source files in a cloned repository, skipping dependency, build and binary files"
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "repo_path": {
                    "type": "string",
                    "description": "Path returned by clone_repository"
                },
                "max_files": {
                    "type": "integer",
                    "description": "Maximum number of files to return (default: 300)"
                }
            },
            "required": ["repo_path"]
        })
    }

    fn call(&self, args: Value, ws: &Workspace) -> Result<Value, String> {
        let repo_path = required_str(&args, "repo_path")?;
        let max_files = optional_usize(&args, "max_files", DEFAULT_MAX_FILES)?;
        let root = ws.resolve(repo_path).map_err(|e| e.to_string())?;

        serde_json::to_value(list_files(&root, max_files)).map_err(|e| e.to_string())
    }
}
