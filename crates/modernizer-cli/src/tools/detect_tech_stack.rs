use super::{required_str, RepoTool};
use modernizer_core::repo::{detect_stack, Workspace};
use serde_json::Value;

pub struct DetectTechStackTool;

impl RepoTool for DetectTechStackTool {
    fn name(&self) -> &str {
        "detect_tech_stack"
    }

    fn description(&self) -> &str {
        "Detect languages, frameworks, build tools, CI/CD, containerization and package managers \
         used by a cloned repository"
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "repo_path": {
                    "type": "string",
                    "description": "Path returned by clone_repository"
                }
            },
            "required": ["repo_path"]
        })
    }

    fn call(&self, args: Value, ws: &Workspace) -> Result<Value, String> {
        let repo_path = required_str(&args, "repo_path")?;
        let root = ws.resolve(repo_path).map_err(|e| e.to_string())?;
        serde_json::to_value(detect_stack(&root)).map_err(|e| e.to_string())
    }
}
