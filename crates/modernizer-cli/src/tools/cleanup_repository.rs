use super::RepoTool;
use modernizer_core::repo::Workspace;
use serde_json::Value;

pub struct CleanupRepositoryTool;

impl RepoTool for CleanupRepositoryTool {
    fn name(&self) -> &str {
        "cleanup_repository"
    }

    fn description(&self) -> &str {
        "Delete a cloned repository once the analysis is complete"
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

    /// Always succeeds at the protocol level; failures are reported in the
    /// `status` field so the agent can carry on with its report.
    fn call(&self, args: Value, ws: &Workspace) -> Result<Value, String> {
        let Some(repo_path) = args["repo_path"].as_str() else {
            return Ok(serde_json::json!({
                "status": "error",
                "error": "missing required argument: repo_path"
            }));
        };

        Ok(match ws.release(repo_path) {
            Ok(path) => {
                tracing::info!(path = %path.display(), "repository removed");
                serde_json::json!({ "status": "deleted", "path": path.to_string_lossy() })
            }
            Err(e) => serde_json::json!({ "status": "error", "error": e.to_string() }),
        })
    }
}
