use super::{required_str, RepoTool};
use modernizer_core::repo::{CloneSource, Workspace, AUTH_TYPE_ENV, CREDENTIAL_ENV};
use modernizer_core::AuthKind;
use serde_json::Value;

pub struct CloneRepositoryTool;

impl RepoTool for CloneRepositoryTool {
    fn name(&self) -> &str {
        "clone_repository"
    }

    fn description(&self) -> &str {
        "Shallow-clone a git repository into a temporary directory and return its path. \
         Credentials are supplied by the server; pass only the URL and branch."
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "Repository URL (HTTPS for pat, SSH for ssh)"
                },
                "auth_type": {
                    "type": "string",
                    "enum": ["pat", "ssh"],
                    "description": "Authentication method; defaults to the server-provided one"
                },
                "branch": {
                    "type": "string",
                    "description": "Branch to clone (default: main)"
                }
            },
            "required": ["url"]
        })
    }

    fn call(&self, args: Value, ws: &Workspace) -> Result<Value, String> {
        let url = required_str(&args, "url")?;
        let branch = args["branch"].as_str().unwrap_or("main");
        let (auth, credential) = credentials(&args, |key| std::env::var(key).ok())?;

        let repo_path = ws
            .clone_repository(&CloneSource {
                url,
                auth,
                credential: &credential,
                branch,
            })
            .map_err(|e| e.to_string())?;

        tracing::info!(path = %repo_path.display(), branch, "repository cloned");
        Ok(serde_json::json!({ "repo_path": repo_path.to_string_lossy() }))
    }
}

/// The auth kind always travels with its credential. An explicit
/// `credential` argument uses the `auth_type` argument (default `pat`).
/// A server-provided credential uses the server-provided auth type, and a
/// conflicting `auth_type` argument is refused so a key is never sent down
/// the wrong path (e.g. an SSH key injected into a URL).
fn credentials(
    args: &Value,
    env: impl Fn(&str) -> Option<String>,
) -> Result<(AuthKind, String), String> {
    let requested = args["auth_type"]
        .as_str()
        .map(|s| s.parse::<AuthKind>().map_err(|e| e.to_string()))
        .transpose()?;

    let (auth, credential) = match args["credential"].as_str() {
        Some(cred) => (requested.unwrap_or(AuthKind::Pat), cred.to_string()),
        None => {
            let cred = env(CREDENTIAL_ENV)
                .ok_or_else(|| "missing required argument: credential".to_string())?;
            let auth = match env(AUTH_TYPE_ENV) {
                Some(s) => s.parse::<AuthKind>().map_err(|e| e.to_string())?,
                None => AuthKind::Pat,
            };
            if let Some(req) = requested.filter(|req| *req != auth) {
                return Err(format!(
                    "auth_type '{req}' does not match the server-provided credential ('{auth}')"
                ));
            }
            (auth, cred)
        }
    };

    if credential.trim().is_empty() {
        return Err("credential must not be empty".to_string());
    }
    Ok((auth, credential))
}
