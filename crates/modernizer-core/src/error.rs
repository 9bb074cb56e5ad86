use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModernizerError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("auth_type must be 'pat' or 'ssh', got '{0}'")]
    InvalidAuthKind(String),

    #[error("Path traversal detected")]
    PathTraversal,

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error("Unknown repository: {0}")]
    UnknownRepository(String),

    #[error("Cannot inject PAT into URL: {0}")]
    UnsupportedUrl(String),

    #[error("clone failed: {0}")]
    CloneFailed(String),

    #[error("config not found: {0}")]
    ConfigNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ModernizerError>;
