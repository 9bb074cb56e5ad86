pub mod config;
pub mod error;
pub mod prompt;
pub mod repo;
pub mod types;

pub use error::{ModernizerError, Result};
pub use prompt::SystemPrompt;
pub use types::{AuthKind, EventKind, RunRequest, RunRequestBody, StreamEvent};
