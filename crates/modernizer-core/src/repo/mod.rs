//! Repository operations backing the agent's tool set.
//!
//! Everything here is synchronous and filesystem-bound. Callers that need an
//! async context run these on a blocking worker.

pub mod clone;
pub mod files;
pub mod stack;
pub mod workspace;

pub use clone::{authenticated_url, CloneSource, AUTH_TYPE_ENV, CREDENTIAL_ENV};
pub use files::{list_files, read_file, FileContent, FileListing};
pub use stack::{detect_stack, TechStack};
pub use workspace::Workspace;
