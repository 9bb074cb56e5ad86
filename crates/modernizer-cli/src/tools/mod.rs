use modernizer_core::repo::Workspace;
use serde_json::Value;

pub mod cleanup_repository;
pub mod clone_repository;
pub mod detect_tech_stack;
pub mod list_repository_files;
pub mod read_file_content;

pub trait RepoTool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn schema(&self) -> Value;
    fn call(&self, args: Value, ws: &Workspace) -> Result<Value, String>;
}

pub fn all_tools() -> Vec<Box<dyn RepoTool>> {
    vec![
        Box::new(clone_repository::CloneRepositoryTool),
        Box::new(list_repository_files::ListRepositoryFilesTool),
        Box::new(read_file_content::ReadFileContentTool),
        Box::new(detect_tech_stack::DetectTechStackTool),
        Box::new(cleanup_repository::CleanupRepositoryTool),
    ]
}

pub(crate) fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, String> {
    args[key]
        .as_str()
        .ok_or_else(|| format!("missing required argument: {key}"))
}

/// A non-negative integer argument, or `default` when absent.
pub(crate) fn optional_usize(args: &Value, key: &str, default: usize) -> Result<usize, String> {
    match &args[key] {
        Value::Null => Ok(default),
        v => v
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| format!("{key} must be a non-negative integer")),
    }
}
