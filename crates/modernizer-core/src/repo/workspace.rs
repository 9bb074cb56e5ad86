use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tempfile::TempDir;

use crate::error::{ModernizerError, Result};
use crate::repo::clone::{clone_into, CloneSource};

/// Owns every repository cloned by one tool server.
///
/// Each clone is a [`TempDir`], so a clone that is never released through
/// [`Workspace::release`] is still deleted when the workspace is dropped.
#[derive(Default)]
pub struct Workspace {
    clones: Mutex<HashMap<PathBuf, TempDir>>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    fn clones(&self) -> MutexGuard<'_, HashMap<PathBuf, TempDir>> {
        self.clones.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clone `source` into a fresh temporary directory and register it.
    ///
    /// On failure the directory is removed before returning.
    pub fn clone_repository(&self, source: &CloneSource<'_>) -> Result<PathBuf> {
        let dest = tempfile::Builder::new()
            .prefix("modernizer_repo_")
            .tempdir()?;
        clone_into(dest.path(), source)?;
        Ok(self.register(dest))
    }

    /// Take ownership of `dir` and return the key it is tracked under.
    pub fn register(&self, dir: TempDir) -> PathBuf {
        let key = dir
            .path()
            .canonicalize()
            .unwrap_or_else(|_| dir.path().to_path_buf());
        self.clones().insert(key.clone(), dir);
        key
    }

    /// Resolve `repo_path` to a registered clone root.
    pub fn resolve(&self, repo_path: &str) -> Result<PathBuf> {
        let key = canonical_key(repo_path)?;
        if self.clones().contains_key(&key) {
            Ok(key)
        } else {
            Err(ModernizerError::UnknownRepository(repo_path.to_string()))
        }
    }

    /// Remove a clone from the workspace and delete it from disk.
    pub fn release(&self, repo_path: &str) -> Result<PathBuf> {
        let key = canonical_key(repo_path)?;
        let dir = self
            .clones()
            .remove(&key)
            .ok_or_else(|| ModernizerError::UnknownRepository(repo_path.to_string()))?;
        dir.close()?;
        Ok(key)
    }

    pub fn len(&self) -> usize {
        self.clones().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let remaining = self.clones().len();
        if remaining > 0 {
            tracing::info!(remaining, "removing clones left behind by the agent");
        }
    }
}

fn canonical_key(repo_path: &str) -> Result<PathBuf> {
    Path::new(repo_path)
        .canonicalize()
        .map_err(|_| ModernizerError::UnknownRepository(repo_path.to_string()))
}
