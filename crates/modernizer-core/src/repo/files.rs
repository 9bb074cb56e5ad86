use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::error::{ModernizerError, Result};

/// Directory names never descended into: VCS metadata, dependency caches, build output.
pub const SKIP_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "__pycache__",
    ".venv",
    "venv",
    "dist",
    "build",
    ".next",
    ".nuxt",
    "vendor",
    "target",
    "bin",
    "obj",
    ".gradle",
    ".mvn",
];

/// Binary-ish or generated file extensions left out of listings.
pub const SKIP_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "ico", "svg", "woff", "woff2", "ttf", "eot", "mp4", "mp3", "zip",
    "tar", "gz", "lock",
];

pub const DEFAULT_MAX_FILES: usize = 300;
pub const DEFAULT_MAX_LINES: usize = 300;

#[derive(Debug, Clone, Serialize)]
pub struct FileListing {
    pub files: Vec<String>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileContent {
    pub content: String,
    pub lines_shown: usize,
    pub total_lines: usize,
    pub truncated: bool,
}

pub(crate) fn is_skipped_name(name: &str) -> bool {
    SKIP_DIRS.contains(&name)
}

fn has_skipped_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SKIP_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Walk `root` and return up to `max_files` relative paths, sorted, `/`-separated.
pub fn list_files(root: &Path, max_files: usize) -> FileListing {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped_name(&e.file_name().to_string_lossy()));

    for entry in walker.filter_map(|e| e.ok()) {
        if files.len() >= max_files {
            break;
        }
        if !entry.file_type().is_file() || has_skipped_extension(entry.path()) {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        let rel = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push(rel);
    }

    let total = files.len();
    FileListing { files, total }
}

/// Join `relative` onto `root` without ever leaving it.
///
/// `..` is resolved lexically; climbing above `root`, absolute paths and
/// drive prefixes are all rejected.
fn join_within(root: &Path, relative: &str) -> Result<PathBuf> {
    let mut inner = PathBuf::new();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => inner.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !inner.pop() {
                    return Err(ModernizerError::PathTraversal);
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(ModernizerError::PathTraversal)
            }
        }
    }
    Ok(root.join(inner))
}

/// Read a file inside `root`, returning at most `max_lines` lines.
pub fn read_file(root: &Path, relative: &str, max_lines: usize) -> Result<FileContent> {
    let target = join_within(root, relative)?;

    if !target.exists() {
        return Err(ModernizerError::FileNotFound(relative.to_string()));
    }

    // Symlinks may still point outside the repository.
    let real_root = root.canonicalize()?;
    let real_target = target.canonicalize()?;
    if !real_target.starts_with(&real_root) {
        return Err(ModernizerError::PathTraversal);
    }

    if !real_target.is_file() {
        return Err(ModernizerError::NotAFile(relative.to_string()));
    }

    let bytes = std::fs::read(&real_target)?;
    let text = String::from_utf8_lossy(&bytes);
    let lines: Vec<&str> = text.lines().collect();
    let total_lines = lines.len();
    let lines_shown = total_lines.min(max_lines);

    Ok(FileContent {
        content: lines[..lines_shown].join("\n"),
        lines_shown,
        total_lines,
        truncated: total_lines > max_lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("src/nested")).unwrap();
        std::fs::create_dir_all(root.join("node_modules/lib")).unwrap();
        std::fs::create_dir_all(root.join(".git/objects")).unwrap();
        std::fs::write(root.join("README.md"), "# hi\n").unwrap();
        std::fs::write(root.join("src/main.py"), "print(1)\nprint(2)\nprint(3)\n").unwrap();
        std::fs::write(root.join("src/nested/util.py"), "x = 1\n").unwrap();
        std::fs::write(root.join("src/logo.PNG"), [0u8, 1, 2]).unwrap();
        std::fs::write(root.join("yarn.lock"), "").unwrap();
        std::fs::write(root.join("node_modules/lib/index.js"), "").unwrap();
        std::fs::write(root.join(".git/objects/abc"), "").unwrap();
        dir
    }

    #[test]
    fn list_files_skips_excluded_dirs_and_extensions() {
        let dir = repo();
        let listing = list_files(dir.path(), DEFAULT_MAX_FILES);
        assert_eq!(
            listing.files,
            vec!["README.md", "src/main.py", "src/nested/util.py"]
        );
        assert_eq!(listing.total, 3);
    }

    #[test]
    fn list_files_caps_results() {
        let dir = repo();
        let listing = list_files(dir.path(), 2);
        assert_eq!(listing.files.len(), 2);
        assert_eq!(listing.total, 2);
    }

    #[test]
    fn read_file_returns_content_and_counts() {
        let dir = repo();
        let content = read_file(dir.path(), "src/main.py", DEFAULT_MAX_LINES).unwrap();
        assert_eq!(content.content, "print(1)\nprint(2)\nprint(3)");
        assert_eq!(content.total_lines, 3);
        assert_eq!(content.lines_shown, 3);
        assert!(!content.truncated);
    }

    #[test]
    fn read_file_truncates_long_files() {
        let dir = repo();
        let content = read_file(dir.path(), "src/main.py", 2).unwrap();
        assert_eq!(content.content, "print(1)\nprint(2)");
        assert_eq!(content.lines_shown, 2);
        assert_eq!(content.total_lines, 3);
        assert!(content.truncated);
    }

    #[test]
    fn read_file_rejects_parent_traversal() {
        let outer = TempDir::new().unwrap();
        let root = outer.path().join("repo");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(outer.path().join("secret.txt"), "top secret").unwrap();

        let err = read_file(&root, "../secret.txt", 10).unwrap_err();
        assert!(matches!(err, ModernizerError::PathTraversal));
        let err = read_file(&root, "a/../../secret.txt", 10).unwrap_err();
        assert!(matches!(err, ModernizerError::PathTraversal));
    }

    #[test]
    fn read_file_rejects_absolute_paths() {
        let dir = repo();
        let err = read_file(dir.path(), "/etc/passwd", 10).unwrap_err();
        assert!(matches!(err, ModernizerError::PathTraversal));
    }

    #[test]
    fn read_file_allows_inner_parent_segments() {
        let dir = repo();
        let content = read_file(dir.path(), "src/nested/../main.py", 10).unwrap();
        assert_eq!(content.total_lines, 3);
    }

    #[cfg(unix)]
    #[test]
    fn read_file_rejects_symlink_escape() {
        let outer = TempDir::new().unwrap();
        let root = outer.path().join("repo");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(outer.path().join("secret.txt"), "top secret").unwrap();
        std::os::unix::fs::symlink(outer.path().join("secret.txt"), root.join("link.txt"))
            .unwrap();

        let err = read_file(&root, "link.txt", 10).unwrap_err();
        assert!(matches!(err, ModernizerError::PathTraversal));
    }

    #[test]
    fn read_file_distinguishes_missing_and_directory() {
        let dir = repo();
        let missing = read_file(dir.path(), "nope.txt", 10).unwrap_err();
        assert_eq!(missing.to_string(), "File not found: nope.txt");
        let not_file = read_file(dir.path(), "src", 10).unwrap_err();
        assert_eq!(not_file.to_string(), "Not a file: src");
    }

    #[test]
    fn read_file_replaces_invalid_utf8() {
        let dir = repo();
        std::fs::write(dir.path().join("bin.dat"), [b'a', 0xff, b'b']).unwrap();
        let content = read_file(dir.path(), "bin.dat", 10).unwrap();
        assert_eq!(content.content, "a\u{fffd}b");
    }
}
