use std::collections::BTreeSet;
use std::path::Path;

use serde::Serialize;
use walkdir::WalkDir;

use crate::repo::files::is_skipped_name;

/// Languages, frameworks and tooling signals found in a repository.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TechStack {
    pub languages: Vec<String>,
    pub frameworks: Vec<String>,
    pub build_tools: Vec<String>,
    pub ci_cd: Vec<String>,
    pub containerization: Vec<String>,
    pub package_managers: Vec<String>,
    pub manifest_files: Vec<String>,
}

const EXTENSION_LANGUAGES: &[(&str, &str)] = &[
    ("py", "Python"),
    ("js", "JavaScript"),
    ("mjs", "JavaScript"),
    ("ts", "TypeScript"),
    ("tsx", "TypeScript"),
    ("java", "Java"),
    ("go", "Go"),
    ("rb", "Ruby"),
    ("php", "PHP"),
    ("cs", "C#"),
    ("rs", "Rust"),
];

const MANIFESTS: &[&str] = &[
    "package.json",
    "requirements.txt",
    "requirements-dev.txt",
    "pyproject.toml",
    "Pipfile",
    "pom.xml",
    "build.gradle",
    "go.mod",
    "Gemfile",
    "composer.json",
    "Cargo.toml",
    "setup.py",
    "setup.cfg",
];

const CI_FILES: &[&str] = &[
    ".gitlab-ci.yml",
    ".github/workflows",
    "Jenkinsfile",
    ".circleci/config.yml",
    "azure-pipelines.yml",
    "bitbucket-pipelines.yml",
];

const CONTAINER_FILES: &[&str] = &[
    "Dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    "kubernetes",
    "k8s",
    "helm",
    ".helm",
];

const BUILD_TOOLS: &[(&str, &str)] = &[
    ("Maven", "pom.xml"),
    ("Gradle", "build.gradle"),
    ("Make", "Makefile"),
    ("npm", "package-lock.json"),
    ("yarn", "yarn.lock"),
    ("pnpm", "pnpm-lock.yaml"),
    ("Poetry", "pyproject.toml"),
];

const PACKAGE_MANAGERS: &[(&str, &str)] = &[
    ("npm", "package-lock.json"),
    ("yarn", "yarn.lock"),
    ("pnpm", "pnpm-lock.yaml"),
    ("pip", "requirements.txt"),
    ("pip", "setup.py"),
    ("Pipenv", "Pipfile"),
    ("Poetry", "poetry.lock"),
    ("Cargo", "Cargo.toml"),
    ("Go modules", "go.mod"),
    ("Bundler", "Gemfile"),
    ("Composer", "composer.json"),
    ("Maven", "pom.xml"),
    ("Gradle", "build.gradle"),
];

const JS_FRAMEWORKS: &[(&str, &str)] = &[
    ("react", "React"),
    ("vue", "Vue"),
    ("angular", "Angular"),
    ("@angular/core", "Angular"),
    ("svelte", "Svelte"),
    ("next", "Next.js"),
    ("nuxt", "Nuxt"),
    ("express", "Express"),
    ("koa", "Koa"),
    ("fastify", "Fastify"),
];

const PY_FRAMEWORKS: &[(&str, &str)] = &[
    ("django", "Django"),
    ("flask", "Flask"),
    ("fastapi", "FastAPI"),
    ("tornado", "Tornado"),
    ("pyramid", "Pyramid"),
    ("falcon", "Falcon"),
];

/// Marker files that identify a framework on their own.
const FRAMEWORK_MARKERS: &[(&str, &str)] = &[
    ("angular.json", "Angular"),
    ("manage.py", "Django"),
    ("next.config.js", "Next.js"),
    ("next.config.ts", "Next.js"),
];

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

/// Inspect well-known filenames and manifest contents under `root`.
pub fn detect_stack(root: &Path) -> TechStack {
    let mut stack = TechStack::default();
    let exists = |name: &str| root.join(name).exists();

    for name in MANIFESTS.iter().copied().filter(|n| exists(*n)) {
        stack.manifest_files.push(name.to_string());
    }

    let extensions: BTreeSet<String> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped_name(&e.file_name().to_string_lossy()))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            e.path()
                .extension()
                .and_then(|x| x.to_str())
                .map(|x| x.to_ascii_lowercase())
        })
        .collect();
    for (ext, lang) in EXTENSION_LANGUAGES {
        if extensions.contains(*ext) {
            push_unique(&mut stack.languages, lang);
        }
    }

    if let Ok(raw) = std::fs::read_to_string(root.join("package.json")) {
        if let Ok(pkg) = serde_json::from_str::<serde_json::Value>(&raw) {
            let has_dep = |name: &str| {
                ["dependencies", "devDependencies"]
                    .iter()
                    .any(|section| pkg[*section].get(name).is_some())
            };
            for (dep, label) in JS_FRAMEWORKS {
                if has_dep(*dep) {
                    push_unique(&mut stack.frameworks, label);
                }
            }
        }
    }

    if let Ok(entries) = std::fs::read_dir(root) {
        let mut requirement_files: Vec<_> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with("requirements") && n.ends_with(".txt"))
            .collect();
        requirement_files.sort();
        for file in requirement_files {
            let Ok(content) = std::fs::read_to_string(root.join(&file)) else {
                continue;
            };
            let content = content.to_lowercase();
            for (pkg, label) in PY_FRAMEWORKS {
                if content.contains(pkg) {
                    push_unique(&mut stack.frameworks, label);
                }
            }
        }
    }

    for (marker, label) in FRAMEWORK_MARKERS {
        if exists(*marker) {
            push_unique(&mut stack.frameworks, label);
        }
    }
    if let Ok(pom) = std::fs::read_to_string(root.join("pom.xml")) {
        if pom.contains("spring-boot") {
            push_unique(&mut stack.frameworks, "Spring Boot");
        }
    }

    for name in CI_FILES.iter().copied().filter(|n| exists(*n)) {
        stack.ci_cd.push(name.to_string());
    }
    for name in CONTAINER_FILES.iter().copied().filter(|n| exists(*n)) {
        stack.containerization.push(name.to_string());
    }
    for (tool, file) in BUILD_TOOLS {
        if exists(*file) {
            push_unique(&mut stack.build_tools, tool);
        }
    }
    for (manager, file) in PACKAGE_MANAGERS {
        if exists(*file) {
            push_unique(&mut stack.package_managers, manager);
        }
    }

    stack
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn detects_node_project() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(
            root,
            "package.json",
            r#"{"dependencies":{"react":"18","express":"4"},"devDependencies":{"@angular/core":"17"}}"#,
        );
        write(root, "yarn.lock", "");
        write(root, "src/app.tsx", "");
        write(root, "src/server.js", "");
        write(root, "Dockerfile", "FROM node");
        write(root, ".github/workflows/ci.yml", "");
        write(root, "node_modules/x/index.rb", "");

        let stack = detect_stack(root);
        assert_eq!(stack.languages, vec!["JavaScript", "TypeScript"]);
        assert_eq!(stack.frameworks, vec!["React", "Angular", "Express"]);
        assert_eq!(stack.build_tools, vec!["yarn"]);
        assert_eq!(stack.package_managers, vec!["yarn"]);
        assert_eq!(stack.manifest_files, vec!["package.json"]);
        assert_eq!(stack.ci_cd, vec![".github/workflows"]);
        assert_eq!(stack.containerization, vec!["Dockerfile"]);
    }

    #[test]
    fn detects_python_project() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "requirements.txt", "Django==4.2\nrequests\n");
        write(root, "requirements-dev.txt", "fastapi\n");
        write(root, "pyproject.toml", "[tool.poetry]\n");
        write(root, "manage.py", "");
        write(root, "app/models.py", "");
        write(root, ".gitlab-ci.yml", "");

        let stack = detect_stack(root);
        assert_eq!(stack.languages, vec!["Python"]);
        assert_eq!(stack.frameworks, vec!["FastAPI", "Django"]);
        assert_eq!(stack.build_tools, vec!["Poetry"]);
        assert_eq!(stack.package_managers, vec!["pip"]);
        assert_eq!(
            stack.manifest_files,
            vec!["requirements.txt", "requirements-dev.txt", "pyproject.toml"]
        );
        assert_eq!(stack.ci_cd, vec![".gitlab-ci.yml"]);
    }

    #[test]
    fn empty_repository_yields_empty_stack() {
        let dir = TempDir::new().unwrap();
        let stack = detect_stack(dir.path());
        assert!(stack.languages.is_empty());
        assert!(stack.frameworks.is_empty());
        assert!(stack.manifest_files.is_empty());
    }

    #[test]
    fn malformed_package_json_is_ignored() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "package.json", "{ not json");
        let stack = detect_stack(dir.path());
        assert!(stack.frameworks.is_empty());
        assert_eq!(stack.manifest_files, vec!["package.json"]);
    }
}
