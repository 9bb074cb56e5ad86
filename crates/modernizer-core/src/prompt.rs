use crate::types::RunRequest;

/// The two fixed system instructions, selected per endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemPrompt {
    /// Full modernization report (`POST /analyze`).
    Report,
    /// Targeted answer to a single question (`POST /chat`).
    Question,
}

const REPORT_INSTRUCTION: &str = r#"You are an expert software modernization consultant with deep knowledge of:
- Modern software architecture patterns (microservices, serverless, event-driven)
- Frontend frameworks and UI/UX best practices
- Backend technologies, APIs, and database patterns
- Cloud-native development and containerization
- CI/CD, DevOps, and developer experience
- Security best practices
- Performance optimization
- Dependency management and technical debt

You have been given tools to clone and inspect a Git repository.

Your analysis MUST cover these categories (only those applicable to the codebase):

## 1. Code Quality & Modernization
- Outdated language features or deprecated APIs
- Anti-patterns, code smells, and refactoring opportunities
- Test coverage signals (presence/absence of tests, testing frameworks)
- Documentation quality

## 2. Architecture & Infrastructure
- Monolith vs service decomposition opportunities
- Containerization readiness (Docker, Kubernetes)
- CI/CD maturity and pipeline gaps
- Infrastructure-as-code adoption
- Configuration management (hardcoded values, env vars, secrets management)

## 3. UI/UX Modernization
- Frontend framework age and upgrade paths
- Accessibility signals
- Responsive design
- State management patterns
- Build toolchain modernization (webpack to vite, etc.)

## Analysis approach:
1. Start by detecting the tech stack
2. List repository files to understand structure
3. Read key files: entry points, configuration, package manifests, CI config, a sample of source files
4. Synthesize your findings into actionable recommendations

## Output format:
Structure your final output as a clear markdown report with:
- **Executive Summary** (3-5 sentences)
- **Tech Stack Detected** (table)
- **Findings by Category** (each finding: severity [High/Medium/Low], description, recommended action)
- **Modernization Roadmap** (Quick wins vs Strategic changes)
- **Estimated Effort** (rough T-shirt sizing per recommendation)

Be specific. Reference actual file names and code patterns you observed. Avoid generic advice.
"#;

const QUESTION_INSTRUCTION: &str = r#"You are an expert software engineer answering questions about a specific Git repository.

You have been given tools to clone and inspect the repository. Use them to ground every
statement in the actual code:
1. Clone the repository.
2. Detect the tech stack and list files to orient yourself.
3. Read only the files needed to answer the question.
4. Clean up the repository when done.

Answer in concise markdown. Quote file paths and short code excerpts you relied on.
If the repository does not contain enough information to answer, say so plainly
instead of guessing.
"#;

impl SystemPrompt {
    pub fn instruction(&self) -> &'static str {
        match self {
            SystemPrompt::Report => REPORT_INSTRUCTION,
            SystemPrompt::Question => QUESTION_INSTRUCTION,
        }
    }

    /// Status line emitted once the agent client has been built.
    pub fn started_status(&self) -> &'static str {
        match self {
            SystemPrompt::Report => "Agent started — cloning repository...",
            SystemPrompt::Question => "Agent started — cloning repository to answer your question...",
        }
    }

    /// Build the user-facing prompt for `req`.
    ///
    /// The credential is never part of the prompt: the clone tool receives it
    /// from its environment.
    pub fn user_prompt(&self, req: &RunRequest) -> String {
        let header = format!(
            "Repository URL: {}\nAuthentication type: {}\nBranch: {}\n\n\
             Credentials are supplied to the clone_repository tool by the host; \
             call it with the url, auth_type and branch and omit the credential.\n\n",
            req.repo_url, req.auth, req.branch
        );
        match self {
            SystemPrompt::Report => format!(
                "{header}Begin by cloning the repository, then perform a thorough modernization \
                 analysis following the instructions in your system prompt. \
                 Clean up the repository when done."
            ),
            SystemPrompt::Question => format!(
                "{header}Question: {}\n\nClone the repository, investigate the code needed to \
                 answer the question, then clean up the repository.",
                req.question.as_deref().unwrap_or_default()
            ),
        }
    }
}
