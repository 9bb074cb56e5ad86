use std::io::{BufRead, BufReader, Lines, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex};

use crate::types::{McpServerConfig, Message, PermissionMode, QueryOptions};
use crate::{ClaudeAgentError, Result};

// ─── Process ──────────────────────────────────────────────────────────────

/// One `claude` child speaking stream-json, read from the calling thread.
///
/// The prompt goes in as a single user message on stdin, after which stdin
/// is closed. Stdout is read line by line. Stderr is collected in the
/// background and only reported if the process exits unsuccessfully.
pub(crate) struct ClaudeProcess {
    child: Child,
    lines: Lines<BufReader<ChildStdout>>,
    stdin: Option<ChildStdin>,
    stderr_buf: Arc<Mutex<String>>,
}

impl ClaudeProcess {
    pub(crate) fn spawn(prompt: &str, opts: &QueryOptions) -> Result<Self> {
        let mut cmd = build_command(opts)?;
        // Set when the server itself runs under Claude; the nested CLI refuses to start.
        cmd.env_remove("CLAUDECODE").envs(&opts.env);

        let mut process = Self::from_command(cmd)?;
        process.send_message(&serde_json::json!({
            "type": "user",
            "message": {
                "role": "user",
                "content": [{"type": "text", "text": prompt}]
            }
        }))?;
        process.close_stdin();

        Ok(process)
    }

    /// Wrap any command that prints stream-json, e.g. `cat fixture.jsonl`.
    #[cfg(test)]
    pub(crate) fn spawn_command(cmd: Command) -> Result<Self> {
        Self::from_command(cmd)
    }

    fn from_command(mut cmd: Command) -> Result<Self> {
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(ClaudeAgentError::Io)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ClaudeAgentError::Process("stdout not captured".into()))?;

        let stdin = child.stdin.take();

        // An undrained stderr pipe can fill up and stall the child.
        let stderr_buf = Arc::new(Mutex::new(String::new()));
        if let Some(stderr) = child.stderr.take() {
            let buf = Arc::clone(&stderr_buf);
            std::thread::spawn(move || {
                for line in BufReader::new(stderr).lines().map_while(|l| l.ok()) {
                    if let Ok(mut b) = buf.lock() {
                        if !b.is_empty() {
                            b.push('\n');
                        }
                        b.push_str(&line);
                    }
                }
            });
        }

        Ok(Self {
            child,
            lines: BufReader::new(stdout).lines(),
            stdin,
            stderr_buf,
        })
    }

    /// Write a JSON message to the subprocess stdin.
    pub(crate) fn send_message(&mut self, msg: &serde_json::Value) -> Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| ClaudeAgentError::Process("stdin already closed".into()))?;

        let mut buf = serde_json::to_vec(msg).map_err(|e| {
            ClaudeAgentError::Process(format!("failed to serialize stdin message: {e}"))
        })?;
        buf.push(b'\n');

        stdin.write_all(&buf)?;
        stdin.flush()?;
        Ok(())
    }

    pub(crate) fn close_stdin(&mut self) {
        self.stdin.take();
    }

    /// Read the next non-empty JSONL line from stdout and deserialize it.
    ///
    /// Valid JSON with an unrecognised `"type"` (e.g. `rate_limit_event`) is
    /// skipped. Returns `Ok(None)` on EOF.
    pub(crate) fn next_message(&mut self) -> Result<Option<Message>> {
        loop {
            let Some(line) = self.lines.next() else {
                return Ok(None);
            };
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<Message>(trimmed) {
                Ok(msg) => return Ok(Some(msg)),
                Err(_) if is_unknown_message_type(trimmed) => {
                    tracing::trace!(line = trimmed, "skipping unrecognised stream-json message");
                }
                Err(e) => {
                    return Err(ClaudeAgentError::Parse {
                        line: trimmed.to_owned(),
                        source: e,
                    })
                }
            }
        }
    }

    /// Wait for the child to exit; non-zero exit or death by signal becomes
    /// an error carrying the captured stderr.
    pub(crate) fn wait_exit_error(&mut self) -> Option<ClaudeAgentError> {
        let status = match self.child.wait() {
            Ok(s) => s,
            Err(e) => return Some(ClaudeAgentError::Io(e)),
        };

        if status.success() {
            return None;
        }

        let stderr = self
            .stderr_buf
            .lock()
            .map(|b| b.clone())
            .unwrap_or_default();

        let head = match status.code() {
            Some(code) => format!("Claude process exited with code {code}"),
            None => "Claude process terminated by signal".to_string(),
        };
        let msg = if stderr.is_empty() {
            head
        } else {
            format!("{head}\nstderr: {stderr}")
        };

        Some(ClaudeAgentError::Process(msg))
    }

    /// Kill the subprocess (best-effort).
    pub(crate) fn kill(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl Drop for ClaudeProcess {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            self.kill();
        }
    }
}

/// Valid JSON with a `"type"` field is an unknown message type; anything
/// else is a genuine parse error.
fn is_unknown_message_type(line: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(line)
        .map(|v| v.get("type").is_some())
        .unwrap_or(false)
}

// ─── Command line ─────────────────────────────────────────────────────────

pub(crate) fn build_command(opts: &QueryOptions) -> Result<Command> {
    let mut cmd = Command::new(opts.path_to_executable.as_deref().unwrap_or("claude"));
    cmd.args([
        "--print",
        "--verbose",
        "--output-format",
        "stream-json",
        "--input-format",
        "stream-json",
    ]);

    if let Some(model) = &opts.model {
        cmd.args(["--model", model.as_str()]);
    }
    if let Some(turns) = opts.max_turns {
        cmd.arg("--max-turns").arg(turns.to_string());
    }
    if let Some(prompt) = &opts.system_prompt {
        cmd.args(["--system-prompt", prompt.as_str()]);
    }
    if opts.permission_mode != PermissionMode::Default {
        cmd.args(["--permission-mode", opts.permission_mode.as_str()]);
    }
    // Both flags are variadic; each list ends at the next flag.
    if !opts.allowed_tools.is_empty() {
        cmd.arg("--allowed-tools").args(&opts.allowed_tools);
    }
    if !opts.disallowed_tools.is_empty() {
        cmd.arg("--disallowed-tools").args(&opts.disallowed_tools);
    }
    if !opts.mcp_servers.is_empty() {
        cmd.arg("--mcp-config").arg(build_mcp_config_json(&opts.mcp_servers)?);
    }
    if opts.include_partial_messages {
        cmd.arg("--include-partial-messages");
    }
    if opts.no_session_persistence {
        cmd.arg("--no-session-persistence");
    }

    Ok(cmd)
}

/// Inline value for `--mcp-config`:
/// `{"mcpServers":{"<name>":{"type":"stdio","command":..,"args":[..],"env":{..}}}}`.
///
/// The env map is how per-run credentials reach the tool server, so the
/// string must never be logged.
pub(crate) fn build_mcp_config_json(servers: &[McpServerConfig]) -> Result<String> {
    let entries: serde_json::Map<String, serde_json::Value> = servers
        .iter()
        .map(|srv| {
            let mut entry = serde_json::json!({ "type": "stdio", "command": srv.command });
            if !srv.args.is_empty() {
                entry["args"] = serde_json::json!(srv.args);
            }
            if !srv.env.is_empty() {
                entry["env"] = serde_json::json!(srv.env);
            }
            (srv.name.clone(), entry)
        })
        .collect();

    serde_json::to_string(&serde_json::json!({ "mcpServers": entries }))
        .map_err(|e| ClaudeAgentError::Process(format!("cannot encode MCP config: {e}")))
}
