/// Deserialization tests for `Message` using representative stream-json
/// payloads captured from the Claude CLI protocol.
#[cfg(test)]
mod unit {
    use crate::types::{Message, PartialEvent, ResultMessage, SystemPayload};

    fn parse(json: &str) -> Message {
        serde_json::from_str(json).expect("failed to parse message")
    }

    #[test]
    fn parse_system_init() {
        let json = r#"{
            "type": "system",
            "subtype": "init",
            "session_id": "abc-123",
            "model": "anthropic.claude-3-5-sonnet-20241022-v2:0",
            "tools": ["mcp__repo__clone_repository", "mcp__repo__read_file"],
            "mcp_servers": [{"name": "repo", "status": "connected"}],
            "permission_mode": "dontAsk",
            "cwd": "/tmp"
        }"#;
        let Message::System(sys) = parse(json) else {
            panic!("expected System")
        };
        assert_eq!(sys.session_id, "abc-123");
        let SystemPayload::Init(init) = sys.payload else {
            panic!("expected Init")
        };
        assert_eq!(init.tools.len(), 2);
        assert_eq!(init.mcp_servers[0]["name"], "repo");
    }

    #[test]
    fn parse_system_unknown_subtype() {
        let json = r#"{
            "type": "system",
            "subtype": "compact_boundary",
            "session_id": "abc-123"
        }"#;
        let Message::System(sys) = parse(json) else {
            panic!("expected System")
        };
        assert!(matches!(sys.payload, SystemPayload::Unknown));
    }

    #[test]
    fn parse_result_success() {
        let json = r#"{
            "type": "result",
            "subtype": "success",
            "session_id": "abc-123",
            "result": "Executive Summary",
            "duration_ms": 5000,
            "is_error": false,
            "num_turns": 7,
            "total_cost_usd": 0.0042
        }"#;
        let Message::Result(result) = parse(json) else {
            panic!("expected Result")
        };
        assert!(!result.is_error());
        assert_eq!(result.session_id(), "abc-123");
        assert_eq!(result.num_turns(), 7);
    }

    #[test]
    fn parse_result_error_max_turns() {
        let json = r#"{
            "type": "result",
            "subtype": "error_max_turns",
            "session_id": "abc-123",
            "is_error": true,
            "num_turns": 60,
            "errors": ["Reached maximum turn limit"]
        }"#;
        let Message::Result(result) = parse(json) else {
            panic!("expected Result")
        };
        assert!(result.is_error());
        assert!(matches!(result, ResultMessage::ErrorMaxTurns(_)));
        assert_eq!(result.result_text(), None);
        assert!(result.describe_failure().contains("60"));
    }

    #[test]
    fn parse_assistant_tool_use() {
        let json = r#"{
            "type": "assistant",
            "session_id": "abc-123",
            "parent_tool_use_id": null,
            "message": {
                "id": "msg_abc",
                "role": "assistant",
                "content": [
                    {"type": "text", "text": "Cloning first."},
                    {"type": "tool_use", "id": "tu_1", "name": "mcp__repo__clone_repository", "input": {"repo_url": "https://x"}}
                ],
                "model": "claude",
                "stop_reason": "tool_use",
                "usage": {"input_tokens": 100, "output_tokens": 50}
            }
        }"#;
        let Message::Assistant(asst) = parse(json) else {
            panic!("expected Assistant")
        };
        assert_eq!(asst.message.content.len(), 2);
    }

    #[test]
    fn parse_user_tool_result() {
        let json = r#"{
            "type": "user",
            "session_id": "abc-123",
            "parent_tool_use_id": null,
            "message": {
                "role": "user",
                "content": [
                    {"type": "tool_result", "tool_use_id": "tu_1", "is_error": true, "content": "boom"}
                ]
            }
        }"#;
        let Message::User(user) = parse(json) else {
            panic!("expected User")
        };
        assert_eq!(user.message.content.len(), 1);
    }

    #[test]
    fn stream_event_text_delta_is_classified() {
        let json = r#"{
            "type": "stream_event",
            "session_id": "abc-123",
            "parent_tool_use_id": null,
            "event": {"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": "Hel"}}
        }"#;
        let Message::StreamEvent(ev) = parse(json) else {
            panic!("expected StreamEvent")
        };
        assert_eq!(ev.classify(), PartialEvent::TextDelta("Hel"));
    }

    #[test]
    fn stream_event_structure_is_ignored() {
        let json = r#"{
            "type": "stream_event",
            "session_id": "abc-123",
            "event": {"type": "message_start", "message": {}}
        }"#;
        let Message::StreamEvent(ev) = parse(json) else {
            panic!("expected StreamEvent")
        };
        assert_eq!(ev.classify(), PartialEvent::Ignored);
    }

    #[test]
    fn stream_event_unknown_delta_is_reported() {
        let json = r#"{
            "type": "stream_event",
            "session_id": "abc-123",
            "event": {"type": "content_block_delta", "delta": {"type": "hologram_delta"}}
        }"#;
        let Message::StreamEvent(ev) = parse(json) else {
            panic!("expected StreamEvent")
        };
        assert_eq!(ev.classify(), PartialEvent::UnknownDelta("hologram_delta".into()));
    }
}

/// Drive canned stream-json transcripts through the real process reader.
#[cfg(all(test, unix))]
mod driver {
    use std::process::Command;

    use tempfile::NamedTempFile;

    use crate::agent::Notification;
    use crate::cli::drive;
    use crate::process::ClaudeProcess;
    use crate::ClaudeAgentError;

    fn replay(lines: &[&str]) -> (Result<String, ClaudeAgentError>, Vec<Notification>) {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), lines.join("\n")).unwrap();
        let mut cmd = Command::new("cat");
        cmd.arg(file.path());
        let mut process = ClaudeProcess::spawn_command(cmd).unwrap();

        let mut seen = Vec::new();
        let result = drive(&mut process, &mut |n: Notification| seen.push(n));
        (result, seen)
    }

    const TOOL_USE: &str = r#"{"type":"assistant","session_id":"s","parent_tool_use_id":null,"message":{"role":"assistant","content":[{"type":"tool_use","id":"t1","name":"mcp__repo__list_files","input":{}}]}}"#;
    const TOOL_RESULT: &str = r#"{"type":"user","session_id":"s","parent_tool_use_id":null,"message":{"role":"user","content":[{"type":"tool_result","tool_use_id":"t1"}]}}"#;
    const DELTA_A: &str = r#"{"type":"stream_event","session_id":"s","event":{"type":"content_block_delta","delta":{"type":"text_delta","text":"Hello "}}}"#;
    const DELTA_B: &str = r#"{"type":"stream_event","session_id":"s","event":{"type":"content_block_delta","delta":{"type":"text_delta","text":"world"}}}"#;
    const SUCCESS: &str = r#"{"type":"result","subtype":"success","session_id":"s","result":"Hello world","is_error":false,"num_turns":2}"#;

    #[test]
    fn notifications_arrive_in_order() {
        let (result, seen) = replay(&[
            r#"{"type":"system","subtype":"init","session_id":"s","model":"m"}"#,
            TOOL_USE,
            TOOL_RESULT,
            r#"{"type":"rate_limit_event","session_id":"s"}"#,
            DELTA_A,
            DELTA_B,
            SUCCESS,
        ]);
        assert_eq!(result.unwrap(), "Hello world");
        assert_eq!(
            seen,
            vec![
                Notification::ToolStarted {
                    name: "mcp__repo__list_files".into()
                },
                Notification::ToolFinished { is_error: false },
                Notification::Text("Hello ".into()),
                Notification::Text("world".into()),
            ]
        );
    }

    #[test]
    fn error_result_fails_the_run() {
        let (result, _) = replay(&[
            DELTA_A,
            r#"{"type":"result","subtype":"error_during_execution","session_id":"s","errors":["model unavailable"]}"#,
        ]);
        let err = result.unwrap_err();
        assert!(matches!(err, ClaudeAgentError::Failed(_)));
        assert_eq!(err.to_string(), "model unavailable");
    }

    #[test]
    fn eof_without_result_is_an_error() {
        let (result, seen) = replay(&[DELTA_A]);
        assert!(matches!(result.unwrap_err(), ClaudeAgentError::Process(_)));
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn garbage_line_is_a_parse_error() {
        let (result, _) = replay(&["this is not json"]);
        assert!(matches!(result.unwrap_err(), ClaudeAgentError::Parse { .. }));
    }
}
