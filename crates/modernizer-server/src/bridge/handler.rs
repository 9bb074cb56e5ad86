use claude_agent::Notification;
use modernizer_core::StreamEvent;
use tokio::sync::mpsc::UnboundedSender;

/// Producer side of a run's event queue, called from the worker thread.
///
/// Sending never blocks. Once the consumer is gone every send is a no-op.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: UnboundedSender<StreamEvent>,
}

impl EventSink {
    pub fn new(tx: UnboundedSender<StreamEvent>) -> Self {
        Self { tx }
    }

    pub fn send(&self, event: StreamEvent) {
        // A closed queue means the client left; the run carries on regardless.
        let _ = self.tx.send(event);
    }

    /// Translate one agent notification into at most one stream event.
    pub fn on_notification(&self, notification: Notification) {
        let event = match notification {
            Notification::Text(token) => StreamEvent::chunk(token),
            Notification::ToolStarted { name } => {
                StreamEvent::tool_use(format!("Using tool: {}", display_tool_name(&name)))
            }
            Notification::ToolFinished { is_error } => {
                StreamEvent::tool_result(if is_error { "Tool failed" } else { "Tool completed" })
            }
            Notification::Unrecognized(what) => {
                tracing::debug!(notification = %what, "ignoring unrecognized agent notification");
                return;
            }
        };
        self.send(event);
    }
}

/// `mcp__<server>__<tool>` → `<tool>`; other names pass through.
pub fn display_tool_name(name: &str) -> &str {
    name.strip_prefix("mcp__")
        .and_then(|rest| rest.split_once("__"))
        .map(|(_, tool)| tool)
        .filter(|tool| !tool.is_empty())
        .unwrap_or(name)
}
