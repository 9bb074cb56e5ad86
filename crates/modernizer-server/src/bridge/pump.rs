use std::time::Duration;

use modernizer_core::{EventKind, StreamEvent};
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver};
use tokio::task::{JoinError, JoinHandle};
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

/// Most events forwarded between two sleeps while the agent is running.
pub const BATCH_SIZE: usize = 20;
/// Pause between drains while the agent is running.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);
/// Frames buffered between the pump and the response body.
pub const FRAME_BUFFER: usize = 64;

/// Consumer side of one run: the event queue, the worker task, and the
/// chunk text seen so far.
pub struct RunHandle {
    run_id: Uuid,
    events: UnboundedReceiver<StreamEvent>,
    task: JoinHandle<Result<String, String>>,
    chunks: String,
    saw_chunk: bool,
}

impl RunHandle {
    pub(crate) fn new(
        run_id: Uuid,
        events: UnboundedReceiver<StreamEvent>,
        task: JoinHandle<Result<String, String>>,
    ) -> Self {
        Self {
            run_id,
            events,
            task,
            chunks: String::new(),
            saw_chunk: false,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Take up to `limit` queued events without waiting, or everything
    /// queued when `limit` is `None`. Chunk payloads are recorded.
    pub fn drain(&mut self, limit: Option<usize>) -> Vec<StreamEvent> {
        let mut batch = Vec::new();
        while limit.map_or(true, |max| batch.len() < max) {
            match self.events.try_recv() {
                Ok(event) => {
                    if event.event == EventKind::Chunk {
                        self.chunks.push_str(&event.data);
                        self.saw_chunk = true;
                    }
                    batch.push(event);
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        batch
    }

    /// The text a successful run reports: the streamed chunks if there were
    /// any, otherwise the agent's own result.
    fn final_text(&mut self, result: String) -> String {
        if self.saw_chunk {
            std::mem::take(&mut self.chunks)
        } else {
            result
        }
    }

    /// Forward every event of the run into `out`, then exactly one `done`
    /// or `error`.
    ///
    /// Returns early if `out` is closed; the worker is left to finish on
    /// its own.
    pub async fn pump(mut self, out: mpsc::Sender<StreamEvent>) {
        let mut forwarded = 0usize;

        while !self.task.is_finished() {
            for event in self.drain(Some(BATCH_SIZE)) {
                if out.send(event).await.is_err() {
                    tracing::info!(run_id = %self.run_id, forwarded, "client disconnected");
                    return;
                }
                forwarded += 1;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }

        for event in self.drain(None) {
            if out.send(event).await.is_err() {
                tracing::info!(run_id = %self.run_id, forwarded, "client disconnected");
                return;
            }
            forwarded += 1;
        }

        let terminal = match (&mut self.task).await {
            Ok(Ok(result)) => StreamEvent::done(self.final_text(result)),
            Ok(Err(message)) => StreamEvent::error(message),
            Err(join) => StreamEvent::error(format!("Analysis failed: {}", describe_join(join))),
        };
        tracing::info!(
            run_id = %self.run_id,
            events = forwarded,
            terminal = terminal.event.as_str(),
            "run stream complete"
        );
        let _ = out.send(terminal).await;
    }

    /// Run the pump on its own task and expose its output as a stream.
    pub fn into_stream(self) -> ReceiverStream<StreamEvent> {
        let (tx, rx) = mpsc::channel(FRAME_BUFFER);
        tokio::spawn(self.pump(tx));
        ReceiverStream::new(rx)
    }
}

fn describe_join(err: JoinError) -> String {
    if !err.is_panic() {
        return "worker was cancelled".to_string();
    }
    let payload = err.into_panic();
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("worker panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("worker panicked: {msg}")
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle_with(
        events: Vec<StreamEvent>,
        outcome: Result<String, String>,
    ) -> RunHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        for event in events {
            tx.send(event).unwrap();
        }
        drop(tx);
        let task = tokio::task::spawn_blocking(move || outcome);
        RunHandle::new(Uuid::new_v4(), rx, task)
    }

    async fn pumped(handle: RunHandle) -> Vec<StreamEvent> {
        let (tx, mut rx) = mpsc::channel(FRAME_BUFFER);
        handle.pump(tx).await;
        let mut out = Vec::new();
        while let Some(event) = rx.recv().await {
            out.push(event);
        }
        out
    }

    #[tokio::test]
    async fn drain_respects_limit_and_records_chunks() {
        let events = (0..25).map(|i| StreamEvent::chunk(i.to_string())).collect();
        let mut handle = handle_with(events, Ok(String::new()));
        assert_eq!(handle.drain(Some(BATCH_SIZE)).len(), BATCH_SIZE);
        assert_eq!(handle.drain(None).len(), 5);
        assert!(handle.drain(None).is_empty());
        assert!(handle.chunks.starts_with("012345678910"));
    }

    #[tokio::test]
    async fn done_carries_concatenated_chunks() {
        let handle = handle_with(
            vec![
                StreamEvent::status("starting"),
                StreamEvent::chunk("Hello "),
                StreamEvent::tool_use("Using tool: list_repository_files"),
                StreamEvent::chunk("world"),
            ],
            Ok("ignored result".into()),
        );
        let events = pumped(handle).await;
        assert_eq!(events.len(), 5);
        assert_eq!(events[4], StreamEvent::done("Hello world"));
    }

    #[tokio::test]
    async fn done_falls_back_to_result_without_chunks() {
        let handle = handle_with(
            vec![StreamEvent::status("starting")],
            Ok("the report".into()),
        );
        let events = pumped(handle).await;
        assert_eq!(events.last(), Some(&StreamEvent::done("the report")));
    }

    #[tokio::test]
    async fn error_result_is_the_only_terminal() {
        let handle = handle_with(
            vec![StreamEvent::chunk("partial")],
            Err("Analysis failed: boom".into()),
        );
        let events = pumped(handle).await;
        assert_eq!(
            events,
            vec![
                StreamEvent::chunk("partial"),
                StreamEvent::error("Analysis failed: boom"),
            ]
        );
    }

    #[tokio::test]
    async fn worker_panic_becomes_error_event() {
        let (_tx, rx) = mpsc::unbounded_channel::<StreamEvent>();
        let task = tokio::task::spawn_blocking(|| -> Result<String, String> {
            panic!("kaboom");
        });
        let events = pumped(RunHandle::new(Uuid::new_v4(), rx, task)).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, EventKind::Error);
        assert!(events[0].data.contains("kaboom"));
    }

    #[tokio::test]
    async fn closed_output_stops_the_pump() {
        let handle = handle_with(vec![StreamEvent::chunk("x")], Ok(String::new()));
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        // Must return rather than hang or panic.
        handle.pump(tx).await;
    }
}
