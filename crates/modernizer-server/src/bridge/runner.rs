use std::sync::Arc;

use claude_agent::{AgentFactory, Notification, ToolSet};
use modernizer_core::repo::{AUTH_TYPE_ENV, CREDENTIAL_ENV};
use modernizer_core::{RunRequest, StreamEvent, SystemPrompt};
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};

use crate::bridge::handler::EventSink;
use crate::bridge::pump::RunHandle;

// ---------------------------------------------------------------------------
// WorkerPool
// ---------------------------------------------------------------------------

/// Every agent worker is busy.
#[derive(Debug)]
pub struct PoolExhausted {
    pub capacity: usize,
}

impl std::fmt::Display for PoolExhausted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "All {} analysis workers are busy; try again shortly",
            self.capacity
        )
    }
}

impl std::error::Error for PoolExhausted {}

/// Bounds the number of agent runs executing at once.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl WorkerPool {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    fn try_acquire(&self) -> Result<OwnedSemaphorePermit, PoolExhausted> {
        Arc::clone(&self.permits)
            .try_acquire_owned()
            .map_err(|_| PoolExhausted {
                capacity: self.capacity,
            })
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Everything the worker needs for one run. The tool environment holds the
/// credential, so this type has no `Debug` impl.
pub struct RunSpec {
    pub model_id: String,
    pub region: String,
    pub mode: SystemPrompt,
    pub prompt: String,
    pub tools: ToolSet,
}

impl RunSpec {
    pub fn new(request: &RunRequest, mode: SystemPrompt, region: &str, tools: &ToolSet) -> Self {
        let tools = tools.clone().with_env([
            (CREDENTIAL_ENV, request.credential.as_str()),
            (AUTH_TYPE_ENV, request.auth.as_str()),
        ]);
        Self {
            model_id: request.model_id.clone(),
            region: region.to_string(),
            mode,
            prompt: mode.user_prompt(request),
            tools,
        }
    }
}

/// Run the agent to completion on the current thread.
///
/// Returns the agent's final text, or the user-facing error message.
pub fn run_agent(
    factory: &dyn AgentFactory,
    spec: &RunSpec,
    sink: &EventSink,
) -> Result<String, String> {
    sink.send(StreamEvent::status("Initializing analysis agent..."));

    let mut agent = factory
        .connect(&spec.model_id, &spec.region)
        .map_err(|e| format!("Failed to initialize model: {e}"))?;

    sink.send(StreamEvent::status(spec.mode.started_status()));

    agent
        .invoke(
            spec.mode.instruction(),
            &spec.tools,
            &spec.prompt,
            &mut |n: Notification| sink.on_notification(n),
        )
        .map_err(|e| format!("Analysis failed: {e}"))
}

/// Reserve a worker and launch `spec` on the blocking pool.
///
/// Fails without side effects when no worker is free. The permit is held
/// by the worker until the agent returns, whether or not anyone is still
/// reading the events.
pub fn start_run(
    pool: &WorkerPool,
    factory: Arc<dyn AgentFactory>,
    spec: RunSpec,
) -> Result<RunHandle, PoolExhausted> {
    let permit = pool.try_acquire()?;
    let (tx, rx) = mpsc::unbounded_channel();
    let run_id = uuid::Uuid::new_v4();

    let task = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        let sink = EventSink::new(tx);
        let started = std::time::Instant::now();
        let outcome = run_agent(factory.as_ref(), &spec, &sink);
        match &outcome {
            Ok(_) => tracing::info!(
                %run_id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "agent run finished"
            ),
            Err(e) => tracing::warn!(%run_id, error = %e, "agent run failed"),
        }
        outcome
    });

    Ok(RunHandle::new(run_id, rx, task))
}
