//! Bridge between the blocking, callback-driven agent and the async SSE
//! response.
//!
//! ```text
//! worker thread                      tokio runtime
//! ─────────────                      ─────────────
//! run_agent ── EventSink ──► unbounded queue ──► RunHandle::pump ──► frame channel ──► Sse body
//!     │                                               ▲
//!     └──────────── JoinHandle (is_finished) ─────────┘
//! ```

pub mod handler;
pub mod pump;
pub mod runner;
pub mod sse;

pub use handler::{display_tool_name, EventSink};
pub use pump::{RunHandle, BATCH_SIZE, POLL_INTERVAL};
pub use runner::{run_agent, start_run, PoolExhausted, RunSpec, WorkerPool};
