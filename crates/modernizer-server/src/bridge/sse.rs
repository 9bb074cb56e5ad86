use std::convert::Infallible;

use axum::http::{HeaderName, HeaderValue};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use modernizer_core::StreamEvent;
use tokio_stream::StreamExt as _;

use crate::bridge::pump::RunHandle;

/// One SSE frame: `data: {"event": ..., "data": ...}\n\n`.
pub fn frame(event: &StreamEvent) -> Event {
    Event::default().data(event.to_json())
}

/// Stream a run to the client.
///
/// No keep-alive comments are sent, so every frame on the wire is a `data:` line.
pub fn event_stream(handle: RunHandle) -> Response {
    let frames = handle
        .into_stream()
        .map(|event| Ok::<Event, Infallible>(frame(&event)));

    let mut response = Sse::new(frames).into_response();
    response.headers_mut().insert(
        HeaderName::from_static("x-accel-buffering"),
        HeaderValue::from_static("no"),
    );
    response
}
