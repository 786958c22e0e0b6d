//! Server-Sent Events (SSE) streaming for real-time UI updates.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use chrono::{DateTime, Utc};
use futures_core::Stream;
use serde::Serialize;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::state::{AppEvent, SharedState};

/// Wire form of an event: the event fields plus the time it was sent.
#[derive(Serialize)]
struct Envelope<'a> {
    at: DateTime<Utc>,
    #[serde(flatten)]
    event: &'a AppEvent,
}

pub fn encode_event(event: &AppEvent) -> Option<String> {
    serde_json::to_string(&Envelope { at: Utc::now(), event }).ok()
}

/// SSE endpoint. Clients subscribe here for real-time updates.
pub async fn sse_handler(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe();
    let stream = BroadcastStream::new(rx)
        .filter_map(|result| {
            result.ok().and_then(|event| {
                encode_event(&event).map(|data| Ok(Event::default().data(data)))
            })
        });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}
