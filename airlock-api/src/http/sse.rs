// Availability event stream over Server-Sent Events

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use super::AppState;

/// Stream availability changes to the client as they happen.
/// Subscribers that lag behind simply miss the dropped events.
pub async fn sse(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.events.subscribe();

    let stream = BroadcastStream::new(receiver).filter_map(|result| {
        let event = result.ok()?;
        Event::default().json_data(&event).ok().map(Ok)
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
