//! Server-Sent Events streams
//!
//! `/events` carries player events for anything rendering session state;
//! `/commands` carries surface commands for the render surface that owns the
//! actual media elements.

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

use crate::api::AppState;

/// GET /events - player event stream
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("New SSE event client connected");

    let rx = state.players.events.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => Some(Ok(Event::default().event(event.type_str()).data(json))),
                Err(e) => {
                    warn!("Failed to serialize player event: {}", e);
                    None
                }
            },
            Err(e) => {
                // Lagged or closed receiver
                warn!("SSE event stream error: {:?}", e);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// GET /commands - surface command stream
pub async fn command_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("Render surface connected to command stream");

    let rx = state.players.surface.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(command) => match serde_json::to_string(&command) {
                Ok(json) => Some(Ok(Event::default().event("SurfaceCommand").data(json))),
                Err(e) => {
                    warn!("Failed to serialize surface command: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!("SSE command stream error: {:?}", e);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
