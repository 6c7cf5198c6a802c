use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use crate::{
    dto::events::{EVENT_HANDSHAKE, Handshake, ServerEvent},
    state::SharedState,
};

/// Subscribe to the team change event stream.
pub fn subscribe(state: &SharedState) -> broadcast::Receiver<ServerEvent> {
    state.events_hub().subscribe()
}

/// Per-connection handshake event acknowledging the subscription.
///
/// A display session treats receiving this event as the signal that the push
/// channel is live.
pub async fn handshake_event(state: &SharedState) -> serde_json::Result<ServerEvent> {
    ServerEvent::json(
        Some(EVENT_HANDSHAKE.to_string()),
        &Handshake {
            stream: "teams".to_string(),
            degraded: state.is_degraded().await,
        },
    )
}

/// Convert a broadcast receiver into an SSE response, delivering `handshake`
/// first, then forwarding broadcast events until the client disconnects.
pub fn to_sse_stream(
    handshake: ServerEvent,
    receiver: broadcast::Receiver<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // when the client disconnects axum drops this stream, which closes the
    // bridge and stops the forwarder
    let stream = ReceiverStream::new(forward_events(handshake, receiver))
        .map(|payload| Ok::<_, Infallible>(to_axum_event(payload)));

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Bridge one subscription into a bounded per-client channel, handshake
/// first.
///
/// A subscriber that falls behind the broadcast buffer has lost events it
/// can never get back, so the stream ends instead of resuming with a gap.
/// The client sees its channel close, degrades to snapshot polling, and the
/// next snapshot restores a consistent view.
fn forward_events(
    handshake: ServerEvent,
    mut receiver: broadcast::Receiver<ServerEvent>,
) -> mpsc::Receiver<ServerEvent> {
    let (tx, rx) = mpsc::channel::<ServerEvent>(8);

    tokio::spawn(async move {
        if tx.send(handshake).await.is_err() {
            return;
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            if tx.send(payload).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(missed)) => {
                            warn!(missed, "SSE subscriber lagged; ending its stream");
                            break;
                        }
                    }
                }
            }
        }

        info!("SSE subscriber disconnected");
    });

    rx
}

fn to_axum_event(payload: ServerEvent) -> Event {
    let mut event = Event::default().data(payload.data);
    if let Some(name) = payload.event {
        event = event.event(name);
    }
    event
}
