use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{error::AppError, services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/api/events",
    tag = "public",
    responses((status = 200, description = "Team change event stream", content_type = "text/event-stream", body = String))
)]
/// Stream committed team mutations to a display session.
///
/// The first event is always a `handshake` acknowledging the subscription;
/// afterwards one event is delivered per committed mutation.
pub async fn events_stream(
    State(state): State<SharedState>,
) -> Result<Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>>, AppError> {
    let receiver = sse_service::subscribe(&state);
    let handshake = sse_service::handshake_event(&state)
        .await
        .map_err(|err| AppError::Internal(format!("failed to build handshake event: {err}")))?;
    info!("new SSE subscription");
    Ok(sse_service::to_sse_stream(handshake, receiver))
}

/// Configure the push-feed endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/api/events", get(events_stream))
}
