use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dto::events::{
        EVENT_TEAM_CREATED, EVENT_TEAM_DELETED, EVENT_TEAM_UPDATED, ServerEvent, TeamDeletedPayload,
        TeamEventPayload,
    },
    state::SharedState,
    sync::model::TeamRecord,
};

/// Broadcast that a team has been created. One event per created row, bulk
/// import included.
pub fn broadcast_team_created(state: &SharedState, team: TeamRecord) {
    send_event(state, EVENT_TEAM_CREATED, &TeamEventPayload { team });
}

/// Broadcast that a team has been updated (score, status or name).
pub fn broadcast_team_updated(state: &SharedState, team: TeamRecord) {
    send_event(state, EVENT_TEAM_UPDATED, &TeamEventPayload { team });
}

/// Broadcast that a team has been deleted.
pub fn broadcast_team_deleted(state: &SharedState, team_id: Uuid) {
    send_event(state, EVENT_TEAM_DELETED, &TeamDeletedPayload { team_id });
}

fn send_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.events_hub().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
    }
}
