//! Wire shapes of the push-update feed shared by the server broadcaster and
//! the display client's channel parser.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::sync::model::TeamRecord;

/// Event name acknowledging a fresh subscription.
pub const EVENT_HANDSHAKE: &str = "handshake";
/// Event name for a committed team insert.
pub const EVENT_TEAM_CREATED: &str = "team.created";
/// Event name for a committed team update (score, status or name).
pub const EVENT_TEAM_UPDATED: &str = "team.updated";
/// Event name for a committed team delete.
pub const EVENT_TEAM_DELETED: &str = "team.deleted";

#[derive(Clone, Debug)]
/// Dispatched payload carried across the SSE hub.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Identifier of the stream (`teams`).
    pub stream: String,
    /// Whether the backend is running without a storage backend connection.
    pub degraded: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Payload of `team.created` and `team.updated` events.
pub struct TeamEventPayload {
    /// Full row of the team after the mutation.
    pub team: TeamRecord,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Payload of `team.deleted` events.
pub struct TeamDeletedPayload {
    /// Identifier of the removed team.
    pub team_id: Uuid,
}
