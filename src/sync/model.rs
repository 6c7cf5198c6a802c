use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle status of a team on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TeamStatus {
    /// Competing and ranked normally.
    Active,
    /// Temporarily out of the running (still listed).
    Inactive,
    /// Removed from competition by the organizers.
    Disqualified,
}

/// One team as displayed on the leaderboard and carried by change events.
///
/// This is the record shape shared by the public API, the push feed and the
/// sync engine. Equality is plain value equality, which is what snapshot
/// deduplication relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TeamRecord {
    /// Stable identifier for the team.
    pub id: Uuid,
    /// Display name chosen by the organizers. Duplicates are allowed.
    pub name: String,
    /// Current score. May be negative.
    pub score: i64,
    /// Lifecycle status of the team.
    pub status: TeamStatus,
    /// RFC 3339 timestamp of the last score change, if any.
    pub last_score_update: Option<String>,
}

/// One committed mutation of the team table, as delivered by the push
/// channel. Insert and update carry the full row, delete only the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// A new team was created.
    Insert(TeamRecord),
    /// An existing team changed (score, status or name).
    Update(TeamRecord),
    /// A team was removed.
    Delete(Uuid),
}

impl ChangeEvent {
    /// Id of the team this event concerns.
    pub fn team_id(&self) -> Uuid {
        match self {
            ChangeEvent::Insert(record) | ChangeEvent::Update(record) => record.id,
            ChangeEvent::Delete(id) => *id,
        }
    }
}

/// Data-path state exposed to the display layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Channel subscription in progress, nothing confirmed yet.
    Connecting,
    /// Push channel live, events flow as they are committed.
    Connected,
    /// Push channel unavailable, periodic snapshot polling instead.
    Polling,
    /// No data path (after teardown).
    Disconnected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Polling => "polling",
            ConnectionState::Disconnected => "disconnected",
        };
        f.write_str(label)
    }
}
