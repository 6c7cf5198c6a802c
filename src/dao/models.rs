use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sync::model::TeamStatus;

/// Representation of a team stored in persistence and shared across layers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamEntity {
    /// Stable identifier for the team.
    pub id: Uuid,
    /// Display name chosen by the organizers. Not unique.
    pub name: String,
    /// Current score. May be negative.
    pub score: i64,
    /// Lifecycle status of the team.
    pub status: TeamStatus,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
    /// Last time the team row changed in any way.
    pub updated_at: SystemTime,
    /// Last time the score specifically changed, if ever.
    pub last_score_update: Option<SystemTime>,
}

impl TeamEntity {
    /// Create a fresh team: zero score, active status, timestamps set to now.
    pub fn new(name: String) -> Self {
        let now = SystemTime::now();
        TeamEntity {
            id: Uuid::new_v4(),
            name,
            score: 0,
            status: TeamStatus::Active,
            created_at: now,
            updated_at: now,
            last_score_update: None,
        }
    }
}

/// Audit row recorded every time a team's score changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreChangeEntity {
    /// Primary key of the audit row.
    pub id: Uuid,
    /// Team whose score changed.
    pub team_id: Uuid,
    /// Score before the change.
    pub old_score: i64,
    /// Score after the change.
    pub new_score: i64,
    /// Who performed the change.
    pub changed_by: String,
    /// Optional free-form justification supplied with the change.
    pub reason: Option<String>,
    /// When the change happened.
    pub changed_at: SystemTime,
}
