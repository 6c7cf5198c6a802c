//! DTO definitions used by the admin REST API and documentation layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::validation::validate_team_name;
use crate::sync::model::{TeamRecord, TeamStatus};

/// Payload creating a single team. The team starts with score 0 and active
/// status.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTeamRequest {
    /// Display name of the new team.
    #[validate(custom(function = validate_team_name))]
    pub name: String,
}

/// Payload replacing a team's score.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateScoreRequest {
    /// New absolute score. May be negative.
    pub score: i64,
    /// Optional justification recorded in the score history.
    pub reason: Option<String>,
}

/// Payload replacing a team's lifecycle status.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// New status; rejected at deserialization when outside the enum.
    pub status: TeamStatus,
}

/// Payload importing several teams at once, one name per line.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkImportRequest {
    /// Newline-delimited team names. Lines are trimmed and blank lines
    /// discarded.
    pub teams_list: String,
}

/// Result of a bulk import.
#[derive(Debug, Serialize, ToSchema)]
pub struct BulkImportResponse {
    /// Number of teams created.
    pub created: usize,
    /// The created rows in canonical order of the request lines.
    pub teams: Vec<TeamRecord>,
}
