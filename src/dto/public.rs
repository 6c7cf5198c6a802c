use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::sync::model::TeamRecord;

/// Response payload listing every team in canonical leaderboard order.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TeamsResponse {
    /// Ranked teams, score descending then name ascending.
    pub teams: Vec<TeamRecord>,
}
