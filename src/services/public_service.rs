//! Service helpers that expose the read-only public leaderboard projection.

use crate::{dto::public::TeamsResponse, error::ServiceError, state::SharedState};

/// Return every team in canonical leaderboard order.
///
/// The store owns the sort, so this is a straight projection of its rows
/// into wire records.
pub async fn get_teams(state: &SharedState) -> Result<TeamsResponse, ServiceError> {
    let store = state.require_team_store().await?;
    let teams = store
        .list_teams()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(TeamsResponse { teams })
}
