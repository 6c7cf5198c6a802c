//! Business logic powering the admin REST routes. These helpers coordinate
//! storage persistence, score-history auditing and change-event broadcasts.
//!
//! Every broadcast happens after the storage write succeeded, so the push
//! feed never announces a mutation the store did not commit. Mutation errors
//! are surfaced verbatim to the caller and never broadcast.

use std::time::SystemTime;

use tracing::warn;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        admin::{
            BulkImportRequest, BulkImportResponse, CreateTeamRequest, UpdateScoreRequest,
            UpdateStatusRequest,
        },
        validation::split_team_names,
    },
    dao::models::{ScoreChangeEntity, TeamEntity},
    error::ServiceError,
    services::sse_events,
    state::SharedState,
    sync::model::TeamRecord,
};

const CHANGED_BY_ADMIN: &str = "admin";

/// Create a single team with score 0 and active status.
pub async fn create_team(
    state: &SharedState,
    request: CreateTeamRequest,
) -> Result<TeamRecord, ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::InvalidInput(format!("validation failed: {err}")))?;

    let store = state.require_team_store().await?;
    let entity = TeamEntity::new(request.name.trim().to_string());
    store.insert_team(entity.clone()).await?;

    let record = TeamRecord::from(entity);
    sse_events::broadcast_team_created(state, record.clone());
    Ok(record)
}

/// Delete a team by id.
pub async fn delete_team(state: &SharedState, team_id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_team_store().await?;
    if !store.delete_team(team_id).await? {
        return Err(ServiceError::NotFound(format!("team {team_id}")));
    }

    sse_events::broadcast_team_deleted(state, team_id);
    Ok(())
}

/// Replace a team's score, recording an audit row with the old and new
/// values.
pub async fn update_score(
    state: &SharedState,
    team_id: Uuid,
    request: UpdateScoreRequest,
) -> Result<TeamRecord, ServiceError> {
    let store = state.require_team_store().await?;

    let old_score = store
        .find_team(team_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("team {team_id}")))?
        .score;

    let updated = store
        .update_score(team_id, request.score)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("team {team_id}")))?;

    // The score change itself is committed; a lost audit row is logged, not
    // surfaced as a failed mutation.
    let audit = ScoreChangeEntity {
        id: Uuid::new_v4(),
        team_id,
        old_score,
        new_score: updated.score,
        changed_by: CHANGED_BY_ADMIN.to_string(),
        reason: request.reason,
        changed_at: SystemTime::now(),
    };
    if let Err(err) = store.record_score_change(audit).await {
        warn!(%team_id, error = %err, "failed to record score change audit row");
    }

    let record = TeamRecord::from(updated);
    sse_events::broadcast_team_updated(state, record.clone());
    Ok(record)
}

/// Replace a team's lifecycle status.
pub async fn update_status(
    state: &SharedState,
    team_id: Uuid,
    request: UpdateStatusRequest,
) -> Result<TeamRecord, ServiceError> {
    let store = state.require_team_store().await?;
    let updated = store
        .update_status(team_id, request.status)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("team {team_id}")))?;

    let record = TeamRecord::from(updated);
    sse_events::broadcast_team_updated(state, record.clone());
    Ok(record)
}

/// Create one team per non-blank line of the request, all with score 0 and
/// active status. An input with no usable line is rejected with no effect.
pub async fn bulk_import(
    state: &SharedState,
    request: BulkImportRequest,
) -> Result<BulkImportResponse, ServiceError> {
    let names = split_team_names(&request.teams_list);
    if names.is_empty() {
        return Err(ServiceError::InvalidInput(
            "no team names provided; expected one name per line".into(),
        ));
    }

    let store = state.require_team_store().await?;
    let entities: Vec<TeamEntity> = names.into_iter().map(TeamEntity::new).collect();
    store.insert_teams(entities.clone()).await?;

    let teams: Vec<TeamRecord> = entities.into_iter().map(Into::into).collect();
    for team in &teams {
        sse_events::broadcast_team_created(state, team.clone());
    }

    Ok(BulkImportResponse {
        created: teams.len(),
        teams,
    })
}
