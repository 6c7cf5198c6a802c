use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{delete, post, put},
};
use uuid::Uuid;

use crate::{
    dto::admin::{
        BulkImportRequest, BulkImportResponse, CreateTeamRequest, UpdateScoreRequest,
        UpdateStatusRequest,
    },
    error::AppError,
    services::{admin_service, auth_service},
    state::SharedState,
    sync::model::TeamRecord,
};

/// Admin-only team management endpoints, all behind the session gate.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/api/admin/teams", post(create_team))
        .route("/api/admin/teams/bulk", post(bulk_import))
        .route("/api/admin/teams/{id}", delete(delete_team))
        .route("/api/admin/teams/{id}/score", put(update_score))
        .route("/api/admin/teams/{id}/status", put(update_status))
        .route_layer(middleware::from_fn_with_state(state, require_admin_session))
}

#[utoipa::path(
    post,
    path = "/api/admin/teams",
    tag = "admin",
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created with score 0 and active status", body = TeamRecord),
        (status = 400, description = "Empty team name"),
        (status = 401, description = "Missing or invalid session")
    )
)]
/// Create a single team.
pub async fn create_team(
    State(state): State<SharedState>,
    Json(payload): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<TeamRecord>), AppError> {
    let record = admin_service::create_team(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/teams/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Identifier of the team to delete")),
    responses(
        (status = 204, description = "Team deleted"),
        (status = 404, description = "Unknown team id"),
        (status = 401, description = "Missing or invalid session")
    )
)]
/// Delete a team by its identifier.
pub async fn delete_team(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    admin_service::delete_team(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/admin/teams/{id}/score",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Identifier of the team to update")),
    request_body = UpdateScoreRequest,
    responses(
        (status = 200, description = "Score replaced and audit row written", body = TeamRecord),
        (status = 404, description = "Unknown team id"),
        (status = 401, description = "Missing or invalid session")
    )
)]
/// Replace a team's score, writing a score-history audit row.
pub async fn update_score(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateScoreRequest>,
) -> Result<Json<TeamRecord>, AppError> {
    let record = admin_service::update_score(&state, id, payload).await?;
    Ok(Json(record))
}

#[utoipa::path(
    put,
    path = "/api/admin/teams/{id}/status",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Identifier of the team to update")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status replaced", body = TeamRecord),
        (status = 404, description = "Unknown team id"),
        (status = 401, description = "Missing or invalid session")
    )
)]
/// Replace a team's lifecycle status.
pub async fn update_status(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<TeamRecord>, AppError> {
    let record = admin_service::update_status(&state, id, payload).await?;
    Ok(Json(record))
}

#[utoipa::path(
    post,
    path = "/api/admin/teams/bulk",
    tag = "admin",
    request_body = BulkImportRequest,
    responses(
        (status = 200, description = "Teams created, one per non-blank line", body = BulkImportResponse),
        (status = 400, description = "No usable team name in the input"),
        (status = 401, description = "Missing or invalid session")
    )
)]
/// Import several teams at once from a newline-delimited list.
pub async fn bulk_import(
    State(state): State<SharedState>,
    Json(payload): Json<BulkImportRequest>,
) -> Result<Json<BulkImportResponse>, AppError> {
    let response = admin_service::bulk_import(&state, payload).await?;
    Ok(Json(response))
}

/// Reject callers without a valid session cookie before any handler or
/// storage access runs.
async fn require_admin_session(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if auth_service::is_authorized(&state, req.headers()) {
        Ok(next.run(req).await)
    } else {
        Err(AppError::Unauthorized(
            "missing or invalid admin session".into(),
        ))
    }
}
