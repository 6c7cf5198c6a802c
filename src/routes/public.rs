use axum::{
    Json, Router,
    extract::State,
    http::{HeaderName, header},
    response::IntoResponse,
    routing::get,
};

use crate::{dto::public::TeamsResponse, error::AppError, services::public_service, state::SharedState};

/// Public read-only endpoints exposing the current leaderboard.
pub fn router() -> Router<SharedState> {
    Router::new().route("/api/teams", get(get_teams))
}

#[utoipa::path(
    get,
    path = "/api/teams",
    tag = "public",
    responses((status = 200, description = "All teams in canonical order", body = TeamsResponse))
)]
/// Return the full team list sorted by score descending, then name.
///
/// Responses carry no-store cache directives so intermediaries never serve a
/// stale board.
pub async fn get_teams(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, AppError> {
    let payload = public_service::get_teams(&state).await?;
    Ok((no_store_headers(), Json(payload)))
}

/// Cache directives disabling both browser and CDN caching.
pub fn no_store_headers() -> [(HeaderName, &'static str); 2] {
    [
        (header::CACHE_CONTROL, "no-store, must-revalidate"),
        (HeaderName::from_static("cdn-cache-control"), "no-store"),
    ]
}
