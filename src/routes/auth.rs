use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, header},
    response::IntoResponse,
    routing::{get, post},
};

use crate::{
    dto::auth::{AuthStatusResponse, LoginRequest},
    error::AppError,
    routes::public::no_store_headers,
    services::auth_service,
    state::SharedState,
};

/// Login, logout and session-check endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/check", get(check))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session cookie issued", body = AuthStatusResponse),
        (status = 401, description = "Wrong password")
    )
)]
/// Exchange the shared admin secret for a signed session cookie.
pub async fn login(
    State(state): State<SharedState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let token = auth_service::login(&state, &payload.password)?;
    let headers = [(
        header::SET_COOKIE,
        auth_service::session_cookie_header(&token),
    )];
    Ok((headers, Json(AuthStatusResponse { authenticated: true })))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses((status = 200, description = "Session cookie cleared", body = AuthStatusResponse))
)]
/// Clear the admin session cookie.
pub async fn logout() -> impl IntoResponse {
    let headers = [(
        header::SET_COOKIE,
        auth_service::clear_session_cookie_header(),
    )];
    (
        headers,
        Json(AuthStatusResponse {
            authenticated: false,
        }),
    )
}

#[utoipa::path(
    get,
    path = "/api/auth/check",
    tag = "auth",
    responses((status = 200, description = "Whether the caller holds a valid session", body = AuthStatusResponse))
)]
/// Report whether the request carries a valid admin session.
pub async fn check(State(state): State<SharedState>, headers: HeaderMap) -> impl IntoResponse {
    let authenticated = auth_service::is_authorized(&state, &headers);
    (
        no_store_headers(),
        Json(AuthStatusResponse { authenticated }),
    )
}
