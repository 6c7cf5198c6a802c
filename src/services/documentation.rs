use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the leaderboard backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::public::get_teams,
        crate::routes::sse::events_stream,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::check,
        crate::routes::admin::create_team,
        crate::routes::admin::delete_team,
        crate::routes::admin::update_score,
        crate::routes::admin::update_status,
        crate::routes::admin::bulk_import,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::public::TeamsResponse,
            crate::dto::auth::LoginRequest,
            crate::dto::auth::AuthStatusResponse,
            crate::dto::admin::CreateTeamRequest,
            crate::dto::admin::UpdateScoreRequest,
            crate::dto::admin::UpdateStatusRequest,
            crate::dto::admin::BulkImportRequest,
            crate::dto::admin::BulkImportResponse,
            crate::dto::events::Handshake,
            crate::dto::events::TeamEventPayload,
            crate::dto::events::TeamDeletedPayload,
            crate::sync::model::TeamRecord,
            crate::sync::model::TeamStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "public", description = "Unauthenticated leaderboard reads and the push feed"),
        (name = "auth", description = "Admin session management"),
        (name = "admin", description = "Team management behind the session gate"),
    )
)]
pub struct ApiDoc;
