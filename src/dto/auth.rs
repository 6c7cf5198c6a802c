use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Payload submitted to the login endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Shared admin secret.
    pub password: String,
}

/// Authentication status returned by login and session-check endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthStatusResponse {
    /// Whether the caller holds a valid admin session.
    pub authenticated: bool,
}
