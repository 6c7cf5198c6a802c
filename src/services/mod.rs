/// Admin service for team management operations.
pub mod admin_service;
/// Admin session minting and verification.
pub mod auth_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Public service for read-only leaderboard information.
pub mod public_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Storage connection supervisor.
pub mod storage_supervisor;
