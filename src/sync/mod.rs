//! Leaderboard sync engine: keeps a display session's ranked team list
//! consistent with server state.
//!
//! A [`SyncController`] owns the view model and drives it from three inputs:
//! an initial/polled snapshot ([`SnapshotFetcher`]), a push stream of change
//! events ([`ChangeChannel`]) and a connection deadline. When the push
//! channel fails or is never acknowledged, the session degrades to
//! fixed-interval polling ([`FallbackPoller`]) for the rest of its lifetime.

/// Push subscription to the team mutation stream.
pub mod channel;
/// Session state machine orchestrating the collaborators.
pub mod controller;
/// Full-snapshot source.
pub mod fetcher;
/// HTTP/SSE implementations of the collaborators.
#[cfg(feature = "display-client")]
pub mod http;
/// Record and event types shared across the engine.
pub mod model;
/// Degraded-mode tick source.
pub mod poller;
/// Ranked list with the canonical-order invariant.
pub mod view_model;

pub use channel::{ChangeChannel, ChannelMessage, ChannelStatus};
pub use controller::{CONNECT_DEADLINE, SyncController, SyncHandle};
pub use fetcher::{FetchError, SnapshotFetcher};
#[cfg(feature = "display-client")]
pub use http::{HttpSnapshotFetcher, SseChangeChannel};
pub use model::{ChangeEvent, ConnectionState, TeamRecord, TeamStatus};
pub use poller::{FallbackPoller, POLL_INTERVAL, PollTick};
pub use view_model::{ViewModel, sort_canonical};
