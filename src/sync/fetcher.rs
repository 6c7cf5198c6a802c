use std::error::Error;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::sync::model::TeamRecord;

/// Error raised by a snapshot fetch.
///
/// A failed fetch is never fatal to a display session: the controller keeps
/// the previous view and retries on the next poll tick.
#[derive(Debug, Error)]
#[error("snapshot fetch failed: {message}")]
pub struct FetchError {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl FetchError {
    /// Construct a fetch error from a plain message.
    pub fn new(message: impl Into<String>) -> Self {
        FetchError {
            message: message.into(),
            source: None,
        }
    }

    /// Construct a fetch error wrapping an underlying transport failure.
    pub fn with_source(message: impl Into<String>, source: impl Error + Send + Sync + 'static) -> Self {
        FetchError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Source of full leaderboard snapshots.
///
/// Implementations must return teams in canonical order (score descending,
/// then name ascending); the view model re-applies the sort on ingest.
pub trait SnapshotFetcher: Send + Sync {
    /// Fetch every team currently on the board.
    fn fetch(&self) -> BoxFuture<'static, Result<Vec<TeamRecord>, FetchError>>;
}
