//! Keeps the storage backend connected, flipping the shared degraded flag
//! while it is unreachable.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{storage::StorageError, team_store::TeamStore},
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_secs(1);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Result of one bounded reconnect sequence after a failed health check.
#[derive(Debug, PartialEq, Eq)]
enum ReconnectOutcome {
    /// The backend answers again; supervision continues with this handle.
    Recovered,
    /// Every attempt failed; the handle is abandoned and a fresh connection
    /// is made from scratch.
    GaveUp,
}

/// Connect to the storage backend and keep the shared state out of degraded
/// mode for as long as the backend stays healthy.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn TeamStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                info!("storage connection established; leaving degraded mode");
                state.set_team_store(store.clone()).await;
                delay = INITIAL_DELAY;
                supervise(&state, &store).await;
            }
            Err(err) => {
                warn!(error = %err, "storage connection attempt failed");
            }
        }

        sleep(delay).await;
        delay = (delay * 2).min(MAX_DELAY);
    }
}

/// Poll the store's health until a failure survives the bounded reconnect
/// sequence. Returns with the state degraded; the caller reconnects from
/// scratch.
async fn supervise(state: &SharedState, store: &Arc<dyn TeamStore>) {
    loop {
        match store.health_check().await {
            Ok(()) => {
                if state.is_degraded().await {
                    info!("storage healthy again; leaving degraded mode");
                    state.update_degraded(false).await;
                }
            }
            Err(err) => {
                warn!(error = %err, "storage health check failed");
                match reconnect_with_backoff(state, store.as_ref()).await {
                    ReconnectOutcome::Recovered => state.update_degraded(false).await,
                    ReconnectOutcome::GaveUp => {
                        warn!("exhausted storage reconnect attempts; staying in degraded mode");
                        return;
                    }
                }
            }
        }

        sleep(HEALTH_POLL_INTERVAL).await;
    }
}

/// Try to reconnect the existing handle up to [`MAX_RECONNECT_ATTEMPTS`]
/// times with doubling delays. The first failed attempt flips the degraded
/// flag on; clearing it on recovery is the caller's job.
async fn reconnect_with_backoff(state: &SharedState, store: &dyn TeamStore) -> ReconnectOutcome {
    let mut delay = INITIAL_DELAY;

    for attempt in 1..=MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(attempt, "storage reconnection succeeded");
                return ReconnectOutcome::Recovered;
            }
            Err(err) => {
                if attempt == 1 {
                    warn!(
                        attempt, error = %err,
                        "storage reconnect failed; entering degraded mode"
                    );
                    state.update_degraded(true).await;
                } else {
                    warn!(attempt, error = %err, "storage reconnect attempt failed");
                }
                if attempt < MAX_RECONNECT_ATTEMPTS {
                    sleep(delay).await;
                    delay = (delay * 2).min(MAX_DELAY);
                }
            }
        }
    }

    ReconnectOutcome::GaveUp
}
