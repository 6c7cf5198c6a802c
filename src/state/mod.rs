mod sse;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::config::AppConfig;
use crate::dao::team_store::TeamStore;
use crate::error::ServiceError;

pub use self::sse::SseHub;

/// Cheaply cloneable handle to the central application state.
pub type SharedState = Arc<AppState>;

/// Central application state: the installed storage backend, the SSE hub and
/// the degraded flag.
pub struct AppState {
    config: AppConfig,
    team_store: RwLock<Option<Arc<dyn TeamStore>>>,
    events: SseHub,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            team_store: RwLock::new(None),
            // sized so one large bulk import cannot lag a busy subscriber
            events: SseHub::new(128),
            degraded: degraded_tx,
        })
    }

    /// Runtime configuration loaded at startup.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current team store, if one is installed.
    pub async fn team_store(&self) -> Option<Arc<dyn TeamStore>> {
        let guard = self.team_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the team store or fail with a degraded-mode error.
    pub async fn require_team_store(&self) -> Result<Arc<dyn TeamStore>, ServiceError> {
        self.team_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a storage backend and leave degraded mode.
    pub async fn set_team_store(&self, store: Arc<dyn TeamStore>) {
        {
            let mut guard = self.team_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            let changed = *current != value;
            *current = value;
            changed
        });
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Broadcast hub carrying team change events to SSE subscribers.
    pub fn events_hub(&self) -> &SseHub {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::team_store::memory::MemoryTeamStore;

    fn test_config() -> AppConfig {
        AppConfig {
            admin_password: "secret".into(),
            session_secret: "signing-key".into(),
            port: 0,
            mongo_uri: None,
            mongo_db: None,
        }
    }

    #[tokio::test]
    async fn starts_degraded_until_a_store_is_installed() {
        let state = AppState::new(test_config());
        assert!(state.is_degraded().await);
        assert!(state.require_team_store().await.is_err());

        state.set_team_store(Arc::new(MemoryTeamStore::new())).await;
        assert!(!state.is_degraded().await);
        assert!(state.require_team_store().await.is_ok());
    }

    #[tokio::test]
    async fn degraded_watcher_sees_flag_changes_only() {
        let state = AppState::new(test_config());
        let mut watcher = state.degraded_watcher();
        assert!(*watcher.borrow_and_update());

        state.update_degraded(true).await;
        assert!(!watcher.has_changed().unwrap());

        state.set_team_store(Arc::new(MemoryTeamStore::new())).await;
        watcher.changed().await.unwrap();
        assert!(!*watcher.borrow());
    }
}
