use std::sync::Arc;
use std::time::SystemTime;

use futures::future::BoxFuture;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dao::models::{ScoreChangeEntity, TeamEntity};
use crate::dao::storage::StorageResult;
use crate::dao::team_store::TeamStore;
use crate::sync::model::TeamStatus;

/// Volatile storage backend keeping everything in process memory.
///
/// Installed when no database is configured, and used by service tests.
/// Insertion order is preserved underneath the canonical sort, so rows tying
/// on both score and name rank in creation order.
#[derive(Clone, Default)]
pub struct MemoryTeamStore {
    inner: Arc<RwLock<MemoryInner>>,
}

#[derive(Default)]
struct MemoryInner {
    teams: IndexMap<Uuid, TeamEntity>,
    score_changes: Vec<ScoreChangeEntity>,
}

impl MemoryTeamStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_canonical(teams: &mut [TeamEntity]) {
    teams.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
}

impl TeamStore for MemoryTeamStore {
    fn list_teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let guard = inner.read().await;
            let mut teams: Vec<TeamEntity> = guard.teams.values().cloned().collect();
            sort_canonical(&mut teams);
            Ok(teams)
        })
    }

    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let guard = inner.read().await;
            Ok(guard.teams.get(&id).cloned())
        })
    }

    fn insert_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut guard = inner.write().await;
            guard.teams.insert(team.id, team);
            Ok(())
        })
    }

    fn insert_teams(&self, teams: Vec<TeamEntity>) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut guard = inner.write().await;
            for team in teams {
                guard.teams.insert(team.id, team);
            }
            Ok(())
        })
    }

    fn update_score(
        &self,
        id: Uuid,
        new_score: i64,
    ) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut guard = inner.write().await;
            match guard.teams.get_mut(&id) {
                Some(team) => {
                    let now = SystemTime::now();
                    team.score = new_score;
                    team.updated_at = now;
                    team.last_score_update = Some(now);
                    Ok(Some(team.clone()))
                }
                None => Ok(None),
            }
        })
    }

    fn update_status(
        &self,
        id: Uuid,
        status: TeamStatus,
    ) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut guard = inner.write().await;
            match guard.teams.get_mut(&id) {
                Some(team) => {
                    team.status = status;
                    team.updated_at = SystemTime::now();
                    Ok(Some(team.clone()))
                }
                None => Ok(None),
            }
        })
    }

    fn delete_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut guard = inner.write().await;
            Ok(guard.teams.shift_remove(&id).is_some())
        })
    }

    fn record_score_change(
        &self,
        change: ScoreChangeEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut guard = inner.write().await;
            guard.score_changes.push(change);
            Ok(())
        })
    }

    fn list_score_changes(
        &self,
        team_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<ScoreChangeEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let guard = inner.read().await;
            Ok(guard
                .score_changes
                .iter()
                .filter(|change| change.team_id == team_id)
                .cloned()
                .collect())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str, score: i64) -> TeamEntity {
        let mut team = TeamEntity::new(name.to_string());
        team.score = score;
        team
    }

    #[tokio::test]
    async fn list_orders_by_score_descending_then_name() {
        let store = MemoryTeamStore::new();
        store.insert_team(named("Beta", 10)).await.unwrap();
        store.insert_team(named("Gamma", 25)).await.unwrap();
        store.insert_team(named("Alpha", 10)).await.unwrap();

        let teams = store.list_teams().await.unwrap();
        let names: Vec<&str> = teams.iter().map(|team| team.name.as_str()).collect();
        assert_eq!(names, vec!["Gamma", "Alpha", "Beta"]);
    }

    #[tokio::test]
    async fn full_ties_rank_in_creation_order() {
        let store = MemoryTeamStore::new();
        let first = named("Twin", 5);
        let second = named("Twin", 5);
        store.insert_team(first.clone()).await.unwrap();
        store.insert_team(second.clone()).await.unwrap();

        let teams = store.list_teams().await.unwrap();
        assert_eq!(teams[0].id, first.id);
        assert_eq!(teams[1].id, second.id);
    }

    #[tokio::test]
    async fn update_score_stamps_timestamps_and_returns_the_row() {
        let store = MemoryTeamStore::new();
        let team = named("Robots", 0);
        store.insert_team(team.clone()).await.unwrap();

        let updated = store.update_score(team.id, 42).await.unwrap().unwrap();
        assert_eq!(updated.score, 42);
        assert!(updated.last_score_update.is_some());
        assert!(updated.updated_at >= team.updated_at);
    }

    #[tokio::test]
    async fn updates_on_unknown_ids_return_none() {
        let store = MemoryTeamStore::new();
        assert!(store.update_score(Uuid::new_v4(), 1).await.unwrap().is_none());
        assert!(
            store
                .update_status(Uuid::new_v4(), TeamStatus::Inactive)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn update_status_leaves_score_untouched() {
        let store = MemoryTeamStore::new();
        let team = named("Steady", 7);
        store.insert_team(team.clone()).await.unwrap();

        let updated = store
            .update_status(team.id, TeamStatus::Disqualified)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, TeamStatus::Disqualified);
        assert_eq!(updated.score, 7);
        assert!(updated.last_score_update.is_none());
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_was_removed() {
        let store = MemoryTeamStore::new();
        let team = named("Doomed", 0);
        store.insert_team(team.clone()).await.unwrap();

        assert!(store.delete_team(team.id).await.unwrap());
        assert!(!store.delete_team(team.id).await.unwrap());
        assert!(store.list_teams().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bulk_insert_adds_every_row() {
        let store = MemoryTeamStore::new();
        store
            .insert_teams(vec![named("One", 0), named("Two", 0), named("Three", 0)])
            .await
            .unwrap();
        assert_eq!(store.list_teams().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn score_changes_accumulate_per_team() {
        let store = MemoryTeamStore::new();
        let team = named("Audited", 0);
        let other = named("Quiet", 0);
        store.insert_team(team.clone()).await.unwrap();
        store.insert_team(other.clone()).await.unwrap();

        for (old_score, new_score) in [(0, 5), (5, 12)] {
            store
                .record_score_change(ScoreChangeEntity {
                    id: Uuid::new_v4(),
                    team_id: team.id,
                    old_score,
                    new_score,
                    changed_by: "admin".to_string(),
                    reason: None,
                    changed_at: SystemTime::now(),
                })
                .await
                .unwrap();
        }

        let changes = store.list_score_changes(team.id).await.unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[1].new_score, 12);
        assert!(store.list_score_changes(other.id).await.unwrap().is_empty());
    }
}
