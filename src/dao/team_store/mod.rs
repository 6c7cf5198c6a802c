pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::{ScoreChangeEntity, TeamEntity};
use crate::dao::storage::StorageResult;
use crate::sync::model::TeamStatus;

/// Abstraction over the persistence layer for teams and their score history.
///
/// `list_teams` returns rows in canonical leaderboard order (score
/// descending, then name ascending); each implementation owns that sort so
/// readers never have to. Update operations return the row as persisted, or
/// `None` when the id does not exist.
pub trait TeamStore: Send + Sync {
    fn list_teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>>;
    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>>;
    fn insert_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn insert_teams(&self, teams: Vec<TeamEntity>) -> BoxFuture<'static, StorageResult<()>>;
    fn update_score(
        &self,
        id: Uuid,
        new_score: i64,
    ) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>>;
    fn update_status(
        &self,
        id: Uuid,
        status: TeamStatus,
    ) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>>;
    fn delete_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    fn record_score_change(
        &self,
        change: ScoreChangeEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    fn list_score_changes(
        &self,
        team_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<ScoreChangeEntity>>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
