use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{Collection, Database, bson::doc, options::IndexOptions};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoScoreChangeDocument, MongoTeamDocument, canonical_sort, doc_id, uuid_as_binary},
};
use crate::dao::{
    models::{ScoreChangeEntity, TeamEntity},
    storage::StorageResult,
    team_store::TeamStore,
};
use crate::sync::model::TeamStatus;

const TEAM_COLLECTION_NAME: &str = "teams";
const SCORE_HISTORY_COLLECTION_NAME: &str = "score_history";

/// Persistent team storage backed by MongoDB.
///
/// Rows are written with replace-one-upsert so retried writes stay
/// idempotent, and `list_teams` sorts server-side with the canonical-order
/// sort document.
#[derive(Clone)]
pub struct MongoTeamStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    database: RwLock<Database>,
    config: MongoConfig,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = self.database.read().await.clone();
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let database =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        *self.database.write().await = database;
        Ok(())
    }
}

impl MongoTeamStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let database = establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            database: RwLock::new(database),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;

        let teams = database.collection::<MongoTeamDocument>(TEAM_COLLECTION_NAME);
        let name_index = mongodb::IndexModel::builder()
            .keys(doc! {"name": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("team_name_idx".to_owned()))
                    .build(),
            )
            .build();
        teams
            .create_index(name_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: TEAM_COLLECTION_NAME,
                index: "name",
                source,
            })?;

        let history = database.collection::<MongoScoreChangeDocument>(SCORE_HISTORY_COLLECTION_NAME);
        let team_index = mongodb::IndexModel::builder()
            .keys(doc! {"team_id": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("score_history_team_idx".to_owned()))
                    .build(),
            )
            .build();
        history
            .create_index(team_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: SCORE_HISTORY_COLLECTION_NAME,
                index: "team_id",
                source,
            })?;

        Ok(())
    }

    async fn database(&self) -> Database {
        self.inner.database.read().await.clone()
    }

    async fn team_collection(&self) -> Collection<MongoTeamDocument> {
        self.database()
            .await
            .collection::<MongoTeamDocument>(TEAM_COLLECTION_NAME)
    }

    async fn history_collection(&self) -> Collection<MongoScoreChangeDocument> {
        self.database()
            .await
            .collection::<MongoScoreChangeDocument>(SCORE_HISTORY_COLLECTION_NAME)
    }

    async fn list_teams(&self) -> MongoResult<Vec<TeamEntity>> {
        let collection = self.team_collection().await;
        let documents: Vec<MongoTeamDocument> = collection
            .find(doc! {})
            .sort(canonical_sort())
            .await
            .map_err(|source| MongoDaoError::ListTeams { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListTeams { source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn find_team(&self, id: Uuid) -> MongoResult<Option<TeamEntity>> {
        let collection = self.team_collection().await;
        let document = collection
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadTeam { id, source })?;
        Ok(document.map(Into::into))
    }

    async fn save_team(&self, team: TeamEntity) -> MongoResult<()> {
        let id = team.id;
        let document: MongoTeamDocument = team.into();
        let collection = self.team_collection().await;
        collection
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveTeam { id, source })?;
        Ok(())
    }

    async fn update_score(&self, id: Uuid, new_score: i64) -> MongoResult<Option<TeamEntity>> {
        let Some(mut team) = self.find_team(id).await? else {
            return Ok(None);
        };
        let now = std::time::SystemTime::now();
        team.score = new_score;
        team.updated_at = now;
        team.last_score_update = Some(now);
        self.save_team(team.clone()).await?;
        Ok(Some(team))
    }

    async fn update_status(&self, id: Uuid, status: TeamStatus) -> MongoResult<Option<TeamEntity>> {
        let Some(mut team) = self.find_team(id).await? else {
            return Ok(None);
        };
        team.status = status;
        team.updated_at = std::time::SystemTime::now();
        self.save_team(team.clone()).await?;
        Ok(Some(team))
    }

    async fn delete_team(&self, id: Uuid) -> MongoResult<bool> {
        let collection = self.team_collection().await;
        let result = collection
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::DeleteTeam { id, source })?;
        Ok(result.deleted_count > 0)
    }

    async fn record_score_change(&self, change: ScoreChangeEntity) -> MongoResult<()> {
        let team_id = change.team_id;
        let document: MongoScoreChangeDocument = change.into();
        let collection = self.history_collection().await;
        collection
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::SaveScoreChange { team_id, source })?;
        Ok(())
    }

    async fn list_score_changes(&self, team_id: Uuid) -> MongoResult<Vec<ScoreChangeEntity>> {
        let collection = self.history_collection().await;
        let documents: Vec<MongoScoreChangeDocument> = collection
            .find(doc! { "team_id": uuid_as_binary(team_id) })
            .sort(doc! { "changed_at": 1 })
            .await
            .map_err(|source| MongoDaoError::ListScoreChanges { team_id, source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListScoreChanges { team_id, source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }
}

impl TeamStore for MongoTeamStore {
    fn list_teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_teams().await.map_err(Into::into) })
    }

    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_team(id).await.map_err(Into::into) })
    }

    fn insert_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_team(team).await.map_err(Into::into) })
    }

    fn insert_teams(&self, teams: Vec<TeamEntity>) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            for team in teams {
                store.save_team(team).await?;
            }
            Ok(())
        })
    }

    fn update_score(
        &self,
        id: Uuid,
        new_score: i64,
    ) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.update_score(id, new_score).await.map_err(Into::into) })
    }

    fn update_status(
        &self,
        id: Uuid,
        status: TeamStatus,
    ) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.update_status(id, status).await.map_err(Into::into) })
    }

    fn delete_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_team(id).await.map_err(Into::into) })
    }

    fn record_score_change(
        &self,
        change: ScoreChangeEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.record_score_change(change).await.map_err(Into::into) })
    }

    fn list_score_changes(
        &self,
        team_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<ScoreChangeEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_score_changes(team_id).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
