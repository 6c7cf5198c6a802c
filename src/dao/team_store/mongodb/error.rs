use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to list teams")]
    ListTeams {
        #[source]
        source: MongoError,
    },
    #[error("failed to load team `{id}`")]
    LoadTeam {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to save team `{id}`")]
    SaveTeam {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to delete team `{id}`")]
    DeleteTeam {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to record score change for team `{team_id}`")]
    SaveScoreChange {
        team_id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to list score changes for team `{team_id}`")]
    ListScoreChanges {
        team_id: Uuid,
        #[source]
        source: MongoError,
    },
}
