use mongodb::bson::{Binary, DateTime, Document, doc, spec::BinarySubtype};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{ScoreChangeEntity, TeamEntity};
use crate::sync::model::TeamStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoTeamDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    name: String,
    score: i64,
    status: TeamStatus,
    created_at: DateTime,
    updated_at: DateTime,
    last_score_update: Option<DateTime>,
}

impl From<TeamEntity> for MongoTeamDocument {
    fn from(value: TeamEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            score: value.score,
            status: value.status,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
            last_score_update: value.last_score_update.map(DateTime::from_system_time),
        }
    }
}

impl From<MongoTeamDocument> for TeamEntity {
    fn from(value: MongoTeamDocument) -> Self {
        Self {
            id: value.id,
            name: value.name,
            score: value.score,
            status: value.status,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
            last_score_update: value.last_score_update.map(|stamp| stamp.to_system_time()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoScoreChangeDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    team_id: Uuid,
    old_score: i64,
    new_score: i64,
    changed_by: String,
    reason: Option<String>,
    changed_at: DateTime,
}

impl From<ScoreChangeEntity> for MongoScoreChangeDocument {
    fn from(value: ScoreChangeEntity) -> Self {
        Self {
            id: value.id,
            team_id: value.team_id,
            old_score: value.old_score,
            new_score: value.new_score,
            changed_by: value.changed_by,
            reason: value.reason,
            changed_at: DateTime::from_system_time(value.changed_at),
        }
    }
}

impl From<MongoScoreChangeDocument> for ScoreChangeEntity {
    fn from(value: MongoScoreChangeDocument) -> Self {
        Self {
            id: value.id,
            team_id: value.team_id,
            old_score: value.old_score,
            new_score: value.new_score,
            changed_by: value.changed_by,
            reason: value.reason,
            changed_at: value.changed_at.to_system_time(),
        }
    }
}

pub fn uuid_as_binary(id: Uuid) -> Binary {
    Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.into_bytes().to_vec(),
    }
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": uuid_as_binary(id)}
}

/// Sort document matching the canonical leaderboard order.
pub fn canonical_sort() -> Document {
    doc! { "score": -1, "name": 1 }
}
