use crate::dao::models::TeamEntity;
use crate::dto::format_system_time;
use crate::sync::model::TeamRecord;

impl From<TeamEntity> for TeamRecord {
    fn from(entity: TeamEntity) -> Self {
        TeamRecord {
            id: entity.id,
            name: entity.name,
            score: entity.score,
            status: entity.status,
            last_score_update: entity.last_score_update.map(format_system_time),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use crate::dao::models::TeamEntity;
    use crate::sync::model::TeamRecord;

    #[test]
    fn conversion_formats_the_score_timestamp_as_rfc3339() {
        let mut entity = TeamEntity::new("Rustaceans".to_string());
        entity.last_score_update =
            Some(SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000));

        let record = TeamRecord::from(entity.clone());
        assert_eq!(record.id, entity.id);
        assert_eq!(
            record.last_score_update.as_deref(),
            Some("2023-11-14T22:13:20Z")
        );
    }

    #[test]
    fn conversion_keeps_a_missing_timestamp_null() {
        let record = TeamRecord::from(TeamEntity::new("Fresh".to_string()));
        assert_eq!(record.last_score_update, None);
        assert_eq!(record.score, 0);
    }
}
