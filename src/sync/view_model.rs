use crate::sync::model::{ChangeEvent, TeamRecord};

/// Ranked team list owned by the sync controller.
///
/// Two invariants hold after every mutation: the list is in canonical order
/// (score descending, then name ascending, stable beyond that) and contains
/// at most one record per team id. Event application is all-or-nothing; a
/// rejected or irrelevant event leaves the list untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewModel {
    teams: Vec<TeamRecord>,
}

impl ViewModel {
    /// Create an empty view model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current ranked teams.
    pub fn teams(&self) -> &[TeamRecord] {
        &self.teams
    }

    /// Replace the whole list with a freshly fetched snapshot.
    ///
    /// Returns `false` when the snapshot equals the current list by value,
    /// so callers can skip republishing an unchanged view.
    pub fn apply_snapshot(&mut self, mut teams: Vec<TeamRecord>) -> bool {
        sort_canonical(&mut teams);
        if teams == self.teams {
            return false;
        }
        self.teams = teams;
        true
    }

    /// Apply one change event, returning whether the list changed.
    ///
    /// Insert and update are both upserts keyed by id: an insert whose id is
    /// already present replaces that record, an update whose id is missing
    /// appends it. A delete for an unknown id is a no-op, not an error.
    pub fn apply_event(&mut self, event: ChangeEvent) -> bool {
        match event {
            ChangeEvent::Insert(record) | ChangeEvent::Update(record) => {
                self.upsert(record);
                true
            }
            ChangeEvent::Delete(id) => {
                let len_before = self.teams.len();
                self.teams.retain(|team| team.id != id);
                len_before != self.teams.len()
            }
        }
    }

    fn upsert(&mut self, record: TeamRecord) {
        match self.teams.iter_mut().find(|team| team.id == record.id) {
            Some(existing) => *existing = record,
            None => self.teams.push(record),
        }
        sort_canonical(&mut self.teams);
    }
}

/// Canonical leaderboard order: score descending, then name ascending.
///
/// The sort is stable, so records tying on both keys keep their prior
/// relative order.
pub fn sort_canonical(teams: &mut [TeamRecord]) {
    teams.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::model::TeamStatus;
    use uuid::Uuid;

    fn team_with_id(id: Uuid, name: &str, score: i64) -> TeamRecord {
        TeamRecord {
            id,
            name: name.to_string(),
            score,
            status: TeamStatus::Active,
            last_score_update: None,
        }
    }

    fn team(name: &str, score: i64) -> TeamRecord {
        team_with_id(Uuid::new_v4(), name, score)
    }

    fn names(view: &ViewModel) -> Vec<&str> {
        view.teams().iter().map(|team| team.name.as_str()).collect()
    }

    #[test]
    fn snapshot_sorts_by_score_descending() {
        let mut view = ViewModel::new();
        view.apply_snapshot(vec![team("Low", 3), team("High", 42), team("Mid", 10)]);
        assert_eq!(names(&view), vec!["High", "Mid", "Low"]);
    }

    #[test]
    fn score_ties_break_by_name_ascending() {
        let mut view = ViewModel::new();
        view.apply_snapshot(vec![team("Beta", 10), team("Alpha", 10)]);
        assert_eq!(names(&view), vec!["Alpha", "Beta"]);
    }

    #[test]
    fn negative_scores_rank_below_zero() {
        let mut view = ViewModel::new();
        view.apply_snapshot(vec![team("Minus", -5), team("Zero", 0)]);
        assert_eq!(names(&view), vec!["Zero", "Minus"]);
    }

    #[test]
    fn equal_score_and_name_keep_prior_relative_order() {
        let first = team("Twin", 7);
        let second = team("Twin", 7);
        let mut view = ViewModel::new();
        view.apply_event(ChangeEvent::Insert(first.clone()));
        view.apply_event(ChangeEvent::Insert(second.clone()));
        view.apply_event(ChangeEvent::Update(team("Other", 9)));

        let ids: Vec<Uuid> = view
            .teams()
            .iter()
            .filter(|record| record.name == "Twin")
            .map(|record| record.id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[test]
    fn insert_with_existing_id_acts_as_update() {
        let id = Uuid::new_v4();
        let mut view = ViewModel::new();
        view.apply_event(ChangeEvent::Insert(team_with_id(id, "Rovers", 1)));
        view.apply_event(ChangeEvent::Insert(team_with_id(id, "Rovers", 8)));

        assert_eq!(view.teams().len(), 1);
        assert_eq!(view.teams()[0].score, 8);
    }

    #[test]
    fn update_with_unknown_id_acts_as_insert() {
        let mut view = ViewModel::new();
        view.apply_event(ChangeEvent::Update(team("Ghost", 4)));
        assert_eq!(names(&view), vec!["Ghost"]);
    }

    #[test]
    fn applying_same_update_twice_is_idempotent() {
        let record = team("Steady", 12);
        let mut view = ViewModel::new();
        view.apply_event(ChangeEvent::Update(record.clone()));
        let once = view.clone();
        view.apply_event(ChangeEvent::Update(record));
        assert_eq!(view, once);
    }

    #[test]
    fn later_update_wins_regardless_of_score_direction() {
        let id = Uuid::new_v4();
        let mut view = ViewModel::new();
        view.apply_event(ChangeEvent::Update(team_with_id(id, "Drift", 5)));
        view.apply_event(ChangeEvent::Update(team_with_id(id, "Drift", 3)));
        assert_eq!(view.teams()[0].score, 3);
    }

    #[test]
    fn delete_removes_matching_record() {
        let record = team("Doomed", 2);
        let mut view = ViewModel::new();
        view.apply_event(ChangeEvent::Insert(record.clone()));
        assert!(view.apply_event(ChangeEvent::Delete(record.id)));
        assert!(view.teams().is_empty());
    }

    #[test]
    fn delete_unknown_id_is_noop() {
        let mut view = ViewModel::new();
        view.apply_snapshot(vec![team("Keep", 1)]);
        let before = view.clone();
        assert!(!view.apply_event(ChangeEvent::Delete(Uuid::new_v4())));
        assert_eq!(view, before);
    }

    #[test]
    fn snapshot_supersedes_previously_applied_events() {
        let mut view = ViewModel::new();
        view.apply_event(ChangeEvent::Insert(team("Stale", 99)));

        let fresh = vec![team("Fresh", 1)];
        assert!(view.apply_snapshot(fresh));
        assert_eq!(names(&view), vec!["Fresh"]);
    }

    #[test]
    fn identical_snapshot_reports_no_change() {
        let roster = vec![team("Alpha", 10), team("Beta", 8)];
        let mut view = ViewModel::new();
        assert!(view.apply_snapshot(roster.clone()));
        assert!(!view.apply_snapshot(roster));
    }

    #[test]
    fn event_sequences_never_duplicate_an_id() {
        let id = Uuid::new_v4();
        let mut view = ViewModel::new();
        view.apply_event(ChangeEvent::Insert(team_with_id(id, "Solo", 1)));
        view.apply_event(ChangeEvent::Update(team_with_id(id, "Solo", 2)));
        view.apply_event(ChangeEvent::Insert(team_with_id(id, "Solo", 3)));
        view.apply_event(ChangeEvent::Update(team_with_id(id, "Solo", 4)));

        assert_eq!(view.teams().len(), 1);
        assert_eq!(view.teams()[0].score, 4);
    }
}
