//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a team name contains at least one non-whitespace character.
///
/// Names are not required to be unique; bulk import can legitimately create
/// duplicates.
pub fn validate_team_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("team_name_empty");
        err.message = Some("Team name must not be empty".into());
        return Err(err);
    }

    Ok(())
}

/// Split a newline-delimited bulk-import payload into usable team names.
///
/// Each line is trimmed, and blank lines are discarded.
pub fn split_team_names(teams_list: &str) -> Vec<String> {
    teams_list
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_team_name_valid() {
        assert!(validate_team_name("Alpha").is_ok());
        assert!(validate_team_name("  padded  ").is_ok());
        assert!(validate_team_name("0").is_ok());
    }

    #[test]
    fn test_validate_team_name_empty() {
        assert!(validate_team_name("").is_err());
        assert!(validate_team_name("   ").is_err());
        assert!(validate_team_name("\t\n").is_err());
    }

    #[test]
    fn test_split_team_names_trims_and_drops_blanks() {
        let names = split_team_names("Team A\n\nTeam B\n  \n");
        assert_eq!(names, vec!["Team A", "Team B"]);
    }

    #[test]
    fn test_split_team_names_trims_surrounding_whitespace() {
        let names = split_team_names("  Alpha  \r\n Beta\n");
        assert_eq!(names, vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_split_team_names_empty_input() {
        assert!(split_team_names("").is_empty());
        assert!(split_team_names("\n \n\t\n").is_empty());
    }
}
