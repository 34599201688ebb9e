//! Free-text team search.
//!
//! The server filters the collection with this matcher and the client uses
//! it for its local filtered view, so both always agree on what a query
//! matches.

use crate::model::Team;

/// Turns raw user input into a lowercase needle. Blank input means "no
/// filter".
pub fn normalize_query(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(raw.to_lowercase())
    }
}

/// Case-insensitive substring match on team name, manager, director or any
/// member name. `needle` must already be lowercase.
pub fn matches(team: &Team, needle: &str) -> bool {
    contains(&team.team_name, needle)
        || contains(&team.manager, needle)
        || contains(&team.director, needle)
        || team.members.iter().any(|m| contains(&m.name, needle))
}

pub fn filter(teams: &[Team], raw_query: &str) -> Vec<Team> {
    match normalize_query(raw_query) {
        None => teams.to_vec(),
        Some(needle) => teams
            .iter()
            .filter(|team| matches(team, &needle))
            .cloned()
            .collect(),
    }
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
