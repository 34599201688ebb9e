//! Pure list mutations.
//!
//! Each function takes the current list and returns the new one, leaving the
//! input untouched. The client applies them optimistically and the in-memory
//! store applies them for real.

use std::collections::HashMap;

use crate::model::{ApprovalField, ApprovalStatus, Team};

pub fn without_team(teams: &[Team], id: &str) -> Vec<Team> {
    teams.iter().filter(|t| t.id != id).cloned().collect()
}

pub fn without_teams(teams: &[Team], ids: &[String]) -> Vec<Team> {
    teams
        .iter()
        .filter(|t| !ids.iter().any(|id| *id == t.id))
        .cloned()
        .collect()
}

pub fn with_status(
    teams: &[Team],
    id: &str,
    field: ApprovalField,
    status: ApprovalStatus,
) -> Vec<Team> {
    map_team(teams, id, |team| team.set_status(field, status))
}

pub fn without_member(teams: &[Team], team_id: &str, member_id: &str) -> Vec<Team> {
    map_team(teams, team_id, |team| team.members.retain(|m| m.id != member_id))
}

pub fn with_member_name(teams: &[Team], team_id: &str, member_id: &str, name: &str) -> Vec<Team> {
    map_team(teams, team_id, |team| {
        if let Some(member) = team.members.iter_mut().find(|m| m.id == member_id) {
            member.name = name.to_string();
        }
    })
}

/// Removes the item at `from` and reinserts it at `to`. Out-of-range indices
/// leave the list as it is.
pub fn move_item<T: Clone>(items: &[T], from: usize, to: usize) -> Vec<T> {
    let mut out = items.to_vec();
    if from >= out.len() || to >= out.len() || from == to {
        return out;
    }
    let item = out.remove(from);
    out.insert(to, item);
    out
}

/// Applies a submitted ordering: the teams in `ordered` come first with
/// `order` equal to their position, followed by every other team in its
/// previous relative order.
pub fn with_order(teams: &[Team], ordered: &[Team]) -> Vec<Team> {
    let mut out: Vec<Team> = ordered
        .iter()
        .enumerate()
        .map(|(i, team)| {
            let mut team = team.clone();
            team.order = i as i64;
            team
        })
        .collect();
    let rest = teams
        .iter()
        .filter(|t| !ordered.iter().any(|o| o.id == t.id))
        .cloned();
    out.extend(rest);
    out
}

/// Maps each referenced id to its position in the submitted sequence. An id
/// listed more than once keeps its last position.
pub fn positions(ids: &[String]) -> Vec<(String, i64)> {
    let mut last: HashMap<&str, i64> = HashMap::new();
    for (i, id) in ids.iter().enumerate() {
        last.insert(id.as_str(), i as i64);
    }
    let mut out: Vec<(String, i64)> = last
        .into_iter()
        .map(|(id, pos)| (id.to_string(), pos))
        .collect();
    out.sort_by_key(|(_, pos)| *pos);
    out
}

/// Order value for a newly created team.
pub fn next_order(teams: &[Team]) -> i64 {
    teams.iter().map(|t| t.order).max().map_or(0, |max| max + 1)
}

fn map_team(teams: &[Team], id: &str, f: impl FnOnce(&mut Team)) -> Vec<Team> {
    let mut out = teams.to_vec();
    if let Some(team) = out.iter_mut().find(|t| t.id == id) {
        f(team);
    }
    out
}
