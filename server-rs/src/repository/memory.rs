use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use team_core::{ops, search, ApprovalField, ApprovalStatus, NewTeam, Team, TeamPatch};

use super::TeamRepository;
use crate::error::AppResult;

/// Process-local store backed by a vector of documents.
#[derive(Clone, Default)]
pub struct MemoryTeamRepository {
    teams: Arc<RwLock<Vec<Team>>>,
}

impl MemoryTeamRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn update_one(&self, id: &str, f: impl FnOnce(&mut Team)) -> bool {
        let mut teams = self.teams.write().await;
        match teams.iter_mut().find(|t| t.id == id) {
            Some(team) => {
                f(team);
                team.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl TeamRepository for MemoryTeamRepository {
    async fn list(&self, needle: Option<&str>) -> AppResult<Vec<Team>> {
        let teams = self.teams.read().await;
        let mut out: Vec<Team> = match needle {
            Some(needle) => teams
                .iter()
                .filter(|t| search::matches(t, needle))
                .cloned()
                .collect(),
            None => teams.clone(),
        };
        out.sort_by_key(|t| t.order);
        Ok(out)
    }

    async fn create(&self, team: NewTeam) -> AppResult<String> {
        let mut teams = self.teams.write().await;
        let id = Uuid::new_v4().to_string();
        let order = ops::next_order(&teams);
        teams.push(team.into_team(id.clone(), order, Utc::now()));
        Ok(id)
    }

    async fn get(&self, id: &str) -> AppResult<Option<Team>> {
        let teams = self.teams.read().await;
        Ok(teams.iter().find(|t| t.id == id).cloned())
    }

    async fn replace(&self, id: &str, patch: TeamPatch) -> AppResult<bool> {
        Ok(self
            .update_one(id, |team| patch.apply(team, Utc::now()))
            .await)
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let mut teams = self.teams.write().await;
        let before = teams.len();
        teams.retain(|t| t.id != id);
        Ok(teams.len() < before)
    }

    async fn delete_many(&self, ids: &[String]) -> AppResult<u64> {
        let mut teams = self.teams.write().await;
        let before = teams.len();
        *teams = ops::without_teams(&teams, ids);
        Ok((before - teams.len()) as u64)
    }

    async fn set_status(
        &self,
        id: &str,
        field: ApprovalField,
        status: ApprovalStatus,
    ) -> AppResult<bool> {
        Ok(self
            .update_one(id, |team| team.set_status(field, status))
            .await)
    }

    async fn reorder(&self, ids: &[String]) -> AppResult<()> {
        let mut teams = self.teams.write().await;
        let now = Utc::now();
        for (id, position) in ops::positions(ids) {
            if let Some(team) = teams.iter_mut().find(|t| t.id == id) {
                team.order = position;
                team.updated_at = now;
            }
        }
        Ok(())
    }

    async fn remove_member(&self, id: &str, member_id: &str) -> AppResult<bool> {
        Ok(self
            .update_one(id, |team| team.members.retain(|m| m.id != member_id))
            .await)
    }

    async fn rename_member(&self, id: &str, member_id: &str, name: &str) -> AppResult<bool> {
        let mut teams = self.teams.write().await;
        let Some(team) = teams.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        let Some(member) = team.members.iter_mut().find(|m| m.id == member_id) else {
            return Ok(false);
        };
        member.name = name.to_string();
        team.updated_at = Utc::now();
        Ok(true)
    }

    async fn ping(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use team_core::Member;

    fn draft(name: &str, member: &str) -> NewTeam {
        NewTeam {
            team_name: name.into(),
            manager: "Bob".into(),
            director: "Carol".into(),
            members: vec![Member::new(member)],
        }
    }

    #[tokio::test]
    async fn create_appends_after_highest_order() {
        let repo = MemoryTeamRepository::new();
        let a = repo.create(draft("A", "x")).await.unwrap();
        repo.reorder(&[String::new(), String::new(), a.clone()]).await.unwrap();
        let b = repo.create(draft("B", "y")).await.unwrap();

        let b = repo.get(&b).await.unwrap().unwrap();
        assert_eq!(b.order, 3);
        assert_eq!(b.manager_approval_status, ApprovalStatus::Pending);
        assert_eq!(b.director_approval_status, ApprovalStatus::Pending);
    }

    #[tokio::test]
    async fn renaming_a_missing_member_leaves_team_untouched() {
        let repo = MemoryTeamRepository::new();
        let id = repo.create(draft("A", "x")).await.unwrap();
        let before = repo.get(&id).await.unwrap().unwrap();

        assert!(!repo.rename_member(&id, "ghost", "Zed").await.unwrap());
        let after = repo.get(&id).await.unwrap().unwrap();
        assert_eq!(after.members, before.members);
    }
}
