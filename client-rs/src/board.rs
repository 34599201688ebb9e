use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use team_core::{
    assign_member_ids, ops, search, ApprovalField, ApprovalStatus, NewTeam, Team, TeamPatch,
};

use crate::api::TeamsApi;
use crate::error::{ClientError, ClientResult};
use crate::notify::{Notification, Notifier};
use crate::optimistic::Optimistic;
use crate::selection::Selection;

#[derive(Debug, Clone)]
struct DragSession {
    dragged: usize,
    working: Vec<Team>,
}

/// Client-side state of the team list: the authoritative copy, the search
/// query, checked rows and an in-progress drag.
///
/// Every mutation is applied locally first and rolled back if the server
/// call fails. Outcomes are reported through the [`Notifier`].
pub struct TeamBoard<A> {
    api: A,
    notifier: Arc<dyn Notifier>,
    teams: Optimistic<Team>,
    query: RwLock<String>,
    selection: RwLock<Selection>,
    drag: RwLock<Option<DragSession>>,
}

impl<A: TeamsApi> TeamBoard<A> {
    pub fn new(api: A, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            teams: Optimistic::new(Vec::new()),
            query: RwLock::new(String::new()),
            selection: RwLock::new(Selection::new()),
            drag: RwLock::new(None),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// The authoritative list, including unconfirmed changes.
    pub async fn teams(&self) -> Vec<Team> {
        self.teams.current().await
    }

    /// What the table shows: the drag preview while dragging, otherwise the
    /// authoritative list filtered by the current query.
    pub async fn visible(&self) -> Vec<Team> {
        if let Some(session) = self.drag.read().await.as_ref() {
            return session.working.clone();
        }
        let teams = self.teams.current().await;
        let query = self.query.read().await;
        search::filter(&teams, &query)
    }

    pub async fn set_query(&self, query: impl Into<String>) {
        *self.query.write().await = query.into();
    }

    pub async fn query(&self) -> String {
        self.query.read().await.clone()
    }

    pub async fn fetch(&self) -> ClientResult<Vec<Team>> {
        match self.api.list(None).await {
            Ok(teams) => {
                tracing::debug!(count = teams.len(), "Fetched teams");
                self.teams.replace(teams.clone()).await;
                Ok(teams)
            }
            Err(e) => {
                tracing::warn!("Failed to fetch teams: {e}");
                self.notifier.notify(Notification::failure(
                    "Error Loading Teams",
                    "Unable to fetch teams from the server. Please refresh the page.",
                ));
                Err(e)
            }
        }
    }

    /// Loads one team for the edit form.
    pub async fn load_team(&self, id: &str) -> ClientResult<Team> {
        let result = self.api.get(id).await;
        if let Err(e) = &result {
            tracing::warn!(team_id = %id, "Failed to load team: {e}");
            self.notifier
                .notify(Notification::failure("Error", "Failed to fetch team"));
        }
        result
    }

    /// Validates the draft, creates the team and refreshes the list.
    /// Returns the new team's id.
    pub async fn create_team(&self, mut draft: NewTeam) -> ClientResult<String> {
        self.check_draft(&draft)?;
        assign_member_ids(&mut draft.members);

        let name = draft.team_name.clone();
        match self.api.create(&draft).await {
            Ok(created) => {
                self.notifier.notify(Notification::success(
                    "Team Created Successfully",
                    format!(
                        "\"{name}\" has been created with {} member(s).",
                        draft.members.len()
                    ),
                ));
                self.refresh_quietly().await;
                Ok(created.id)
            }
            Err(e) => {
                self.notifier.notify(Notification::failure(
                    "Error",
                    format!("Failed to create team \"{name}\". Please try again."),
                ));
                Err(e)
            }
        }
    }

    /// Saves the edit form: every editable field of the team is replaced.
    pub async fn save_team(&self, id: &str, mut draft: NewTeam) -> ClientResult<()> {
        self.check_draft(&draft)?;
        // New rows get their ids here so the local copy and the server agree.
        assign_member_ids(&mut draft.members);

        let name = draft.team_name.clone();
        let member_count = draft.members.len();
        let patch = TeamPatch::from(draft);

        let result = self
            .teams
            .update(
                |teams| {
                    let mut out = teams.to_vec();
                    if let Some(team) = out.iter_mut().find(|t| t.id == id) {
                        patch.clone().apply(team, Utc::now());
                    }
                    out
                },
                self.api.update(id, &patch),
            )
            .await;

        match result {
            Ok(_) => {
                self.notifier.notify(Notification::success(
                    "Team Updated Successfully",
                    format!("\"{name}\" has been updated with {member_count} member(s)."),
                ));
                Ok(())
            }
            Err(e) => {
                self.notifier.notify(Notification::failure(
                    "Error",
                    format!("Failed to update team \"{name}\". Please try again."),
                ));
                Err(e)
            }
        }
    }

    pub async fn delete_team(&self, id: &str) -> ClientResult<()> {
        let name = self.team_name(id).await;

        let result = self
            .teams
            .update(|teams| ops::without_team(teams, id), self.api.delete(id))
            .await;

        match result {
            Ok(_) => {
                self.notifier.notify(Notification::success(
                    "Team Deleted Successfully",
                    format!("\"{name}\" has been removed from the system."),
                ));
                Ok(())
            }
            Err(e) => {
                tracing::warn!(team_id = %id, "Delete failed, restoring team: {e}");
                self.notifier.notify(Notification::failure(
                    "Error Deleting Team",
                    format!("Failed to delete \"{name}\". Please try again."),
                ));
                Err(e)
            }
        }
    }

    /// Removes several teams at once and returns how many the server deleted.
    pub async fn bulk_delete(&self, ids: &[String]) -> ClientResult<u64> {
        let names = {
            let teams = self.teams.current().await;
            teams
                .iter()
                .filter(|t| ids.contains(&t.id))
                .map(|t| t.team_name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        let result = self
            .teams
            .update(
                |teams| ops::without_teams(teams, ids),
                self.api.bulk_delete(ids),
            )
            .await;

        match result {
            Ok(deleted) => {
                self.notifier.notify(Notification::success(
                    "Teams Deleted Successfully",
                    format!("{} team(s) removed: {names}", ids.len()),
                ));
                Ok(deleted.deleted_count)
            }
            Err(e) => {
                tracing::warn!(count = ids.len(), "Bulk delete failed, restoring teams: {e}");
                self.notifier.notify(Notification::failure(
                    "Error Deleting Teams",
                    format!("Failed to delete {} team(s). Please try again.", ids.len()),
                ));
                Err(e)
            }
        }
    }

    /// Bulk-deletes the checked teams. The selection is cleared once the
    /// call resolves, whatever the outcome.
    pub async fn delete_selected(&self) -> ClientResult<u64> {
        let ids = self.selection.read().await.ids();
        if ids.is_empty() {
            return Ok(0);
        }
        let result = self.bulk_delete(&ids).await;
        self.selection.write().await.clear();
        result
    }

    pub async fn update_status(
        &self,
        id: &str,
        field: ApprovalField,
        status: ApprovalStatus,
    ) -> ClientResult<()> {
        let name = self.team_name(id).await;

        let result = self
            .teams
            .update(
                |teams| ops::with_status(teams, id, field, status),
                self.api.update_status(id, field, status),
            )
            .await;

        match result {
            Ok(_) => {
                let approver = field.approver();
                let description = match status {
                    ApprovalStatus::Approved => format!("Team \"{name}\" got {approver} Approval"),
                    ApprovalStatus::NotApproved => {
                        format!("Team \"{name}\" was Not Approved by {approver}")
                    }
                    ApprovalStatus::Pending => {
                        format!("Team \"{name}\" {approver} approval status reset to Pending")
                    }
                };
                self.notifier
                    .notify(Notification::success("Status Updated Successfully", description));
                Ok(())
            }
            Err(e) => {
                tracing::warn!(team_id = %id, %field, "Status change failed, reverting: {e}");
                self.notifier.notify(Notification::failure(
                    "Error Updating Status",
                    format!("Failed to update approval status for \"{name}\". Please try again."),
                ));
                Err(e)
            }
        }
    }

    /// Removes a member. The last member of a known team is never removed;
    /// that case fails locally without contacting the server. A team missing
    /// from the local list is left for the server to reject.
    pub async fn delete_member(&self, team_id: &str, member_id: &str) -> ClientResult<()> {
        let (team_name, member_name, member_count) = {
            let teams = self.teams.current().await;
            match teams.iter().find(|t| t.id == team_id) {
                Some(team) => (
                    team.team_name.clone(),
                    team.member(member_id)
                        .map_or_else(|| "Member".to_string(), |m| m.name.clone()),
                    Some(team.members.len()),
                ),
                None => ("team".to_string(), "Member".to_string(), None),
            }
        };

        if member_count.is_some_and(|count| count <= 1) {
            self.notifier.notify(Notification::failure(
                "Cannot Delete Last Member",
                format!(
                    "Cannot remove the last member from \"{team_name}\". A team must have at least one member."
                ),
            ));
            return Err(ClientError::LastMember);
        }

        let result = self
            .teams
            .update(
                |teams| ops::without_member(teams, team_id, member_id),
                self.api.delete_member(team_id, member_id),
            )
            .await;

        match result {
            Ok(_) => {
                self.notifier.notify(Notification::success(
                    "Member Removed Successfully",
                    format!("\"{member_name}\" has been removed from \"{team_name}\"."),
                ));
                Ok(())
            }
            Err(e) => {
                self.notifier.notify(Notification::failure(
                    "Error Removing Member",
                    format!(
                        "Failed to remove \"{member_name}\" from \"{team_name}\". Please try again."
                    ),
                ));
                Err(e)
            }
        }
    }

    pub async fn update_member(&self, team_id: &str, member_id: &str, name: &str) -> ClientResult<()> {
        let team_name = self.team_name(team_id).await;

        let result = self
            .teams
            .update(
                |teams| ops::with_member_name(teams, team_id, member_id, name),
                self.api.update_member(team_id, member_id, name),
            )
            .await;

        match result {
            Ok(_) => {
                self.notifier.notify(Notification::success(
                    "Member Updated Successfully",
                    format!("Member name changed to \"{name}\" in \"{team_name}\"."),
                ));
                Ok(())
            }
            Err(e) => {
                self.notifier.notify(Notification::failure(
                    "Error Updating Member",
                    format!("Failed to update member in \"{team_name}\". Please try again."),
                ));
                Err(e)
            }
        }
    }

    /// Submits a new order. On success the list is re-fetched so it carries
    /// the order values the server assigned.
    pub async fn reorder(&self, ordered: Vec<Team>) -> ClientResult<()> {
        let result = self
            .teams
            .update(
                |teams| ops::with_order(teams, &ordered),
                self.api.reorder(&ordered),
            )
            .await;

        match result {
            Ok(_) => {
                self.notifier.notify(Notification::success(
                    "Teams Reordered Successfully",
                    "The new team order has been saved.",
                ));
                self.refresh_quietly().await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Reorder failed, restoring previous order: {e}");
                self.notifier.notify(Notification::failure(
                    "Error Reordering Teams",
                    "Failed to save the new team order. Please try again.",
                ));
                Err(e)
            }
        }
    }

    /// Starts dragging the visible row at `index`.
    pub async fn drag_start(&self, index: usize) {
        let working = self.visible().await;
        if index >= working.len() {
            return;
        }
        *self.drag.write().await = Some(DragSession {
            dragged: index,
            working,
        });
    }

    /// Moves the dragged row to the hovered index in the preview.
    pub async fn drag_over(&self, index: usize) {
        let mut drag = self.drag.write().await;
        let Some(session) = drag.as_mut() else {
            return;
        };
        if index == session.dragged || index >= session.working.len() {
            return;
        }
        session.working = ops::move_item(&session.working, session.dragged, index);
        session.dragged = index;
    }

    /// Ends the drag and submits the previewed order.
    pub async fn drag_end(&self) -> ClientResult<()> {
        let Some(session) = self.drag.write().await.take() else {
            return Ok(());
        };
        self.reorder(session.working).await
    }

    pub async fn dragged_index(&self) -> Option<usize> {
        self.drag.read().await.as_ref().map(|s| s.dragged)
    }

    pub async fn toggle_selected(&self, id: &str) -> bool {
        self.selection.write().await.toggle(id)
    }

    pub async fn set_selected(&self, id: &str, checked: bool) {
        self.selection.write().await.set(id, checked);
    }

    /// Checks every row currently visible.
    pub async fn select_all_visible(&self) {
        let ids: Vec<String> = self.visible().await.into_iter().map(|t| t.id).collect();
        self.selection.write().await.select_all(ids);
    }

    pub async fn clear_selection(&self) {
        self.selection.write().await.clear();
    }

    pub async fn selection(&self) -> Selection {
        self.selection.read().await.clone()
    }

    fn check_draft(&self, draft: &NewTeam) -> ClientResult<()> {
        draft.validate().map_err(|errors| {
            tracing::debug!("Rejected team draft: {errors}");
            self.notifier.notify(Notification::failure(
                "Validation Error",
                "Please fill in all required fields",
            ));
            ClientError::from(errors)
        })
    }

    async fn team_name(&self, id: &str) -> String {
        self.teams
            .current()
            .await
            .into_iter()
            .find(|t| t.id == id)
            .map_or_else(|| "team".to_string(), |t| t.team_name)
    }

    async fn refresh_quietly(&self) {
        match self.api.list(None).await {
            Ok(teams) => self.teams.replace(teams).await,
            Err(e) => tracing::warn!("Failed to refresh teams: {e}"),
        }
    }
}
