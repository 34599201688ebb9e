use tokio::sync::RwLock;

use team_core::{ApprovalField, ApprovalStatus, Team};

use crate::api::TeamsApi;
use crate::board::TeamBoard;
use crate::error::ClientResult;

/// The clickable status badge for one approval field of one team.
///
/// A click advances the shown state at once. If the server rejects the
/// change, the badge goes back to what it showed just before that click,
/// which after several quick clicks is not necessarily the stored value.
#[derive(Debug)]
pub struct ApprovalControl {
    team_id: String,
    field: ApprovalField,
    shown: RwLock<ApprovalStatus>,
}

impl ApprovalControl {
    pub fn new(team: &Team, field: ApprovalField) -> Self {
        Self {
            team_id: team.id.clone(),
            field,
            shown: RwLock::new(team.status(field)),
        }
    }

    pub fn field(&self) -> ApprovalField {
        self.field
    }

    pub async fn shown(&self) -> ApprovalStatus {
        *self.shown.read().await
    }

    /// Tooltip text for the current state.
    pub async fn tooltip(&self) -> &'static str {
        self.shown().await.label()
    }

    pub async fn click<A: TeamsApi>(&self, board: &TeamBoard<A>) -> ClientResult<ApprovalStatus> {
        let (previous, next) = {
            let mut shown = self.shown.write().await;
            let previous = *shown;
            *shown = previous.next();
            (previous, *shown)
        };

        match board.update_status(&self.team_id, self.field, next).await {
            Ok(()) => Ok(next),
            Err(e) => {
                *self.shown.write().await = previous;
                Err(e)
            }
        }
    }
}
