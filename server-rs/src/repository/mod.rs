//! Access to the `teams` collection.
//!
//! Every method is a single store operation. Nothing here composes several
//! writes, so two requests patching the same team are each atomic but not
//! ordered against each other: the last write wins on overlapping fields.

use async_trait::async_trait;
use team_core::{ApprovalField, ApprovalStatus, NewTeam, Team, TeamPatch};

use crate::error::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::MemoryTeamRepository;
pub use postgres::PgTeamRepository;

#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// All teams sorted by `order`, optionally restricted to those matching a
    /// lowercase search needle.
    async fn list(&self, needle: Option<&str>) -> AppResult<Vec<Team>>;

    /// Inserts a team with pending approvals and `order` one past the
    /// current maximum. Returns the generated id.
    async fn create(&self, team: NewTeam) -> AppResult<String>;

    async fn get(&self, id: &str) -> AppResult<Option<Team>>;

    /// Returns whether a team matched.
    async fn replace(&self, id: &str, patch: TeamPatch) -> AppResult<bool>;

    /// Returns whether a team matched.
    async fn delete(&self, id: &str) -> AppResult<bool>;

    /// Returns how many teams were actually removed.
    async fn delete_many(&self, ids: &[String]) -> AppResult<u64>;

    /// Returns whether a team matched.
    async fn set_status(
        &self,
        id: &str,
        field: ApprovalField,
        status: ApprovalStatus,
    ) -> AppResult<bool>;

    /// Sets each referenced team's `order` to its position in `ids` in one
    /// batched write. Unknown ids are skipped.
    async fn reorder(&self, ids: &[String]) -> AppResult<()>;

    /// Returns whether the team matched; a missing member is not an error.
    async fn remove_member(&self, id: &str, member_id: &str) -> AppResult<bool>;

    /// Returns whether both the team and the member matched.
    async fn rename_member(&self, id: &str, member_id: &str, name: &str) -> AppResult<bool>;

    async fn ping(&self) -> bool;

    async fn close(&self) {}
}
