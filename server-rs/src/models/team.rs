use serde::Deserialize;

pub use team_core::{ApprovalField, ApprovalStatus, Member, NewTeam, Team, TeamPatch};

// Request bodies keep their required fields optional so a missing field is
// reported as a 400 with our own message instead of an extractor rejection.

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    #[serde(default)]
    pub ids: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    #[serde(default)]
    pub teams: Option<Vec<TeamRef>>,
}

/// Any object carrying a team `_id`; clients usually send whole teams.
#[derive(Debug, Deserialize)]
pub struct TeamRef {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusPatchRequest {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MemberPatchRequest {
    #[serde(default)]
    pub name: Option<String>,
}
