use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Approval state
// ---------------------------------------------------------------------------

/// Approval state of a team, tracked separately for the manager and the
/// director.
///
/// * `Pending`     – no decision yet (the state every new team starts in).
/// * `Approved`    – signed off.
/// * `NotApproved` – explicitly rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    NotApproved,
}

impl ApprovalStatus {
    pub const ALL: [ApprovalStatus; 3] = [
        ApprovalStatus::Pending,
        ApprovalStatus::Approved,
        ApprovalStatus::NotApproved,
    ];

    /// The state a single click on the approval control moves to.
    pub fn next(self) -> Self {
        match self {
            ApprovalStatus::Pending => ApprovalStatus::Approved,
            ApprovalStatus::Approved => ApprovalStatus::NotApproved,
            ApprovalStatus::NotApproved => ApprovalStatus::Pending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::NotApproved => "not-approved",
        }
    }

    /// Tooltip text shown next to the control.
    pub fn label(self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "No Action Taken",
            ApprovalStatus::Approved => "Approved",
            ApprovalStatus::NotApproved => "Not Approved",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApprovalStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseError::Status(s.to_string()))
    }
}

/// Which of the two approval fields of a team a status change targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApprovalField {
    ManagerApprovalStatus,
    DirectorApprovalStatus,
}

impl ApprovalField {
    pub fn as_str(self) -> &'static str {
        match self {
            ApprovalField::ManagerApprovalStatus => "managerApprovalStatus",
            ApprovalField::DirectorApprovalStatus => "directorApprovalStatus",
        }
    }

    /// Who grants this approval, for user-facing messages.
    pub fn approver(self) -> &'static str {
        match self {
            ApprovalField::ManagerApprovalStatus => "Manager",
            ApprovalField::DirectorApprovalStatus => "Director",
        }
    }
}

impl fmt::Display for ApprovalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalField {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "managerApprovalStatus" => Ok(ApprovalField::ManagerApprovalStatus),
            "directorApprovalStatus" => Ok(ApprovalField::DirectorApprovalStatus),
            other => Err(ParseError::Field(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid approval status: {0}")]
    Status(String),

    #[error("invalid approval field: {0}")]
    Field(String),
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// A member embedded in a team. The id is only unique within its team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub name: String,
}

impl Member {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_member_id(),
            name: name.into(),
        }
    }
}

pub fn new_member_id() -> String {
    Uuid::new_v4().to_string()
}

/// Gives every member without an id a fresh one.
pub fn assign_member_ids(members: &mut [Member]) {
    for member in members.iter_mut().filter(|m| m.id.trim().is_empty()) {
        member.id = new_member_id();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(rename = "_id")]
    pub id: String,
    pub team_name: String,
    pub manager: String,
    pub director: String,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub manager_approval_status: ApprovalStatus,
    #[serde(default)]
    pub director_approval_status: ApprovalStatus,
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Team {
    pub fn status(&self, field: ApprovalField) -> ApprovalStatus {
        match field {
            ApprovalField::ManagerApprovalStatus => self.manager_approval_status,
            ApprovalField::DirectorApprovalStatus => self.director_approval_status,
        }
    }

    pub fn set_status(&mut self, field: ApprovalField, status: ApprovalStatus) {
        match field {
            ApprovalField::ManagerApprovalStatus => self.manager_approval_status = status,
            ApprovalField::DirectorApprovalStatus => self.director_approval_status = status,
        }
    }

    pub fn member(&self, member_id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == member_id)
    }
}

/// Payload for creating a team. Every field may be omitted; the server fills
/// in statuses, order and timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewTeam {
    pub team_name: String,
    pub manager: String,
    pub director: String,
    pub members: Vec<Member>,
}

impl NewTeam {
    /// Builds the stored document for this payload.
    pub fn into_team(self, id: String, order: i64, now: DateTime<Utc>) -> Team {
        let mut members = self.members;
        assign_member_ids(&mut members);
        Team {
            id,
            team_name: self.team_name,
            manager: self.manager,
            director: self.director,
            members,
            manager_approval_status: ApprovalStatus::Pending,
            director_approval_status: ApprovalStatus::Pending,
            order,
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<&Team> for NewTeam {
    fn from(team: &Team) -> Self {
        Self {
            team_name: team.team_name.clone(),
            manager: team.manager.clone(),
            director: team.director.clone(),
            members: team.members.clone(),
        }
    }
}

/// Shallow replace of a team: every present field overwrites the stored one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<Member>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_approval_status: Option<ApprovalStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director_approval_status: Option<ApprovalStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl TeamPatch {
    pub fn apply(mut self, team: &mut Team, now: DateTime<Utc>) {
        if let Some(members) = self.members.as_mut() {
            assign_member_ids(members);
        }
        if let Some(v) = self.team_name {
            team.team_name = v;
        }
        if let Some(v) = self.manager {
            team.manager = v;
        }
        if let Some(v) = self.director {
            team.director = v;
        }
        if let Some(v) = self.members {
            team.members = v;
        }
        if let Some(v) = self.manager_approval_status {
            team.manager_approval_status = v;
        }
        if let Some(v) = self.director_approval_status {
            team.director_approval_status = v;
        }
        if let Some(v) = self.order {
            team.order = v;
        }
        team.updated_at = now;
    }
}

impl From<NewTeam> for TeamPatch {
    fn from(draft: NewTeam) -> Self {
        Self {
            team_name: Some(draft.team_name),
            manager: Some(draft.manager),
            director: Some(draft.director),
            members: Some(draft.members),
            ..Self::default()
        }
    }
}
