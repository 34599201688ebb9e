use std::fmt;

use serde::Serialize;

use crate::model::NewTeam;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every problem found in a draft, keyed by form field (`teamName`,
/// `manager`, `director`, `member-<index>`, `members`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    fn push(&mut self, field: impl Into<String>, message: &str) {
        self.0.push(FieldError {
            field: field.into(),
            message: message.to_string(),
        });
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl NewTeam {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.team_name.trim().is_empty() {
            errors.push("teamName", "Team name is required");
        }
        if self.manager.trim().is_empty() {
            errors.push("manager", "Manager is required");
        }
        if self.director.trim().is_empty() {
            errors.push("director", "Director is required");
        }
        if self.members.is_empty() {
            errors.push("members", "At least one member is required");
        }
        for (i, member) in self.members.iter().enumerate() {
            if member.name.trim().is_empty() {
                errors.push(format!("member-{i}"), "Member name is required");
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
