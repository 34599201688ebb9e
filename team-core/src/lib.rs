//! Team documents and the pure rules shared by the API service and the
//! client board: search matching, approval cycling, list mutations and draft
//! validation.

pub mod model;
pub mod ops;
pub mod search;
pub mod validation;

pub use model::{
    assign_member_ids, new_member_id, ApprovalField, ApprovalStatus, Member, NewTeam, ParseError,
    Team, TeamPatch,
};
pub use validation::{FieldError, ValidationErrors};
