use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::models::team::MemberPatchRequest;
use crate::routes::{AppJson, AppPath};
use crate::AppState;

/// Removing a member that is not on the roster still succeeds; only a
/// missing team is a 404.
pub async fn delete_member(
    State(state): State<AppState>,
    AppPath((id, member_id)): AppPath<(String, String)>,
) -> AppResult<Json<Value>> {
    if !state.store.remove_member(&id, &member_id).await? {
        return Err(AppError::NotFound("Team not found".into()));
    }

    tracing::info!(team_id = %id, member_id = %member_id, "Member removed");
    Ok(Json(json!({
        "success": true,
        "message": "Member deleted successfully",
    })))
}

pub async fn update_member(
    State(state): State<AppState>,
    AppPath((id, member_id)): AppPath<(String, String)>,
    AppJson(body): AppJson<MemberPatchRequest>,
) -> AppResult<Json<Value>> {
    let name = body
        .name
        .ok_or_else(|| AppError::BadRequest("Member name is required".into()))?;

    if !state.store.rename_member(&id, &member_id, &name).await? {
        return Err(AppError::NotFound("Team or member not found".into()));
    }

    tracing::info!(team_id = %id, member_id = %member_id, "Member renamed");
    Ok(Json(json!({
        "success": true,
        "message": "Member updated successfully",
    })))
}
