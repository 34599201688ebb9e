use axum::{extract::State, Json};
use serde_json::{json, Value};
use team_core::search;

use crate::error::{AppError, AppResult};
use crate::models::team::*;
use crate::routes::{AppJson, AppPath, AppQuery};
use crate::AppState;

pub async fn list_teams(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> AppResult<Json<Vec<Team>>> {
    let needle = query.search.as_deref().and_then(search::normalize_query);
    let teams = state.store.list(needle.as_deref()).await?;

    tracing::debug!(count = teams.len(), search = ?needle, "Listed teams");
    Ok(Json(teams))
}

pub async fn create_team(
    State(state): State<AppState>,
    AppJson(body): AppJson<NewTeam>,
) -> AppResult<Json<Value>> {
    let id = state.store.create(body).await?;

    tracing::info!(team_id = %id, "Team created");
    Ok(Json(json!({
        "success": true,
        "id": id,
        "message": "Team created successfully",
    })))
}

pub async fn get_team(
    State(state): State<AppState>,
    AppPath(id): AppPath<String>,
) -> AppResult<Json<Team>> {
    let team = state
        .store
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Team not found".into()))?;

    Ok(Json(team))
}

pub async fn update_team(
    State(state): State<AppState>,
    AppPath(id): AppPath<String>,
    AppJson(body): AppJson<TeamPatch>,
) -> AppResult<Json<Value>> {
    if !state.store.replace(&id, body).await? {
        return Err(AppError::NotFound("Team not found".into()));
    }

    tracing::info!(team_id = %id, "Team updated");
    Ok(Json(json!({
        "success": true,
        "message": "Team updated successfully",
    })))
}

pub async fn delete_team(
    State(state): State<AppState>,
    AppPath(id): AppPath<String>,
) -> AppResult<Json<Value>> {
    if !state.store.delete(&id).await? {
        return Err(AppError::NotFound("Team not found".into()));
    }

    tracing::info!(team_id = %id, "Team deleted");
    Ok(Json(json!({
        "success": true,
        "message": "Team deleted successfully",
    })))
}

pub async fn bulk_delete(
    State(state): State<AppState>,
    AppJson(body): AppJson<BulkDeleteRequest>,
) -> AppResult<Json<Value>> {
    let ids = match body.ids {
        Some(ids) if !ids.is_empty() => ids,
        _ => return Err(AppError::BadRequest("Invalid team IDs".into())),
    };

    let deleted = state.store.delete_many(&ids).await?;

    tracing::info!(requested = ids.len(), deleted, "Teams bulk deleted");
    Ok(Json(json!({
        "success": true,
        "deletedCount": deleted,
        "message": format!("{deleted} team(s) deleted successfully"),
    })))
}

pub async fn reorder_teams(
    State(state): State<AppState>,
    AppJson(body): AppJson<ReorderRequest>,
) -> AppResult<Json<Value>> {
    let teams = body
        .teams
        .ok_or_else(|| AppError::BadRequest("Invalid request".into()))?;

    // A reference without an id still occupies its position.
    let ids: Vec<String> = teams
        .into_iter()
        .map(|team| team.id.unwrap_or_default())
        .collect();
    state.store.reorder(&ids).await?;

    tracing::info!(count = ids.len(), "Teams reordered");
    Ok(Json(json!({
        "success": true,
        "message": "Team order updated successfully",
    })))
}

pub async fn update_status(
    State(state): State<AppState>,
    AppPath(id): AppPath<String>,
    AppJson(body): AppJson<StatusPatchRequest>,
) -> AppResult<Json<Value>> {
    let (field, status) = match (body.field, body.status) {
        (Some(field), Some(status)) if !field.is_empty() && !status.is_empty() => (field, status),
        _ => return Err(AppError::BadRequest("Invalid request".into())),
    };
    let field: ApprovalField = field
        .parse()
        .map_err(|e: team_core::ParseError| AppError::BadRequest(e.to_string()))?;
    let status: ApprovalStatus = status
        .parse()
        .map_err(|e: team_core::ParseError| AppError::BadRequest(e.to_string()))?;

    if !state.store.set_status(&id, field, status).await? {
        return Err(AppError::NotFound("Team not found".into()));
    }

    tracing::info!(team_id = %id, %field, %status, "Approval status changed");
    Ok(Json(json!({
        "success": true,
        "message": "Team Status Saved",
    })))
}
