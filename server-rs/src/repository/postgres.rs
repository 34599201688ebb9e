use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use team_core::{
    assign_member_ids, ops, ApprovalField, ApprovalStatus, Member, NewTeam, Team, TeamPatch,
};

use super::TeamRepository;
use crate::error::{AppError, AppResult};

const COLUMNS: &str = "id, team_name, manager, director, members, manager_approval_status, \
     director_approval_status, sort_order, created_at, updated_at";

/// One row per team; the member roster is stored as a JSONB array of
/// `{_id, name}` documents so member edits stay single-row updates.
#[derive(Clone)]
pub struct PgTeamRepository {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct TeamRow {
    id: Uuid,
    team_name: String,
    manager: String,
    director: String,
    members: Json<Vec<Member>>,
    manager_approval_status: String,
    director_approval_status: String,
    sort_order: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TeamRow> for Team {
    type Error = AppError;

    fn try_from(row: TeamRow) -> Result<Self, Self::Error> {
        let status = |raw: &str| {
            raw.parse::<ApprovalStatus>()
                .map_err(|e| AppError::Internal(format!("team {}: {e}", row.id)))
        };
        Ok(Team {
            id: row.id.to_string(),
            manager_approval_status: status(&row.manager_approval_status)?,
            director_approval_status: status(&row.director_approval_status)?,
            team_name: row.team_name,
            manager: row.manager,
            director: row.director,
            members: row.members.0,
            order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl PgTeamRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Store ids are UUIDs; anything else can never match a row.
fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id).ok()
}

fn status_column(field: ApprovalField) -> &'static str {
    match field {
        ApprovalField::ManagerApprovalStatus => "manager_approval_status",
        ApprovalField::DirectorApprovalStatus => "director_approval_status",
    }
}

/// Escapes `ILIKE` wildcards so the needle matches literally.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl TeamRepository for PgTeamRepository {
    async fn list(&self, needle: Option<&str>) -> AppResult<Vec<Team>> {
        let sql = format!(
            r#"SELECT {COLUMNS} FROM teams
            WHERE $1::text IS NULL
                OR team_name ILIKE $1
                OR manager ILIKE $1
                OR director ILIKE $1
                OR EXISTS (
                    SELECT 1 FROM jsonb_array_elements(members) AS m
                    WHERE m->>'name' ILIKE $1
                )
            ORDER BY sort_order, created_at"#
        );
        let rows: Vec<TeamRow> = sqlx::query_as(&sql)
            .bind(needle.map(like_pattern))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Team::try_from).collect()
    }

    async fn create(&self, team: NewTeam) -> AppResult<String> {
        let mut members = team.members;
        assign_member_ids(&mut members);

        let id: Uuid = sqlx::query_scalar(
            r#"INSERT INTO teams (team_name, manager, director, members,
                manager_approval_status, director_approval_status, sort_order,
                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5,
                (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM teams), $6, $6)
            RETURNING id"#,
        )
        .bind(&team.team_name)
        .bind(&team.manager)
        .bind(&team.director)
        .bind(Json(&members))
        .bind(ApprovalStatus::Pending.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(id.to_string())
    }

    async fn get(&self, id: &str) -> AppResult<Option<Team>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let row: Option<TeamRow> = sqlx::query_as(&format!("SELECT {COLUMNS} FROM teams WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Team::try_from).transpose()
    }

    async fn replace(&self, id: &str, patch: TeamPatch) -> AppResult<bool> {
        let Some(id) = parse_id(id) else {
            return Ok(false);
        };
        let mut members = patch.members;
        if let Some(members) = members.as_mut() {
            assign_member_ids(members);
        }

        let result = sqlx::query(
            r#"UPDATE teams SET
                team_name = COALESCE($2, team_name),
                manager = COALESCE($3, manager),
                director = COALESCE($4, director),
                members = COALESCE($5, members),
                manager_approval_status = COALESCE($6, manager_approval_status),
                director_approval_status = COALESCE($7, director_approval_status),
                sort_order = COALESCE($8, sort_order),
                updated_at = $9
            WHERE id = $1"#,
        )
        .bind(id)
        .bind(patch.team_name)
        .bind(patch.manager)
        .bind(patch.director)
        .bind(members.map(Json))
        .bind(patch.manager_approval_status.map(ApprovalStatus::as_str))
        .bind(patch.director_approval_status.map(ApprovalStatus::as_str))
        .bind(patch.order)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let Some(id) = parse_id(id) else {
            return Ok(false);
        };
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(&self, ids: &[String]) -> AppResult<u64> {
        let ids: Vec<Uuid> = ids.iter().filter_map(|id| parse_id(id)).collect();
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM teams WHERE id = ANY($1)")
            .bind(&ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn set_status(
        &self,
        id: &str,
        field: ApprovalField,
        status: ApprovalStatus,
    ) -> AppResult<bool> {
        let Some(id) = parse_id(id) else {
            return Ok(false);
        };
        let sql = format!(
            "UPDATE teams SET {} = $2, updated_at = $3 WHERE id = $1",
            status_column(field)
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(status.as_str())
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn reorder(&self, ids: &[String]) -> AppResult<()> {
        let (ids, positions): (Vec<Uuid>, Vec<i64>) = ops::positions(ids)
            .into_iter()
            .filter_map(|(id, pos)| parse_id(&id).map(|id| (id, pos)))
            .unzip();
        if ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"UPDATE teams AS t SET sort_order = u.pos, updated_at = $3
            FROM UNNEST($1::uuid[], $2::bigint[]) AS u(id, pos)
            WHERE t.id = u.id"#,
        )
        .bind(&ids)
        .bind(&positions)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_member(&self, id: &str, member_id: &str) -> AppResult<bool> {
        let Some(id) = parse_id(id) else {
            return Ok(false);
        };
        let result = sqlx::query(
            r#"UPDATE teams SET
                members = COALESCE((
                    SELECT jsonb_agg(e.m ORDER BY e.i)
                    FROM jsonb_array_elements(members) WITH ORDINALITY AS e(m, i)
                    WHERE e.m->>'_id' IS DISTINCT FROM $2
                ), '[]'::jsonb),
                updated_at = $3
            WHERE id = $1"#,
        )
        .bind(id)
        .bind(member_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn rename_member(&self, id: &str, member_id: &str, name: &str) -> AppResult<bool> {
        let Some(id) = parse_id(id) else {
            return Ok(false);
        };
        let result = sqlx::query(
            r#"UPDATE teams SET
                members = (
                    SELECT jsonb_agg(
                        CASE WHEN e.m->>'_id' = $2
                            THEN jsonb_set(e.m, '{name}', to_jsonb($3::text))
                            ELSE e.m
                        END ORDER BY e.i)
                    FROM jsonb_array_elements(members) WITH ORDINALITY AS e(m, i)
                ),
                updated_at = $4
            WHERE id = $1
                AND EXISTS (
                    SELECT 1 FROM jsonb_array_elements(members) AS m
                    WHERE m->>'_id' = $2
                )"#,
        )
        .bind(id)
        .bind(member_id)
        .bind(name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> bool {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
