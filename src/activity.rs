use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::deals::Deal;
use crate::shared::schema::{activity_logs, deals, users};
use crate::shared::state::AppState;
use crate::users::User;

/// Append-only audit trail entry. No endpoint updates or deletes these rows;
/// they disappear only with their parent deal's cascade.
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable)]
#[diesel(table_name = activity_logs)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: i32,
    pub deal_id: i32,
    pub user_id: i32,
    pub action: String,
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = activity_logs)]
struct NewActivityLog {
    deal_id: i32,
    user_id: i32,
    action: String,
    details: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityWithRelations {
    #[serde(flatten)]
    pub activity: ActivityLog,
    pub deal: Deal,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
}

pub fn log_activity(
    conn: &mut PgConnection,
    deal_id: i32,
    user_id: i32,
    action: &str,
    details: serde_json::Value,
) -> QueryResult<ActivityLog> {
    diesel::insert_into(activity_logs::table)
        .values(NewActivityLog {
            deal_id,
            user_id,
            action: action.to_string(),
            details: Some(details),
            created_at: Utc::now(),
        })
        .get_result(conn)
}

pub async fn recent_activity(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<ActivityWithRelations>>, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let limit = query.limit.unwrap_or(10);

    let rows: Vec<(ActivityLog, Deal, User)> = activity_logs::table
        .inner_join(deals::table)
        .inner_join(users::table)
        .order(activity_logs::created_at.desc())
        .limit(limit)
        .select((
            activity_logs::all_columns,
            deals::all_columns,
            users::all_columns,
        ))
        .load(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?;

    let activity = rows
        .into_iter()
        .map(|(activity, deal, user)| ActivityWithRelations {
            activity,
            deal,
            user,
        })
        .collect();

    Ok(Json(activity))
}
