use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::activity::log_activity;
use crate::deals::queries::touch_deal;
use crate::shared::schema::{comments, users};
use crate::shared::state::AppState;
use crate::shared::utils::non_empty;
use crate::users::User;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable)]
#[diesel(table_name = comments)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i32,
    pub deal_id: i32,
    pub user_id: i32,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = comments)]
struct NewComment {
    deal_id: i32,
    user_id: i32,
    content: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentWithUser {
    #[serde(flatten)]
    pub comment: Comment,
    pub user: User,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub user_id: i32,
    pub content: String,
}

pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path(deal_id): Path<i32>,
) -> Result<Json<Vec<CommentWithUser>>, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let rows = load_comments(&mut conn, deal_id)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?;

    Ok(Json(rows))
}

pub fn load_comments(conn: &mut PgConnection, deal_id: i32) -> QueryResult<Vec<CommentWithUser>> {
    let rows: Vec<(Comment, User)> = comments::table
        .inner_join(users::table)
        .filter(comments::deal_id.eq(deal_id))
        .order(comments::created_at.desc())
        .select((comments::all_columns, users::all_columns))
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|(comment, user)| CommentWithUser { comment, user })
        .collect())
}

/// Posting a comment also refreshes the parent deal's `last_updated`, which
/// keeps commented deals at the top of the recently-updated listing.
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    Path(deal_id): Path<i32>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), (StatusCode, String)> {
    non_empty("content", &req.content).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let comment: Comment = diesel::insert_into(comments::table)
        .values(NewComment {
            deal_id,
            user_id: req.user_id,
            content: req.content,
            created_at: Utc::now(),
        })
        .get_result(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Insert error: {e}")))?;

    if let Err(e) = log_activity(
        &mut conn,
        deal_id,
        req.user_id,
        "Added comment",
        json!({ "commentId": comment.id }),
    ) {
        warn!("failed to record activity for deal {deal_id}: {e}");
    }

    touch_deal(&mut conn, deal_id)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let deleted = diesel::delete(comments::table.find(id))
        .execute(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Delete error: {e}")))?;

    if deleted == 0 {
        return Err((StatusCode::NOT_FOUND, "Comment not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
