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
use crate::shared::schema::resources;
use crate::shared::state::AppState;
use crate::shared::utils::non_empty;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable)]
#[diesel(table_name = resources)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: i32,
    pub deal_id: i32,
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = resources)]
struct NewResource {
    deal_id: i32,
    name: String,
    url: String,
    resource_type: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourceRequest {
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(skip_serializing)]
    pub user_id: Option<i32>,
}

pub async fn list_resources(
    State(state): State<Arc<AppState>>,
    Path(deal_id): Path<i32>,
) -> Result<Json<Vec<Resource>>, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let rows: Vec<Resource> = resources::table
        .filter(resources::deal_id.eq(deal_id))
        .load(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?;

    Ok(Json(rows))
}

pub async fn create_resource(
    State(state): State<Arc<AppState>>,
    Path(deal_id): Path<i32>,
    Json(req): Json<CreateResourceRequest>,
) -> Result<(StatusCode, Json<Resource>), (StatusCode, String)> {
    non_empty("name", &req.name).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
    non_empty("url", &req.url).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
    non_empty("type", &req.resource_type).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let resource: Resource = diesel::insert_into(resources::table)
        .values(NewResource {
            deal_id,
            name: req.name.clone(),
            url: req.url.clone(),
            resource_type: req.resource_type.clone(),
            created_at: Utc::now(),
        })
        .get_result(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Insert error: {e}")))?;

    if let Some(user_id) = req.user_id {
        let details = json!({ "resource": serde_json::to_value(&req).unwrap_or(serde_json::Value::Null) });
        if let Err(e) = log_activity(&mut conn, deal_id, user_id, "Added resource", details) {
            warn!("failed to record activity for deal {deal_id}: {e}");
        }
    }

    Ok((StatusCode::CREATED, Json(resource)))
}

pub async fn delete_resource(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let deleted = diesel::delete(resources::table.find(id))
        .execute(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Delete error: {e}")))?;

    if deleted == 0 {
        return Err((StatusCode::NOT_FOUND, "Resource not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
