use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::shared::schema::custom_fields;
use crate::shared::state::AppState;
use crate::shared::utils::non_empty;

/// Admin-defined schema extension. Deal-level values live unstructured on the
/// deal row and are not validated against this definition at write time.
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable)]
#[diesel(table_name = custom_fields)]
#[serde(rename_all = "camelCase")]
pub struct CustomField {
    pub id: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub required: bool,
    pub options: Option<serde_json::Value>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = custom_fields)]
struct NewCustomField {
    name: String,
    field_type: String,
    required: bool,
    options: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomFieldRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub required: Option<bool>,
    pub options: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomFieldRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub required: Option<bool>,
    pub options: Option<serde_json::Value>,
}

pub async fn list_custom_fields(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CustomField>>, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let rows: Vec<CustomField> = custom_fields::table
        .order(custom_fields::id.asc())
        .load(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?;

    Ok(Json(rows))
}

pub async fn create_custom_field(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCustomFieldRequest>,
) -> Result<(StatusCode, Json<CustomField>), (StatusCode, String)> {
    non_empty("name", &req.name).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
    non_empty("type", &req.field_type).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let field: CustomField = diesel::insert_into(custom_fields::table)
        .values(NewCustomField {
            name: req.name,
            field_type: req.field_type,
            required: req.required.unwrap_or(false),
            options: req.options,
        })
        .get_result(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Insert error: {e}")))?;

    Ok((StatusCode::CREATED, Json(field)))
}

pub async fn update_custom_field(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateCustomFieldRequest>,
) -> Result<Json<CustomField>, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let existing: Option<CustomField> = custom_fields::table
        .find(id)
        .first(&mut conn)
        .optional()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?;
    if existing.is_none() {
        return Err((StatusCode::NOT_FOUND, "Custom field not found".to_string()));
    }

    if let Some(name) = req.name {
        non_empty("name", &name).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
        diesel::update(custom_fields::table.find(id))
            .set(custom_fields::name.eq(name))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }
    if let Some(field_type) = req.field_type {
        diesel::update(custom_fields::table.find(id))
            .set(custom_fields::field_type.eq(field_type))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }
    if let Some(required) = req.required {
        diesel::update(custom_fields::table.find(id))
            .set(custom_fields::required.eq(required))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }
    if let Some(options) = req.options {
        diesel::update(custom_fields::table.find(id))
            .set(custom_fields::options.eq(options))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }

    let field: CustomField = custom_fields::table
        .find(id)
        .first(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?;

    Ok(Json(field))
}

pub async fn delete_custom_field(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let deleted = diesel::delete(custom_fields::table.find(id))
        .execute(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Delete error: {e}")))?;

    if deleted == 0 {
        return Err((StatusCode::NOT_FOUND, "Custom field not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
