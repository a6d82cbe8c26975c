use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::shared::schema::business_units;
use crate::shared::state::AppState;
use crate::shared::utils::non_empty;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable)]
#[diesel(table_name = business_units)]
#[serde(rename_all = "camelCase")]
pub struct BusinessUnit {
    pub id: i32,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = business_units)]
struct NewBusinessUnit {
    name: String,
    color: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBusinessUnitRequest {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBusinessUnitRequest {
    pub name: Option<String>,
    pub color: Option<String>,
}

pub async fn list_business_units(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BusinessUnit>>, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let units: Vec<BusinessUnit> = business_units::table
        .order(business_units::id.asc())
        .load(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?;

    Ok(Json(units))
}

pub async fn create_business_unit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBusinessUnitRequest>,
) -> Result<(StatusCode, Json<BusinessUnit>), (StatusCode, String)> {
    non_empty("name", &req.name).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let unit: BusinessUnit = diesel::insert_into(business_units::table)
        .values(NewBusinessUnit {
            name: req.name,
            color: req.color,
        })
        .get_result(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Insert error: {e}")))?;

    Ok((StatusCode::CREATED, Json(unit)))
}

pub async fn update_business_unit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateBusinessUnitRequest>,
) -> Result<Json<BusinessUnit>, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let existing: Option<BusinessUnit> = business_units::table
        .find(id)
        .first(&mut conn)
        .optional()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?;
    if existing.is_none() {
        return Err((StatusCode::NOT_FOUND, "Business unit not found".to_string()));
    }

    if let Some(name) = req.name {
        non_empty("name", &name).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
        diesel::update(business_units::table.find(id))
            .set(business_units::name.eq(name))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }
    if let Some(color) = req.color {
        diesel::update(business_units::table.find(id))
            .set(business_units::color.eq(color))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }

    let unit: BusinessUnit = business_units::table
        .find(id)
        .first(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?;

    Ok(Json(unit))
}

pub async fn delete_business_unit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let deleted = diesel::delete(business_units::table.find(id))
        .execute(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Delete error: {e}")))?;

    if deleted == 0 {
        return Err((StatusCode::NOT_FOUND, "Business unit not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
