use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::activity::log_activity;
use crate::business_units::BusinessUnit;
use crate::comments::CommentWithUser;
use crate::llm;
use crate::llm::prompts::DealContext;
use crate::resources::Resource;
use crate::shared::schema::{business_units, deal_tags, deals};
use crate::shared::state::AppState;
use crate::shared::utils::non_empty;
use crate::tags::Tag;
use crate::users::User;

pub mod queries;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable)]
#[diesel(table_name = deals)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: i32,
    pub company: String,
    pub website: Option<String>,
    pub internal_contact: Option<String>,
    pub business_unit_id: Option<i32>,
    pub deal_type: String,
    pub investment_size: Option<i32>,
    pub use_case: Option<String>,
    pub lead_owner_id: Option<i32>,
    pub stage: String,
    pub notes: Option<String>,
    pub ai_summary: Option<String>,
    pub ai_market_report_link: Option<String>,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub custom_field_values: Option<Value>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = deals)]
struct NewDeal {
    company: String,
    website: Option<String>,
    internal_contact: Option<String>,
    business_unit_id: Option<i32>,
    deal_type: String,
    investment_size: Option<i32>,
    use_case: Option<String>,
    lead_owner_id: Option<i32>,
    stage: String,
    notes: Option<String>,
    custom_field_values: Option<Value>,
    last_updated: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable)]
#[diesel(table_name = deal_tags)]
#[serde(rename_all = "camelCase")]
pub struct DealTag {
    pub id: i32,
    pub deal_id: i32,
    pub tag_id: i32,
}

/// A deal with its relations resolved the way the UI consumes it. Business
/// unit and lead owner are absent when unset or dangling; comments are only
/// loaded for single-deal reads.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealWithRelations {
    #[serde(flatten)]
    pub deal: Deal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_unit: Option<BusinessUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_owner: Option<User>,
    pub tags: Vec<Tag>,
    pub resources: Vec<Resource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentWithUser>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDealRequest {
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_unit_id: Option<i32>,
    pub deal_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investment_size: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_case: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_owner_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_field_values: Option<Value>,
    #[serde(skip_serializing)]
    pub tag_ids: Option<Vec<i32>>,
    #[serde(skip_serializing)]
    pub user_id: Option<i32>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDealRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_unit_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investment_size: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_case: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_owner_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_field_values: Option<Value>,
    #[serde(skip_serializing)]
    pub tag_ids: Option<Vec<i32>>,
    #[serde(skip_serializing)]
    pub user_id: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSummaryRequest {
    pub user_id: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMarketResearchRequest {
    pub user_id: Option<i32>,
    pub industry: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub ai_summary: String,
}

#[derive(Debug, Serialize)]
pub struct MarketResearchResponse {
    pub report: ReportBody,
}

#[derive(Debug, Serialize)]
pub struct ReportBody {
    pub content: String,
}

/// Fields whose change invalidates the stored summary. Edits to anything
/// else (investment size, stage, lead owner, tags) keep the existing text.
pub fn touches_summary_context(req: &UpdateDealRequest) -> bool {
    req.notes.is_some()
        || req.company.is_some()
        || req.deal_type.is_some()
        || req.use_case.is_some()
        || req.business_unit_id.is_some()
}

fn has_notes(notes: &Option<String>) -> bool {
    notes.as_deref().is_some_and(|n| !n.trim().is_empty())
}

fn enriched_context(deal: &DealWithRelations) -> DealContext {
    DealContext {
        company: deal.deal.company.clone(),
        website: deal.deal.website.clone(),
        internal_contact: deal.deal.internal_contact.clone(),
        business_unit: deal.business_unit.as_ref().map(|b| b.name.clone()),
        deal_type: deal.deal.deal_type.clone(),
        investment_size: deal.deal.investment_size,
        use_case: deal.deal.use_case.clone(),
        notes: deal.deal.notes.clone(),
        tags: deal.tags.iter().map(|t| t.name.clone()).collect(),
        industry: None,
    }
}

// Context for a freshly created deal, before any enriched read exists. The
// lookups are best-effort: a failed resolution degrades the prompt, not the
// request.
fn creation_context(conn: &mut PgConnection, deal: &Deal) -> DealContext {
    let business_unit = deal.business_unit_id.and_then(|id| {
        business_units::table
            .find(id)
            .first::<BusinessUnit>(conn)
            .optional()
            .ok()
            .flatten()
            .map(|b| b.name)
    });
    let tags = queries::deal_tag_list(conn, deal.id)
        .unwrap_or_default()
        .into_iter()
        .map(|t| t.name)
        .collect();

    DealContext {
        company: deal.company.clone(),
        website: deal.website.clone(),
        internal_contact: deal.internal_contact.clone(),
        business_unit,
        deal_type: deal.deal_type.clone(),
        investment_size: deal.investment_size,
        use_case: deal.use_case.clone(),
        notes: deal.notes.clone(),
        tags,
        industry: None,
    }
}

pub async fn list_deals(
    State(state): State<Arc<AppState>>,
    Query(filters): Query<queries::DealFilters>,
) -> Result<Json<Vec<DealWithRelations>>, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let deals = queries::load_deals(&mut conn, &filters)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?;

    Ok(Json(deals))
}

pub async fn get_deal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<DealWithRelations>, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let deal = queries::load_deal(&mut conn, id)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Deal not found".to_string()))?;

    Ok(Json(deal))
}

pub async fn create_deal(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateDealRequest>,
) -> Result<(StatusCode, Json<Deal>), (StatusCode, String)> {
    non_empty("company", &req.company).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
    non_empty("dealType", &req.deal_type).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let now = Utc::now();
    let new_deal = NewDeal {
        company: req.company.clone(),
        website: req.website.clone(),
        internal_contact: req.internal_contact.clone(),
        business_unit_id: req.business_unit_id,
        deal_type: req.deal_type.clone(),
        investment_size: req.investment_size,
        use_case: req.use_case.clone(),
        lead_owner_id: req.lead_owner_id,
        stage: req
            .stage
            .clone()
            .unwrap_or_else(|| "Following".to_string()),
        notes: req.notes.clone(),
        custom_field_values: req.custom_field_values.clone(),
        last_updated: now,
        created_at: now,
    };

    // The row and its seed tag links land atomically; the activity log and
    // the summary stay best-effort follow-ups.
    let deal: Deal = conn
        .transaction(|conn| {
            let deal: Deal = diesel::insert_into(deals::table)
                .values(&new_deal)
                .get_result(conn)?;
            if let Some(tag_ids) = &req.tag_ids {
                for &tag_id in tag_ids {
                    queries::add_tag_to_deal(conn, deal.id, tag_id)?;
                }
            }
            Ok::<Deal, diesel::result::Error>(deal)
        })
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Insert error: {e}")))?;

    if let Some(user_id) = req.user_id {
        let details = json!({ "deal": serde_json::to_value(&req).unwrap_or(Value::Null) });
        if let Err(e) = log_activity(&mut conn, deal.id, user_id, "Created deal", details) {
            warn!("failed to record activity for deal {}: {e}", deal.id);
        }
    }

    if has_notes(&req.notes) {
        let ctx = creation_context(&mut conn, &deal);
        let summary = llm::generate_deal_summary(state.llm.as_ref(), &ctx).await;
        queries::store_summary(&mut conn, deal.id, &summary)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
        let deal: Deal = deals::table
            .find(deal.id)
            .first(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?;
        return Ok((StatusCode::CREATED, Json(deal)));
    }

    Ok((StatusCode::CREATED, Json(deal)))
}

pub async fn update_deal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateDealRequest>,
) -> Result<Json<Deal>, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let existing: Option<Deal> = deals::table
        .find(id)
        .first(&mut conn)
        .optional()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?;
    if existing.is_none() {
        return Err((StatusCode::NOT_FOUND, "Deal not found".to_string()));
    }

    if let Some(company) = &req.company {
        non_empty("company", company).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
    }
    if let Some(deal_type) = &req.deal_type {
        non_empty("dealType", deal_type).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
    }

    // Refreshed unconditionally: even a no-op update counts as touching the
    // deal.
    diesel::update(deals::table.find(id))
        .set(deals::last_updated.eq(Utc::now()))
        .execute(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;

    if let Some(company) = &req.company {
        diesel::update(deals::table.find(id))
            .set(deals::company.eq(company))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }
    if let Some(website) = &req.website {
        diesel::update(deals::table.find(id))
            .set(deals::website.eq(website))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }
    if let Some(internal_contact) = &req.internal_contact {
        diesel::update(deals::table.find(id))
            .set(deals::internal_contact.eq(internal_contact))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }
    if let Some(business_unit_id) = req.business_unit_id {
        diesel::update(deals::table.find(id))
            .set(deals::business_unit_id.eq(business_unit_id))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }
    if let Some(deal_type) = &req.deal_type {
        diesel::update(deals::table.find(id))
            .set(deals::deal_type.eq(deal_type))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }
    if let Some(investment_size) = req.investment_size {
        diesel::update(deals::table.find(id))
            .set(deals::investment_size.eq(investment_size))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }
    if let Some(use_case) = &req.use_case {
        diesel::update(deals::table.find(id))
            .set(deals::use_case.eq(use_case))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }
    if let Some(lead_owner_id) = req.lead_owner_id {
        diesel::update(deals::table.find(id))
            .set(deals::lead_owner_id.eq(lead_owner_id))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }
    if let Some(stage) = &req.stage {
        diesel::update(deals::table.find(id))
            .set(deals::stage.eq(stage))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }
    if let Some(notes) = &req.notes {
        diesel::update(deals::table.find(id))
            .set(deals::notes.eq(notes))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }
    if let Some(custom_field_values) = &req.custom_field_values {
        diesel::update(deals::table.find(id))
            .set(deals::custom_field_values.eq(custom_field_values))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }

    if let Some(tag_ids) = &req.tag_ids {
        queries::set_deal_tags(&mut conn, id, tag_ids)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }

    if let Some(user_id) = req.user_id {
        let details = json!({ "changes": serde_json::to_value(&req).unwrap_or(Value::Null) });
        if let Err(e) = log_activity(&mut conn, id, user_id, "Updated deal", details) {
            warn!("failed to record activity for deal {id}: {e}");
        }
    }

    if touches_summary_context(&req) {
        if let Some(enriched) = queries::load_deal(&mut conn, id)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?
        {
            let ctx = enriched_context(&enriched);
            let summary = llm::generate_deal_summary(state.llm.as_ref(), &ctx).await;
            queries::store_summary(&mut conn, id, &summary)
                .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
        }
    }

    let deal: Deal = deals::table
        .find(id)
        .first(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?;

    Ok(Json(deal))
}

pub async fn delete_deal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    // Cascades wipe tags, resources, comments, and the activity trail with
    // the row, so there is nothing durable to log here.
    let deleted = diesel::delete(deals::table.find(id))
        .execute(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Delete error: {e}")))?;

    if deleted == 0 {
        return Err((StatusCode::NOT_FOUND, "Deal not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_deal_tag(
    State(state): State<Arc<AppState>>,
    Path((deal_id, tag_id)): Path<(i32, i32)>,
) -> Result<(StatusCode, Json<DealTag>), (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let link = queries::add_tag_to_deal(&mut conn, deal_id, tag_id)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Insert error: {e}")))?;

    Ok((StatusCode::CREATED, Json(link)))
}

pub async fn remove_deal_tag(
    State(state): State<Arc<AppState>>,
    Path((deal_id, tag_id)): Path<(i32, i32)>,
) -> Result<StatusCode, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let removed = queries::remove_tag_from_deal(&mut conn, deal_id, tag_id)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Delete error: {e}")))?;

    if !removed {
        return Err((StatusCode::NOT_FOUND, "Deal tag not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn generate_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    body: Option<Json<GenerateSummaryRequest>>,
) -> Result<Json<SummaryResponse>, (StatusCode, String)> {
    let req = body.map(|Json(b)| b).unwrap_or_default();

    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let enriched = queries::load_deal(&mut conn, id)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Deal not found".to_string()))?;

    let ctx = enriched_context(&enriched);
    let summary = llm::generate_deal_summary(state.llm.as_ref(), &ctx).await;
    queries::store_summary(&mut conn, id, &summary)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;

    if let Some(user_id) = req.user_id {
        if let Err(e) = log_activity(&mut conn, id, user_id, "Generated AI summary", json!({})) {
            warn!("failed to record activity for deal {id}: {e}");
        }
    }

    Ok(Json(SummaryResponse {
        ai_summary: summary,
    }))
}

pub async fn generate_market_research(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    body: Option<Json<GenerateMarketResearchRequest>>,
) -> Result<Json<MarketResearchResponse>, (StatusCode, String)> {
    let req = body.map(|Json(b)| b).unwrap_or_default();

    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let enriched = queries::load_deal(&mut conn, id)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Deal not found".to_string()))?;

    let mut ctx = enriched_context(&enriched);
    ctx.industry = req.industry.clone();

    let content = llm::generate_market_research(state.llm.as_ref(), &ctx).await;

    // Only a pointer is persisted; the report body goes back to the caller.
    let link = format!("Generated Market Report: {}", enriched.deal.company);
    queries::store_market_report_link(&mut conn, id, &link)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;

    if let Some(user_id) = req.user_id {
        if let Err(e) = log_activity(&mut conn, id, user_id, "Generated market research", json!({}))
        {
            warn!("failed to record activity for deal {id}: {e}");
        }
    }

    Ok(Json(MarketResearchResponse {
        report: ReportBody { content },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn company_change_alone_invalidates_the_summary() {
        let req = UpdateDealRequest {
            company: Some("Acme".to_string()),
            ..Default::default()
        };
        assert!(touches_summary_context(&req));
    }

    #[test]
    fn investment_size_change_alone_keeps_the_summary() {
        let req = UpdateDealRequest {
            investment_size: Some(250_000),
            ..Default::default()
        };
        assert!(!touches_summary_context(&req));
    }

    #[test]
    fn tag_and_owner_changes_keep_the_summary() {
        let req = UpdateDealRequest {
            tag_ids: Some(vec![1, 2]),
            lead_owner_id: Some(4),
            stage: Some("Negotiation".to_string()),
            user_id: Some(1),
            ..Default::default()
        };
        assert!(!touches_summary_context(&req));
    }

    #[test]
    fn notes_and_unit_changes_invalidate_the_summary() {
        for req in [
            UpdateDealRequest {
                notes: Some("updated".to_string()),
                ..Default::default()
            },
            UpdateDealRequest {
                business_unit_id: Some(2),
                ..Default::default()
            },
            UpdateDealRequest {
                use_case: Some("logistics".to_string()),
                ..Default::default()
            },
            UpdateDealRequest {
                deal_type: Some("Partnership".to_string()),
                ..Default::default()
            },
        ] {
            assert!(touches_summary_context(&req));
        }
    }

    #[test]
    fn blank_notes_do_not_trigger_creation_summary() {
        assert!(!has_notes(&None));
        assert!(!has_notes(&Some("   ".to_string())));
        assert!(has_notes(&Some("Met at conference".to_string())));
    }

    #[test]
    fn create_request_parses_camel_case_payloads() {
        let req: CreateDealRequest = serde_json::from_str(
            r#"{
                "company": "Acme",
                "dealType": "Vendor",
                "businessUnitId": 3,
                "investmentSize": 500000,
                "tagIds": [1, 2],
                "userId": 9
            }"#,
        )
        .expect("payload should parse");
        assert_eq!(req.company, "Acme");
        assert_eq!(req.business_unit_id, Some(3));
        assert_eq!(req.tag_ids, Some(vec![1, 2]));
        assert_eq!(req.user_id, Some(9));
    }

    #[test]
    fn audit_serialization_drops_control_keys() {
        let req: CreateDealRequest = serde_json::from_str(
            r#"{"company": "Acme", "dealType": "Vendor", "tagIds": [1], "userId": 9}"#,
        )
        .expect("payload should parse");
        let value = serde_json::to_value(&req).expect("request should serialize");
        assert!(value.get("tagIds").is_none());
        assert!(value.get("userId").is_none());
        assert!(value.get("website").is_none());
        assert_eq!(value["company"], "Acme");
    }

    #[test]
    fn deal_with_relations_flattens_and_omits_absent_relations() {
        let deal = Deal {
            id: 1,
            company: "Acme".to_string(),
            website: None,
            internal_contact: None,
            business_unit_id: None,
            deal_type: "Vendor".to_string(),
            investment_size: Some(100_000),
            use_case: None,
            lead_owner_id: None,
            stage: "Following".to_string(),
            notes: None,
            ai_summary: None,
            ai_market_report_link: None,
            last_updated: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
            custom_field_values: None,
        };
        let enriched = DealWithRelations {
            deal,
            business_unit: None,
            lead_owner: None,
            tags: vec![],
            resources: vec![],
            comments: None,
        };
        let value = serde_json::to_value(&enriched).expect("deal should serialize");
        assert_eq!(value["company"], "Acme");
        assert_eq!(value["investmentSize"], 100_000);
        assert!(value.get("businessUnit").is_none());
        assert!(value.get("leadOwner").is_none());
        assert!(value.get("comments").is_none());
        assert!(value["tags"].as_array().is_some_and(|t| t.is_empty()));
    }
}
