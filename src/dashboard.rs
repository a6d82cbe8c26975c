use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Datelike, NaiveTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;

use crate::shared::schema::deals;
use crate::shared::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_deals: i64,
    pub active_negotiations: i64,
    pub total_investment: i64,
    pub closed_this_month: i64,
}

/// UTC midnight on the first day of `now`'s month.
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let first = now
        .date_naive()
        .with_day(1)
        .unwrap_or_else(|| now.date_naive());
    DateTime::from_naive_utc_and_offset(first.and_time(NaiveTime::MIN), Utc)
}

pub async fn dashboard_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardStats>, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let total_deals: i64 = deals::table
        .count()
        .get_result(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?;

    let active_negotiations: i64 = deals::table
        .filter(deals::stage.eq("Negotiation"))
        .count()
        .get_result(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?;

    let total_investment: Option<i64> = deals::table
        .filter(deals::investment_size.is_not_null())
        .select(diesel::dsl::sum(deals::investment_size))
        .first(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?;

    let closed_this_month: i64 = deals::table
        .filter(deals::stage.eq("Closed Won"))
        .filter(deals::last_updated.ge(month_start(Utc::now())))
        .count()
        .get_result(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?;

    Ok(Json(DashboardStats {
        total_deals,
        active_negotiations,
        total_investment: total_investment.unwrap_or(0),
        closed_this_month,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn month_start_truncates_to_first_day_midnight() {
        let mid_month = Utc.with_ymd_and_hms(2025, 6, 17, 14, 30, 45).unwrap();
        let start = month_start(mid_month);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn month_start_is_idempotent_on_the_first() {
        let first = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        assert_eq!(month_start(first), first);
    }

    #[test]
    fn stats_shape_serializes_with_camel_case_keys() {
        let stats = DashboardStats {
            total_deals: 0,
            active_negotiations: 0,
            total_investment: 0,
            closed_this_month: 0,
        };
        let value = serde_json::to_value(&stats).expect("stats should serialize");
        assert_eq!(value["totalDeals"], 0);
        assert_eq!(value["activeNegotiations"], 0);
        assert_eq!(value["totalInvestment"], 0);
        assert_eq!(value["closedThisMonth"], 0);
    }
}
