//! REST API router
//!
//! Combines the endpoints from all domain modules into a unified router
//! mounted under `/api`.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::shared::state::AppState;

pub fn configure_api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // ===== Users =====
        .route("/api/users", get(crate::users::list_users))
        // ===== Business Units =====
        .route(
            "/api/business-units",
            get(crate::business_units::list_business_units)
                .post(crate::business_units::create_business_unit),
        )
        .route(
            "/api/business-units/:id",
            put(crate::business_units::update_business_unit)
                .delete(crate::business_units::delete_business_unit),
        )
        // ===== Tags =====
        .route(
            "/api/tags",
            get(crate::tags::list_tags).post(crate::tags::create_tag),
        )
        .route(
            "/api/tags/:id",
            put(crate::tags::update_tag).delete(crate::tags::delete_tag),
        )
        // ===== Custom Fields =====
        .route(
            "/api/custom-fields",
            get(crate::custom_fields::list_custom_fields)
                .post(crate::custom_fields::create_custom_field),
        )
        .route(
            "/api/custom-fields/:id",
            put(crate::custom_fields::update_custom_field)
                .delete(crate::custom_fields::delete_custom_field),
        )
        // ===== Deals =====
        .route(
            "/api/deals",
            get(crate::deals::list_deals).post(crate::deals::create_deal),
        )
        .route(
            "/api/deals/:id",
            get(crate::deals::get_deal)
                .put(crate::deals::update_deal)
                .delete(crate::deals::delete_deal),
        )
        .route(
            "/api/deals/:id/tags/:tag_id",
            post(crate::deals::add_deal_tag).delete(crate::deals::remove_deal_tag),
        )
        // ===== Resources =====
        .route(
            "/api/deals/:id/resources",
            get(crate::resources::list_resources).post(crate::resources::create_resource),
        )
        .route(
            "/api/resources/:id",
            delete(crate::resources::delete_resource),
        )
        // ===== Comments =====
        .route(
            "/api/deals/:id/comments",
            get(crate::comments::list_comments).post(crate::comments::create_comment),
        )
        .route("/api/comments/:id", delete(crate::comments::delete_comment))
        // ===== AI Generation =====
        .route(
            "/api/deals/:id/generate-summary",
            post(crate::deals::generate_summary),
        )
        .route(
            "/api/deals/:id/generate-market-research",
            post(crate::deals::generate_market_research),
        )
        // ===== Dashboard & Activity =====
        .route(
            "/api/dashboard/stats",
            get(crate::dashboard::dashboard_stats),
        )
        .route("/api/activity", get(crate::activity::recent_activity))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Route registration panics on conflicting paths; building the router is
    // the assertion.
    #[test]
    fn full_route_surface_builds() {
        let _router = configure_api_routes();
    }
}
