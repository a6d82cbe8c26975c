//! Deal listing, relation assembly, and tag-link maintenance.
//!
//! Filter composition follows the boxed-query pattern: every supplied filter
//! ANDs another predicate onto the statement, and the stage filter expands
//! the "active"/"closed" pseudo-values into membership tests against the
//! closed-stage set.

use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;

use crate::business_units::BusinessUnit;
use crate::comments::load_comments;
use crate::resources::Resource;
use crate::shared::schema::{business_units, deal_tags, deals, resources, tags, users};
use crate::tags::Tag;
use crate::users::User;

use super::{Deal, DealTag, DealWithRelations};

/// Stored stage values treated as terminal. Everything else counts as active.
pub const CLOSED_STAGES: [&str; 2] = ["Closed Won", "Closed Lost"];

pub fn stage_is_closed(stage: &str) -> bool {
    CLOSED_STAGES.contains(&stage)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealFilters {
    pub lead_owner_id: Option<i32>,
    pub business_unit_id: Option<i32>,
    pub stage: Option<String>,
    pub deal_type: Option<String>,
    pub search: Option<String>,
}

impl DealFilters {
    // Blank query-string values mean "no constraint", same as an absent key.
    fn stage_filter(&self) -> Option<&str> {
        normalized(&self.stage)
    }

    fn deal_type_filter(&self) -> Option<&str> {
        normalized(&self.deal_type)
    }

    fn search_filter(&self) -> Option<&str> {
        normalized(&self.search)
    }
}

fn normalized(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

type DealRow = (Deal, Option<BusinessUnit>, Option<User>);

pub fn load_deals(
    conn: &mut PgConnection,
    filters: &DealFilters,
) -> QueryResult<Vec<DealWithRelations>> {
    let mut query = deals::table
        .left_join(business_units::table)
        .left_join(users::table)
        .select((
            deals::all_columns,
            business_units::all_columns.nullable(),
            users::all_columns.nullable(),
        ))
        .into_boxed();

    if let Some(owner) = filters.lead_owner_id {
        query = query.filter(deals::lead_owner_id.eq(owner));
    }
    if let Some(unit) = filters.business_unit_id {
        query = query.filter(deals::business_unit_id.eq(unit));
    }
    if let Some(stage) = filters.stage_filter() {
        match stage {
            "active" => query = query.filter(deals::stage.ne_all(CLOSED_STAGES)),
            "closed" => query = query.filter(deals::stage.eq_any(CLOSED_STAGES)),
            exact => query = query.filter(deals::stage.eq(exact.to_string())),
        }
    }
    if let Some(deal_type) = filters.deal_type_filter() {
        query = query.filter(deals::deal_type.eq(deal_type.to_string()));
    }
    if let Some(term) = filters.search_filter() {
        let pattern = format!("%{term}%");
        query = query.filter(
            deals::company
                .ilike(pattern.clone())
                .nullable()
                .or(deals::stage.ilike(pattern.clone()).nullable())
                .or(deals::deal_type.ilike(pattern.clone()).nullable())
                .or(deals::notes.ilike(pattern.clone()))
                .or(deals::use_case.ilike(pattern.clone()))
                .or(deals::internal_contact.ilike(pattern)),
        );
    }

    let rows: Vec<DealRow> = query
        .order((deals::last_updated.desc(), deals::id.desc()))
        .load(conn)?;

    let mut enriched = Vec::with_capacity(rows.len());
    for (deal, business_unit, lead_owner) in rows {
        let tags = deal_tag_list(conn, deal.id)?;
        let resources = deal_resources(conn, deal.id)?;
        enriched.push(DealWithRelations {
            deal,
            business_unit,
            lead_owner,
            tags,
            resources,
            comments: None,
        });
    }

    Ok(enriched)
}

pub fn load_deal(conn: &mut PgConnection, id: i32) -> QueryResult<Option<DealWithRelations>> {
    let row: Option<DealRow> = deals::table
        .left_join(business_units::table)
        .left_join(users::table)
        .filter(deals::id.eq(id))
        .select((
            deals::all_columns,
            business_units::all_columns.nullable(),
            users::all_columns.nullable(),
        ))
        .first(conn)
        .optional()?;

    let Some((deal, business_unit, lead_owner)) = row else {
        return Ok(None);
    };

    let tags = deal_tag_list(conn, deal.id)?;
    let resources = deal_resources(conn, deal.id)?;
    let comments = load_comments(conn, deal.id)?;

    Ok(Some(DealWithRelations {
        deal,
        business_unit,
        lead_owner,
        tags,
        resources,
        comments: Some(comments),
    }))
}

pub fn deal_tag_list(conn: &mut PgConnection, deal_id: i32) -> QueryResult<Vec<Tag>> {
    deal_tags::table
        .inner_join(tags::table)
        .filter(deal_tags::deal_id.eq(deal_id))
        .select(tags::all_columns)
        .load(conn)
}

pub fn deal_resources(conn: &mut PgConnection, deal_id: i32) -> QueryResult<Vec<Resource>> {
    resources::table
        .filter(resources::deal_id.eq(deal_id))
        .load(conn)
}

/// Link a tag to a deal. The junction table carries a uniqueness constraint
/// on (deal_id, tag_id), so linking twice leaves exactly one row and returns
/// the existing one.
pub fn add_tag_to_deal(conn: &mut PgConnection, deal_id: i32, tag_id: i32) -> QueryResult<DealTag> {
    diesel::insert_into(deal_tags::table)
        .values((deal_tags::deal_id.eq(deal_id), deal_tags::tag_id.eq(tag_id)))
        .on_conflict((deal_tags::deal_id, deal_tags::tag_id))
        .do_nothing()
        .execute(conn)?;

    deal_tags::table
        .filter(deal_tags::deal_id.eq(deal_id))
        .filter(deal_tags::tag_id.eq(tag_id))
        .first(conn)
}

/// Returns whether a link existed.
pub fn remove_tag_from_deal(
    conn: &mut PgConnection,
    deal_id: i32,
    tag_id: i32,
) -> QueryResult<bool> {
    let deleted = diesel::delete(
        deal_tags::table
            .filter(deal_tags::deal_id.eq(deal_id))
            .filter(deal_tags::tag_id.eq(tag_id)),
    )
    .execute(conn)?;
    Ok(deleted > 0)
}

/// Full-replace semantics for a deal's tag set: links absent from `desired`
/// are removed, new ones are added, existing ones are left untouched.
pub fn set_deal_tags(conn: &mut PgConnection, deal_id: i32, desired: &[i32]) -> QueryResult<()> {
    let current: Vec<i32> = deal_tags::table
        .filter(deal_tags::deal_id.eq(deal_id))
        .select(deal_tags::tag_id)
        .load(conn)?;

    for tag_id in &current {
        if !desired.contains(tag_id) {
            remove_tag_from_deal(conn, deal_id, *tag_id)?;
        }
    }
    for tag_id in desired {
        if !current.contains(tag_id) {
            add_tag_to_deal(conn, deal_id, *tag_id)?;
        }
    }
    Ok(())
}

/// Refresh `last_updated` without changing any visible field.
pub fn touch_deal(conn: &mut PgConnection, deal_id: i32) -> QueryResult<usize> {
    diesel::update(deals::table.find(deal_id))
        .set(deals::last_updated.eq(Utc::now()))
        .execute(conn)
}

pub fn store_summary(conn: &mut PgConnection, deal_id: i32, summary: &str) -> QueryResult<usize> {
    diesel::update(deals::table.find(deal_id))
        .set((
            deals::ai_summary.eq(summary),
            deals::last_updated.eq(Utc::now()),
        ))
        .execute(conn)
}

pub fn store_market_report_link(
    conn: &mut PgConnection,
    deal_id: i32,
    link: &str,
) -> QueryResult<usize> {
    diesel::update(deals::table.find(deal_id))
        .set((
            deals::ai_market_report_link.eq(link),
            deals::last_updated.eq(Utc::now()),
        ))
        .execute(conn)
}
