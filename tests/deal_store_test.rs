//! Store-level integration tests. They need a throwaway Postgres database
//! and skip silently when TEST_DATABASE_URL is not set.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};

use dealserver::activity::log_activity;
use dealserver::deals::queries::{
    add_tag_to_deal, load_deal, load_deals, remove_tag_from_deal, touch_deal, DealFilters,
};
use dealserver::shared::schema::{
    activity_logs, business_units, comments, deal_tags, deals, resources, tags, users,
};
use dealserver::shared::utils::{run_migrations, DbPool};

fn test_pool() -> Option<DbPool> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let manager = ConnectionManager::<PgConnection>::new(url);
    let pool = Pool::builder().max_size(2).build(manager).ok()?;
    run_migrations(&pool).ok()?;
    Some(pool)
}

fn unique(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{prefix}-{nanos}")
}

fn insert_deal(conn: &mut PgConnection, company: &str, stage: &str) -> i32 {
    diesel::insert_into(deals::table)
        .values((
            deals::company.eq(company),
            deals::deal_type.eq("Vendor"),
            deals::stage.eq(stage),
            deals::last_updated.eq(Utc::now()),
            deals::created_at.eq(Utc::now()),
        ))
        .returning(deals::id)
        .get_result(conn)
        .expect("insert deal")
}

fn insert_tag(conn: &mut PgConnection) -> i32 {
    diesel::insert_into(tags::table)
        .values(tags::name.eq(unique("vip")))
        .returning(tags::id)
        .get_result(conn)
        .expect("insert tag")
}

fn insert_user(conn: &mut PgConnection) -> i32 {
    diesel::insert_into(users::table)
        .values((
            users::username.eq(unique("user")),
            users::password.eq("pw"),
            users::full_name.eq("Test User"),
            users::email.eq("test@example.com"),
            users::role.eq("bizdev"),
            users::created_at.eq(Utc::now()),
        ))
        .returning(users::id)
        .get_result(conn)
        .expect("insert user")
}

#[test]
fn linking_a_tag_twice_leaves_one_junction_row() {
    let Some(pool) = test_pool() else {
        eprintln!("skipping: TEST_DATABASE_URL not set");
        return;
    };
    let mut conn = pool.get().expect("pool connection");

    let deal_id = insert_deal(&mut conn, &unique("Acme"), "Following");
    let tag_id = insert_tag(&mut conn);

    let first = add_tag_to_deal(&mut conn, deal_id, tag_id).expect("first link");
    let second = add_tag_to_deal(&mut conn, deal_id, tag_id).expect("second link");
    assert_eq!(first.id, second.id);

    let count: i64 = deal_tags::table
        .filter(deal_tags::deal_id.eq(deal_id))
        .count()
        .get_result(&mut conn)
        .expect("count links");
    assert_eq!(count, 1);

    assert!(remove_tag_from_deal(&mut conn, deal_id, tag_id).expect("unlink"));
    assert!(!remove_tag_from_deal(&mut conn, deal_id, tag_id).expect("second unlink"));
}

#[test]
fn deleting_a_deal_cascades_to_owned_rows() {
    let Some(pool) = test_pool() else {
        eprintln!("skipping: TEST_DATABASE_URL not set");
        return;
    };
    let mut conn = pool.get().expect("pool connection");

    let user_id = insert_user(&mut conn);
    let deal_id = insert_deal(&mut conn, &unique("CascadeCo"), "Discovery");
    let tag_id = insert_tag(&mut conn);
    add_tag_to_deal(&mut conn, deal_id, tag_id).expect("link tag");

    diesel::insert_into(resources::table)
        .values((
            resources::deal_id.eq(deal_id),
            resources::name.eq("Pitch deck"),
            resources::url.eq("https://example.com/deck.pdf"),
            resources::resource_type.eq("link"),
            resources::created_at.eq(Utc::now()),
        ))
        .execute(&mut conn)
        .expect("insert resource");

    diesel::insert_into(comments::table)
        .values((
            comments::deal_id.eq(deal_id),
            comments::user_id.eq(user_id),
            comments::content.eq("looks promising"),
            comments::created_at.eq(Utc::now()),
        ))
        .execute(&mut conn)
        .expect("insert comment");

    log_activity(
        &mut conn,
        deal_id,
        user_id,
        "Created deal",
        serde_json::json!({}),
    )
    .expect("log activity");

    let deleted = diesel::delete(deals::table.find(deal_id))
        .execute(&mut conn)
        .expect("delete deal");
    assert_eq!(deleted, 1);

    let links: i64 = deal_tags::table
        .filter(deal_tags::deal_id.eq(deal_id))
        .count()
        .get_result(&mut conn)
        .expect("count links");
    let res: i64 = resources::table
        .filter(resources::deal_id.eq(deal_id))
        .count()
        .get_result(&mut conn)
        .expect("count resources");
    let comm: i64 = comments::table
        .filter(comments::deal_id.eq(deal_id))
        .count()
        .get_result(&mut conn)
        .expect("count comments");
    let acts: i64 = activity_logs::table
        .filter(activity_logs::deal_id.eq(deal_id))
        .count()
        .get_result(&mut conn)
        .expect("count activity");
    assert_eq!((links, res, comm, acts), (0, 0, 0, 0));

    assert!(load_deal(&mut conn, deal_id)
        .expect("load deleted deal")
        .is_none());
}

#[test]
fn active_and_closed_filters_partition_deals() {
    let Some(pool) = test_pool() else {
        eprintln!("skipping: TEST_DATABASE_URL not set");
        return;
    };
    let mut conn = pool.get().expect("pool connection");

    let marker = unique("PartitionCo");
    insert_deal(&mut conn, &format!("{marker} one"), "Negotiation");
    insert_deal(&mut conn, &format!("{marker} two"), "Closed Won");
    insert_deal(&mut conn, &format!("{marker} three"), "Closed Lost");

    let all = load_deals(
        &mut conn,
        &DealFilters {
            search: Some(marker.clone()),
            ..Default::default()
        },
    )
    .expect("load all");
    assert_eq!(all.len(), 3);

    let active = load_deals(
        &mut conn,
        &DealFilters {
            search: Some(marker.clone()),
            stage: Some("active".to_string()),
            ..Default::default()
        },
    )
    .expect("load active");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].deal.stage, "Negotiation");

    let closed = load_deals(
        &mut conn,
        &DealFilters {
            search: Some(marker.clone()),
            stage: Some("closed".to_string()),
            ..Default::default()
        },
    )
    .expect("load closed");
    assert_eq!(closed.len(), 2);
    assert!(closed
        .iter()
        .all(|d| d.deal.stage == "Closed Won" || d.deal.stage == "Closed Lost"));

    let exact = load_deals(
        &mut conn,
        &DealFilters {
            search: Some(marker.clone()),
            stage: Some("Closed Won".to_string()),
            ..Default::default()
        },
    )
    .expect("load exact stage");
    assert_eq!(exact.len(), 1);
}

#[test]
fn single_deal_read_resolves_business_unit() {
    let Some(pool) = test_pool() else {
        eprintln!("skipping: TEST_DATABASE_URL not set");
        return;
    };
    let mut conn = pool.get().expect("pool connection");

    let unit_name = unique("Eng");
    let unit_id: i32 = diesel::insert_into(business_units::table)
        .values((
            business_units::name.eq(&unit_name),
            business_units::color.eq("#000"),
        ))
        .returning(business_units::id)
        .get_result(&mut conn)
        .expect("insert unit");

    let deal_id: i32 = diesel::insert_into(deals::table)
        .values((
            deals::company.eq(unique("Acme")),
            deals::deal_type.eq("Vendor"),
            deals::stage.eq("Following"),
            deals::business_unit_id.eq(unit_id),
            deals::last_updated.eq(Utc::now()),
            deals::created_at.eq(Utc::now()),
        ))
        .returning(deals::id)
        .get_result(&mut conn)
        .expect("insert deal");

    let loaded = load_deal(&mut conn, deal_id)
        .expect("load deal")
        .expect("deal exists");
    assert_eq!(
        loaded.business_unit.as_ref().map(|b| b.name.as_str()),
        Some(unit_name.as_str())
    );
    assert!(loaded.comments.is_some());
}

#[test]
fn touch_deal_advances_last_updated() {
    let Some(pool) = test_pool() else {
        eprintln!("skipping: TEST_DATABASE_URL not set");
        return;
    };
    let mut conn = pool.get().expect("pool connection");

    let deal_id = insert_deal(&mut conn, &unique("TouchCo"), "Following");
    let before: DateTime<Utc> = deals::table
        .find(deal_id)
        .select(deals::last_updated)
        .first(&mut conn)
        .expect("read timestamp");

    touch_deal(&mut conn, deal_id).expect("touch");

    let after: DateTime<Utc> = deals::table
        .find(deal_id)
        .select(deals::last_updated)
        .first(&mut conn)
        .expect("read timestamp");
    assert!(after >= before);
}
