pub mod activity;
pub mod api_router;
pub mod business_units;
pub mod comments;
pub mod config;
pub mod custom_fields;
pub mod dashboard;
pub mod deals;
pub mod llm;
pub mod resources;
pub mod shared;
pub mod tags;
pub mod users;
