//! API module
//!
//! Contains HTTP request handlers for the booking endpoints and assembles them
//! into a router.

pub mod activity;
pub mod event;
pub mod extract;
pub mod form;
pub mod person;

use crate::storage::BookingDb;
use crate::views;
use axum::{
    routing::{get, MethodRouter},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

/// Storage handle shared by every handler
pub type SharedDb = Arc<BookingDb>;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// GET /api/health - Liveness check
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build the full application router (JSON API and HTML views)
pub fn router(db: SharedDb) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .merge(entity_routes(
            "/api/person",
            get(person::list_people)
                .post(person::create_person)
                .delete(person::delete_person),
            get(person::get_person).delete(person::delete_person_by_id),
        ))
        .merge(entity_routes(
            "/api/activity",
            get(activity::list_activities)
                .post(activity::create_activity)
                .delete(activity::delete_activity),
            get(activity::get_activity).delete(activity::delete_activity_by_id),
        ))
        .merge(entity_routes(
            "/api/event",
            get(event::list_events)
                .post(event::create_event)
                .delete(event::delete_event),
            get(event::get_event)
                .put(event::update_event)
                .delete(event::delete_event_by_id),
        ))
        .merge(views::routes())
        .with_state(db)
}

/// Register collection and item routes with and without a trailing slash
fn entity_routes(
    prefix: &str,
    collection: MethodRouter<SharedDb>,
    item: MethodRouter<SharedDb>,
) -> Router<SharedDb> {
    Router::new()
        .route(prefix, collection.clone())
        .route(&format!("{}/", prefix), collection)
        .route(&format!("{}/:id", prefix), item.clone())
        .route(&format!("{}/:id/", prefix), item)
}
