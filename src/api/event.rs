//! Event API handlers
//!
//! Events tie a person and an activity to a date. Only one event may be
//! booked per date; the database rejects a second one and the handlers report
//! it as a conflict.

use crate::api::extract::{ApiPath, ApiQuery};
use crate::api::form::FormFields;
use crate::api::SharedDb;
use crate::error::AppError;
use crate::storage::{ActivityId, BookingDb, Event, EventId, NewEvent, PersonId};
use axum::{extract::State, response::Json};
use serde::Deserialize;
use tracing::{info, warn};

/// Optional filters for listing events
#[derive(Debug, Default, Deserialize)]
pub struct EventFilter {
    /// Only events hosted by this person
    pub person_id: Option<PersonId>,
    /// Only events for this activity
    pub activity_id: Option<ActivityId>,
    /// Only events on this date
    pub date: Option<String>,
}

/// GET /api/event/ - List events, optionally filtered
///
/// The first supplied filter wins, checked in the order person, activity, date.
pub async fn list_events(
    State(db): State<SharedDb>,
    ApiQuery(filter): ApiQuery<EventFilter>,
) -> Result<Json<Vec<Event>>, AppError> {
    let events = if let Some(person_id) = filter.person_id {
        db.events_by_person(person_id).await?
    } else if let Some(activity_id) = filter.activity_id {
        db.events_by_activity(activity_id).await?
    } else if let Some(date) = filter.date.as_deref() {
        db.events_by_date(date).await?
    } else {
        db.list_events().await?
    };

    Ok(Json(events))
}

/// GET /api/event/:id - Get a specific event
pub async fn get_event(
    State(db): State<SharedDb>,
    ApiPath(id): ApiPath<EventId>,
) -> Result<Json<Event>, AppError> {
    let event = db
        .get_event(id)
        .await?
        .ok_or_else(|| AppError::not_found("event"))?;

    Ok(Json(event))
}

/// POST /api/event/ - Book a new event
pub async fn create_event(
    State(db): State<SharedDb>,
    fields: FormFields,
) -> Result<Json<Event>, AppError> {
    let new_event = parse_event_fields(&fields)?;
    let event = db.insert_event(&new_event).await.map_err(|e| {
        let err = AppError::from(e);
        if matches!(err, AppError::Conflict(_)) {
            warn!(date = %new_event.date, "Rejected double booking");
        }
        err
    })?;

    info!(event_id = event.event_id, date = %event.date, "Created event");
    Ok(Json(event))
}

/// PUT /api/event/:id - Replace every field of an event
pub async fn update_event(
    State(db): State<SharedDb>,
    ApiPath(id): ApiPath<EventId>,
    fields: FormFields,
) -> Result<Json<Event>, AppError> {
    let replacement = parse_event_fields(&fields)?;
    let event = db
        .update_event(id, &replacement)
        .await?
        .ok_or_else(|| AppError::not_found("event"))?;

    info!(event_id = id, "Updated event");
    Ok(Json(event))
}

/// DELETE /api/event/ - Delete the event named by the `event_id` field
pub async fn delete_event(
    State(db): State<SharedDb>,
    fields: FormFields,
) -> Result<Json<Event>, AppError> {
    let id = fields.require_id("event_id")?;
    Ok(Json(remove_event(&db, id).await?))
}

/// DELETE /api/event/:id - Delete an event by path id
pub async fn delete_event_by_id(
    State(db): State<SharedDb>,
    ApiPath(id): ApiPath<EventId>,
) -> Result<Json<Event>, AppError> {
    Ok(Json(remove_event(&db, id).await?))
}

async fn remove_event(db: &BookingDb, id: EventId) -> Result<Event, AppError> {
    let event = db
        .get_event(id)
        .await?
        .ok_or_else(|| AppError::not_found("event"))?;
    db.delete_event(id).await?;

    info!(event_id = id, "Deleted event");
    Ok(event)
}

/// Validate the four required event fields, in order
fn parse_event_fields(fields: &FormFields) -> Result<NewEvent, AppError> {
    let person_id = fields.require_id("person_id")?;
    let activity_id = fields.require_id("activity_id")?;
    let date = fields.require_text("date", "date")?.to_string();
    let amount = fields.require_amount("amount")?;

    Ok(NewEvent {
        person_id,
        activity_id,
        date,
        amount,
    })
}
