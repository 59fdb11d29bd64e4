//! Booking data models
//!
//! Row types for the `person`, `activity` and `event` tables plus the
//! field sets used to insert or replace them.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Identifier of a person row
pub type PersonId = i64;
/// Identifier of an activity row
pub type ActivityId = i64;
/// Identifier of an event row
pub type EventId = i64;

/// Someone who hosts events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Person {
    /// Generated identifier
    pub person_id: PersonId,
    /// Display name
    pub name: String,
}

/// A kind of occasion that can be booked (wedding, birthday, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Activity {
    /// Generated identifier
    pub activity_id: ActivityId,
    /// Display name
    pub name: String,
}

/// A person doing an activity on a date for an amount of money
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Event {
    /// Generated identifier
    pub event_id: EventId,
    /// Host of the event
    pub person_id: PersonId,
    /// What is being booked
    pub activity_id: ActivityId,
    /// Calendar date, free-form text (at most one event per date)
    pub date: String,
    /// Price of the booking
    pub amount: f64,
}

/// Field set for inserting or fully replacing an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    /// Host of the event
    pub person_id: PersonId,
    /// What is being booked
    pub activity_id: ActivityId,
    /// Calendar date
    pub date: String,
    /// Price of the booking
    pub amount: f64,
}

impl NewEvent {
    /// Attach a generated id to this field set
    pub fn with_id(self, event_id: EventId) -> Event {
        Event {
            event_id,
            person_id: self.person_id,
            activity_id: self.activity_id,
            date: self.date,
            amount: self.amount,
        }
    }
}

/// Event joined with the names of its person and activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct EventOverview {
    /// Event identifier
    pub id: EventId,
    /// Name of the hosting person
    pub person: String,
    /// Name of the activity
    pub activity: String,
    /// Calendar date
    pub date: String,
    /// Price of the booking
    pub amount: f64,
}
