//! Storage-specific error types
//!
//! Integrity violations detected by the booking database, kept apart from raw
//! engine failures so the API layer can map them to client errors.

use crate::storage::models::{ActivityId, PersonId};
use thiserror::Error;

/// Errors returned by [`BookingDb`](crate::storage::BookingDb) operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Another event already occupies this date
    #[error("an event is already booked on {0}")]
    DateTaken(String),

    /// Event references a person that does not exist
    #[error("person {0} does not exist")]
    UnknownPerson(PersonId),

    /// Event references an activity that does not exist
    #[error("activity {0} does not exist")]
    UnknownActivity(ActivityId),

    /// Person still hosts at least one event
    #[error("person {0} still has events")]
    PersonInUse(PersonId),

    /// Activity is still booked by at least one event
    #[error("activity {0} still has events")]
    ActivityInUse(ActivityId),

    /// Underlying SQLite failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
