//! Storage module
//!
//! Persists people, activities and events in a single SQLite database.
//! All SQL lives here; callers get typed rows back.

pub mod db;
pub mod error;
pub mod models;

pub use db::BookingDb;
pub use error::StorageError;
pub use models::{
    Activity, ActivityId, Event, EventId, EventOverview, NewEvent, Person, PersonId,
};
