//! Booking Ledger Library
//!
//! Records people, activities and the events that book them on a date.
//! The main binary is in `src/main.rs`.

pub mod api;
pub mod config;
pub mod error;
/// SQLite-backed storage for people, activities and events
pub mod storage;
pub mod views;
