//! Booking database operations
//!
//! Handles all SQL for the `person`, `activity` and `event` tables.

use crate::storage::error::StorageError;
use crate::storage::models::{
    Activity, ActivityId, Event, EventId, EventOverview, NewEvent, Person, PersonId,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{SqliteConnection, SqlitePool};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

const SCHEMA_SQL: &str = include_str!("../../migrations/001_create_booking.sql");

const EVENT_COLUMNS: &str = "event_id, person_id, activity_id, date, amount";

/// Connection pool for the booking ledger
///
/// Built once at startup and shared by every request handler.
#[derive(Debug, Clone)]
pub struct BookingDb {
    pool: SqlitePool,
}

impl BookingDb {
    /// Open (or create) the database file and apply the schema
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    /// * `max_connections` - Upper bound for the connection pool
    ///
    /// # Returns
    /// * `Ok(BookingDb)` if successful
    /// * `Err(StorageError)` if the file could not be opened or the schema failed
    pub async fn new(db_path: &str, max_connections: u32) -> Result<Self, StorageError> {
        if let Some(parent) = PathBuf::from(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StorageError::Database(sqlx::Error::Io(e)))?;
            }
        }

        let connection_string = if db_path.starts_with("sqlite:") {
            db_path.to_string()
        } else {
            format!("sqlite:{}", db_path)
        };

        let options = SqliteConnectOptions::from_str(&connection_string)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        info!("Connected to SQLite database at: {}", db_path);

        let db = Self { pool };
        db.apply_schema().await?;

        Ok(db)
    }

    /// Create any missing tables and indexes
    async fn apply_schema(&self) -> Result<(), StorageError> {
        for statement in schema_statements(SCHEMA_SQL) {
            sqlx::query(&statement).execute(&self.pool).await?;
        }
        debug!("Booking schema applied");
        Ok(())
    }

    /// Drop every table and recreate the schema from scratch
    ///
    /// Administrative operation: all booked data is lost.
    pub async fn reset_schema(&self) -> Result<(), StorageError> {
        info!("Resetting booking schema");
        // event first, it holds the foreign keys
        for table in ["event", "activity", "person"] {
            sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
                .execute(&self.pool)
                .await?;
        }
        self.apply_schema().await
    }

    // ---- person ----

    /// Get all people ordered by id
    pub async fn list_people(&self) -> Result<Vec<Person>, StorageError> {
        let people =
            sqlx::query_as::<_, Person>("SELECT person_id, name FROM person ORDER BY person_id")
                .fetch_all(&self.pool)
                .await?;
        Ok(people)
    }

    /// Get a person by id
    pub async fn get_person(&self, id: PersonId) -> Result<Option<Person>, StorageError> {
        let person =
            sqlx::query_as::<_, Person>("SELECT person_id, name FROM person WHERE person_id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(person)
    }

    /// Insert a person and return it with its generated id
    pub async fn insert_person(&self, name: &str) -> Result<Person, StorageError> {
        let result = sqlx::query("INSERT INTO person (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        let person = Person {
            person_id: result.last_insert_rowid(),
            name: name.to_string(),
        };
        debug!("Inserted person {}", person.person_id);
        Ok(person)
    }

    /// Delete a person; unknown ids are a no-op
    ///
    /// Fails with [`StorageError::PersonInUse`] while events still reference the person.
    pub async fn delete_person(&self, id: PersonId) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;

        if row_exists(
            &mut tx,
            "SELECT EXISTS(SELECT 1 FROM event WHERE person_id = ?)",
            id,
        )
        .await?
        {
            return Err(StorageError::PersonInUse(id));
        }

        sqlx::query("DELETE FROM person WHERE person_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_reference_error(e, StorageError::PersonInUse(id)))?;
        tx.commit().await?;

        debug!("Deleted person {}", id);
        Ok(())
    }

    // ---- activity ----

    /// Get all activities ordered by id
    pub async fn list_activities(&self) -> Result<Vec<Activity>, StorageError> {
        let activities = sqlx::query_as::<_, Activity>(
            "SELECT activity_id, name FROM activity ORDER BY activity_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(activities)
    }

    /// Get an activity by id
    pub async fn get_activity(&self, id: ActivityId) -> Result<Option<Activity>, StorageError> {
        let activity = sqlx::query_as::<_, Activity>(
            "SELECT activity_id, name FROM activity WHERE activity_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(activity)
    }

    /// Insert an activity and return it with its generated id
    pub async fn insert_activity(&self, name: &str) -> Result<Activity, StorageError> {
        let result = sqlx::query("INSERT INTO activity (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        let activity = Activity {
            activity_id: result.last_insert_rowid(),
            name: name.to_string(),
        };
        debug!("Inserted activity {}", activity.activity_id);
        Ok(activity)
    }

    /// Delete an activity; unknown ids are a no-op
    ///
    /// Fails with [`StorageError::ActivityInUse`] while events still reference it.
    pub async fn delete_activity(&self, id: ActivityId) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;

        if row_exists(
            &mut tx,
            "SELECT EXISTS(SELECT 1 FROM event WHERE activity_id = ?)",
            id,
        )
        .await?
        {
            return Err(StorageError::ActivityInUse(id));
        }

        sqlx::query("DELETE FROM activity WHERE activity_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_reference_error(e, StorageError::ActivityInUse(id)))?;
        tx.commit().await?;

        debug!("Deleted activity {}", id);
        Ok(())
    }

    // ---- event ----

    /// Get all events ordered by id
    pub async fn list_events(&self) -> Result<Vec<Event>, StorageError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM event ORDER BY event_id",
            EVENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    /// Get an event by id
    pub async fn get_event(&self, id: EventId) -> Result<Option<Event>, StorageError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM event WHERE event_id = ?",
            EVENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(event)
    }

    /// Get all events hosted by a person
    pub async fn events_by_person(&self, person_id: PersonId) -> Result<Vec<Event>, StorageError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM event WHERE person_id = ? ORDER BY event_id",
            EVENT_COLUMNS
        ))
        .bind(person_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    /// Get all events for an activity
    pub async fn events_by_activity(
        &self,
        activity_id: ActivityId,
    ) -> Result<Vec<Event>, StorageError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM event WHERE activity_id = ? ORDER BY event_id",
            EVENT_COLUMNS
        ))
        .bind(activity_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    /// Get all events scheduled on a date
    pub async fn events_by_date(&self, date: &str) -> Result<Vec<Event>, StorageError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM event WHERE date = ? ORDER BY event_id",
            EVENT_COLUMNS
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    /// Insert an event and return it with its generated id
    ///
    /// The person and activity must exist, and no other event may hold the date.
    pub async fn insert_event(&self, event: &NewEvent) -> Result<Event, StorageError> {
        let mut tx = self.pool.begin().await?;
        ensure_references(&mut tx, event).await?;

        let result = sqlx::query(
            "INSERT INTO event (person_id, activity_id, date, amount) VALUES (?, ?, ?, ?)",
        )
        .bind(event.person_id)
        .bind(event.activity_id)
        .bind(&event.date)
        .bind(event.amount)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_date_error(e, &event.date))?;
        tx.commit().await?;

        let event = event.clone().with_id(result.last_insert_rowid());
        debug!("Inserted event {} on {}", event.event_id, event.date);
        Ok(event)
    }

    /// Replace every field of an existing event
    ///
    /// Returns `Ok(None)` when no event has this id.
    pub async fn update_event(
        &self,
        id: EventId,
        event: &NewEvent,
    ) -> Result<Option<Event>, StorageError> {
        let mut tx = self.pool.begin().await?;

        if !row_exists(
            &mut tx,
            "SELECT EXISTS(SELECT 1 FROM event WHERE event_id = ?)",
            id,
        )
        .await?
        {
            return Ok(None);
        }
        ensure_references(&mut tx, event).await?;

        sqlx::query(
            "UPDATE event SET person_id = ?, activity_id = ?, date = ?, amount = ? WHERE event_id = ?",
        )
        .bind(event.person_id)
        .bind(event.activity_id)
        .bind(&event.date)
        .bind(event.amount)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_date_error(e, &event.date))?;
        tx.commit().await?;

        debug!("Updated event {}", id);
        Ok(Some(event.clone().with_id(id)))
    }

    /// Delete an event; unknown ids are a no-op
    pub async fn delete_event(&self, id: EventId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM event WHERE event_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!("Deleted event {}", id);
        Ok(())
    }

    /// Get every event with the names of its person and activity
    pub async fn overview(&self) -> Result<Vec<EventOverview>, StorageError> {
        let rows = sqlx::query_as::<_, EventOverview>(
            "SELECT event.event_id AS id, person.name AS person, activity.name AS activity, \
             event.date AS date, event.amount AS amount \
             FROM event \
             JOIN person ON event.person_id = person.person_id \
             JOIN activity ON event.activity_id = activity.activity_id \
             ORDER BY event.date, event.event_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

/// Run a `SELECT EXISTS(...)` query bound to a single id
async fn row_exists(
    conn: &mut SqliteConnection,
    query: &str,
    id: i64,
) -> Result<bool, StorageError> {
    let exists = sqlx::query_scalar::<_, i64>(query)
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(exists != 0)
}

/// Check that the person and activity an event points at both exist
async fn ensure_references(
    conn: &mut SqliteConnection,
    event: &NewEvent,
) -> Result<(), StorageError> {
    if !row_exists(
        conn,
        "SELECT EXISTS(SELECT 1 FROM person WHERE person_id = ?)",
        event.person_id,
    )
    .await?
    {
        return Err(StorageError::UnknownPerson(event.person_id));
    }

    if !row_exists(
        conn,
        "SELECT EXISTS(SELECT 1 FROM activity WHERE activity_id = ?)",
        event.activity_id,
    )
    .await?
    {
        return Err(StorageError::UnknownActivity(event.activity_id));
    }

    Ok(())
}

/// Turn a `UNIQUE(date)` violation into [`StorageError::DateTaken`]
fn map_date_error(err: sqlx::Error, date: &str) -> StorageError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StorageError::DateTaken(date.to_string());
        }
    }
    StorageError::Database(err)
}

/// Turn a foreign key violation into the supplied integrity error
fn map_reference_error(err: sqlx::Error, in_use: StorageError) -> StorageError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_foreign_key_violation() {
            return in_use;
        }
    }
    StorageError::Database(err)
}

/// Split a SQL script into executable statements
///
/// Drops `--` comments (whole-line and trailing) and empty statements.
fn schema_statements(sql: &str) -> Vec<String> {
    let mut cleaned_sql = String::new();
    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("--") {
            continue;
        }
        let without_comments = match trimmed.find("--") {
            Some(comment_pos) => &trimmed[..comment_pos],
            None => trimmed,
        };
        cleaned_sql.push_str(without_comments.trim());
        cleaned_sql.push(' ');
    }

    cleaned_sql
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
