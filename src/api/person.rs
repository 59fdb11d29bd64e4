//! Person API handlers
//!
//! Contains HTTP request handlers for person CRUD operations.

use crate::api::extract::ApiPath;
use crate::api::form::FormFields;
use crate::api::SharedDb;
use crate::error::AppError;
use crate::storage::{BookingDb, Person, PersonId};
use axum::{extract::State, response::Json};
use tracing::info;

/// GET /api/person/ - List all people
pub async fn list_people(State(db): State<SharedDb>) -> Result<Json<Vec<Person>>, AppError> {
    Ok(Json(db.list_people().await?))
}

/// GET /api/person/:id - Get a specific person
pub async fn get_person(
    State(db): State<SharedDb>,
    ApiPath(id): ApiPath<PersonId>,
) -> Result<Json<Person>, AppError> {
    let person = db
        .get_person(id)
        .await?
        .ok_or_else(|| AppError::not_found("person"))?;

    Ok(Json(person))
}

/// POST /api/person/ - Create a person from the `name` field
pub async fn create_person(
    State(db): State<SharedDb>,
    fields: FormFields,
) -> Result<Json<Person>, AppError> {
    let name = fields.require_text("name", "person name")?;
    let person = db.insert_person(name).await?;

    info!(person_id = person.person_id, "Created person");
    Ok(Json(person))
}

/// DELETE /api/person/ - Delete the person named by the `person_id` field
pub async fn delete_person(
    State(db): State<SharedDb>,
    fields: FormFields,
) -> Result<Json<Person>, AppError> {
    let id = fields.require_id("person_id")?;
    Ok(Json(remove_person(&db, id).await?))
}

/// DELETE /api/person/:id - Delete a person by path id
pub async fn delete_person_by_id(
    State(db): State<SharedDb>,
    ApiPath(id): ApiPath<PersonId>,
) -> Result<Json<Person>, AppError> {
    Ok(Json(remove_person(&db, id).await?))
}

/// Fetch the person for the response body, then delete it
async fn remove_person(db: &BookingDb, id: PersonId) -> Result<Person, AppError> {
    let person = db
        .get_person(id)
        .await?
        .ok_or_else(|| AppError::not_found("person"))?;
    db.delete_person(id).await?;

    info!(person_id = id, "Deleted person");
    Ok(person)
}
