//! Activity API handlers

use crate::api::extract::ApiPath;
use crate::api::form::FormFields;
use crate::api::SharedDb;
use crate::error::AppError;
use crate::storage::{Activity, ActivityId, BookingDb};
use axum::{extract::State, response::Json};
use tracing::info;

/// GET /api/activity/ - List all activities
pub async fn list_activities(
    State(db): State<SharedDb>,
) -> Result<Json<Vec<Activity>>, AppError> {
    Ok(Json(db.list_activities().await?))
}

/// GET /api/activity/:id - Get a specific activity
pub async fn get_activity(
    State(db): State<SharedDb>,
    ApiPath(id): ApiPath<ActivityId>,
) -> Result<Json<Activity>, AppError> {
    let activity = db
        .get_activity(id)
        .await?
        .ok_or_else(|| AppError::not_found("activity"))?;

    Ok(Json(activity))
}

/// POST /api/activity/ - Create an activity from the `name` field
pub async fn create_activity(
    State(db): State<SharedDb>,
    fields: FormFields,
) -> Result<Json<Activity>, AppError> {
    let name = fields.require_text("name", "activity name")?;
    let activity = db.insert_activity(name).await?;

    info!(activity_id = activity.activity_id, "Created activity");
    Ok(Json(activity))
}

/// DELETE /api/activity/ - Delete the activity named by the `activity_id` field
pub async fn delete_activity(
    State(db): State<SharedDb>,
    fields: FormFields,
) -> Result<Json<Activity>, AppError> {
    let id = fields.require_id("activity_id")?;
    Ok(Json(remove_activity(&db, id).await?))
}

/// DELETE /api/activity/:id - Delete an activity by path id
pub async fn delete_activity_by_id(
    State(db): State<SharedDb>,
    ApiPath(id): ApiPath<ActivityId>,
) -> Result<Json<Activity>, AppError> {
    Ok(Json(remove_activity(&db, id).await?))
}

async fn remove_activity(db: &BookingDb, id: ActivityId) -> Result<Activity, AppError> {
    let activity = db
        .get_activity(id)
        .await?
        .ok_or_else(|| AppError::not_found("activity"))?;
    db.delete_activity(id).await?;

    info!(activity_id = id, "Deleted activity");
    Ok(activity)
}
