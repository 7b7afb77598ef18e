use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::api::CallerId;
use crate::db::{get_conn, DbPool};
use crate::domain::notifications;
use crate::error::ApiError;

/// The caller's notifications, newest first
pub async fn get_notifications(
    State(pool): State<DbPool>,
    CallerId(caller_id): CallerId,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    let items = notifications::list(&mut conn, caller_id).await?;
    Ok(Json(items))
}

/// Mark one notification as read
pub async fn mark_read(
    State(pool): State<DbPool>,
    CallerId(caller_id): CallerId,
    Path(notification_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    notifications::mark_read(&mut conn, caller_id, notification_id).await?;
    Ok(Json(serde_json::json!({ "read": true })))
}

/// Mark all of the caller's notifications as read
pub async fn mark_all_read(
    State(pool): State<DbPool>,
    CallerId(caller_id): CallerId,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    let updated = notifications::mark_all_read(&mut conn, caller_id).await?;
    Ok(Json(serde_json::json!({ "updated": updated })))
}

/// Delete one notification
pub async fn delete_notification(
    State(pool): State<DbPool>,
    CallerId(caller_id): CallerId,
    Path(notification_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    notifications::delete(&mut conn, caller_id, notification_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
