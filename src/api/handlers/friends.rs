use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::api::CallerId;
use crate::db::{get_conn, DbPool};
use crate::domain::{friendship, user_summary_map};
use crate::error::ApiError;

/// Send a friend request to another user
pub async fn request_friend(
    State(pool): State<DbPool>,
    CallerId(caller_id): CallerId,
    Path(other_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    friendship::request(&mut conn, caller_id, other_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "status": "pending" })),
    ))
}

/// Accept a pending friend request
pub async fn accept_friend(
    State(pool): State<DbPool>,
    CallerId(caller_id): CallerId,
    Path(requester_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    friendship::accept(&mut conn, caller_id, requester_id).await?;
    Ok(Json(serde_json::json!({ "status": "accepted" })))
}

/// Reject a pending friend request
pub async fn reject_friend(
    State(pool): State<DbPool>,
    CallerId(caller_id): CallerId,
    Path(requester_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    friendship::reject(&mut conn, caller_id, requester_id).await?;
    Ok(Json(serde_json::json!({ "status": "rejected" })))
}

/// Unfriend; succeeds whether or not a relation existed
pub async fn remove_friend(
    State(pool): State<DbPool>,
    CallerId(caller_id): CallerId,
    Path(other_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    friendship::remove(&mut conn, caller_id, other_id).await?;
    Ok(Json(serde_json::json!({ "status": "removed" })))
}

/// The caller's friends with display details
pub async fn get_friends(
    State(pool): State<DbPool>,
    CallerId(caller_id): CallerId,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    let ids = friendship::friend_ids(&mut conn, caller_id).await?;
    let mut summaries = user_summary_map(&mut conn, &ids).await?;
    let friends: Vec<_> = ids
        .into_iter()
        .filter_map(|id| summaries.remove(&id))
        .collect();
    Ok(Json(friends))
}

/// Pairwise status between the caller and another user; the pending
/// direction is preserved so the UI knows who is waiting on whom
pub async fn get_friend_status(
    State(pool): State<DbPool>,
    CallerId(caller_id): CallerId,
    Path(other_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    let relation = friendship::relation(&mut conn, caller_id, other_id).await?;
    Ok(Json(relation))
}
