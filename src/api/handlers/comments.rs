use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::api::CallerId;
use crate::db::{get_conn, DbPool};
use crate::domain::{engagement, find_session};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub body: String,
}

/// Comment on a session
pub async fn create_comment(
    State(pool): State<DbPool>,
    CallerId(caller_id): CallerId,
    Path(session_id): Path<i32>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    let comment = engagement::create_comment(&mut conn, session_id, caller_id, &req.body).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// A session's comments, newest first, with authors resolved
pub async fn get_session_comments(
    State(pool): State<DbPool>,
    Path(session_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    find_session(&mut conn, session_id).await?;
    let comments = engagement::list_comments(&mut conn, session_id).await?;
    Ok(Json(comments))
}

/// Delete a comment; author-only
pub async fn delete_comment(
    State(pool): State<DbPool>,
    CallerId(caller_id): CallerId,
    Path(comment_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    engagement::delete_comment(&mut conn, comment_id, caller_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
