use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::api::CallerId;
use crate::db::{get_conn, DbPool};
use crate::domain::feed;
use crate::error::ApiError;

/// The caller's social feed: own and accepted friends' top climbs and ended
/// sessions, merged newest-first
pub async fn get_feed(
    State(pool): State<DbPool>,
    CallerId(caller_id): CallerId,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    let items = feed::list_feed(&mut conn, caller_id).await?;
    Ok(Json(items))
}
