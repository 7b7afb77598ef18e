use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use tracing::debug;

use crate::api::CallerId;
use crate::db::{get_conn, DbPool};
use crate::domain::{
    check_location_refs, find_session, stats, user_exists, validate_location, PAGE_SIZE,
};
use crate::error::ApiError;
use crate::models::climb::{Climb, ClimbStatus, NewClimb};
use crate::models::location::{LocationRef, LocationType};
use crate::schema::climbs;

#[derive(Debug, Deserialize)]
pub struct CreateClimbRequest {
    pub session_id: Option<i32>,
    pub climber_id: Option<i32>,
    pub status: Option<String>,
    pub location_type: Option<String>,
    #[serde(default, alias = "gym")]
    pub gym_id: Option<LocationRef>,
    #[serde(default, alias = "crag")]
    pub crag_id: Option<LocationRef>,
    pub grade: Option<String>,
    pub style: Option<String>,
    pub attempts: Option<i32>,
    pub media_url: Option<String>,
    pub notes: Option<String>,
}

/// Log a climb, optionally into one of the caller's active sessions
pub async fn create_climb(
    State(pool): State<DbPool>,
    CallerId(caller_id): CallerId,
    Json(req): Json<CreateClimbRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let status = req
        .status
        .as_deref()
        .ok_or_else(|| ApiError::validation("status is required"))
        .and_then(|s| {
            ClimbStatus::parse(s)
                .ok_or_else(|| ApiError::validation("status must be 'top' or 'project'"))
        })?;
    let location_type = req
        .location_type
        .as_deref()
        .ok_or_else(|| ApiError::validation("location_type is required"))
        .and_then(|s| {
            LocationType::parse(s)
                .ok_or_else(|| ApiError::validation("location_type must be 'indoor' or 'outdoor'"))
        })?;
    let grade = req
        .grade
        .as_deref()
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .ok_or_else(|| ApiError::validation("grade is required"))?
        .to_string();
    if matches!(req.attempts, Some(a) if a < 1) {
        return Err(ApiError::validation("attempts must be at least 1"));
    }

    // The wire format allows a raw id or an embedded object; the domain
    // only ever sees the resolved id.
    let gym_id = req.gym_id.as_ref().map(LocationRef::id);
    let crag_id = req.crag_id.as_ref().map(LocationRef::id);
    validate_location(location_type, gym_id, crag_id)?;

    let mut conn = get_conn(&pool).await?;
    check_location_refs(&mut conn, gym_id, crag_id).await?;

    if let Some(climber_id) = req.climber_id {
        if !user_exists(&mut conn, climber_id).await? {
            return Err(ApiError::not_found(format!("user {climber_id} not found")));
        }
    }

    if let Some(session_id) = req.session_id {
        let session = find_session(&mut conn, session_id).await?;
        if session.user_id != caller_id {
            return Err(ApiError::forbidden(
                "only the session owner can log climbs into it",
            ));
        }
        if !session.is_active() {
            return Err(ApiError::conflict(
                "session_ended",
                format!("session {session_id} has already ended"),
            ));
        }
    }

    let new_climb = NewClimb {
        user_id: caller_id,
        climber_id: req.climber_id,
        session_id: req.session_id,
        status: status.as_str().to_string(),
        location_type: location_type.as_str().to_string(),
        gym_id,
        crag_id,
        grade,
        style: req.style,
        attempts: req.attempts,
        media_url: req.media_url,
        notes: req.notes,
        created_at: Utc::now().naive_utc(),
    };
    let climb: Climb = diesel::insert_into(climbs::table)
        .values(&new_climb)
        .returning(Climb::as_returning())
        .get_result(&mut conn)
        .await?;

    if let Some(session_id) = climb.session_id {
        stats::recompute_session_stats(&mut conn, session_id).await?;
    }
    debug!("Climb {} logged by user {}", climb.id, caller_id);

    Ok((StatusCode::CREATED, Json(climb)))
}

/// Fetch one climb
pub async fn get_climb(
    State(pool): State<DbPool>,
    Path(climb_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    let climb = load_climb(&mut conn, climb_id).await?;
    Ok(Json(climb))
}

/// Delete a climb; owner-only. The session counters are recomputed when the
/// climb belonged to one.
pub async fn delete_climb(
    State(pool): State<DbPool>,
    CallerId(caller_id): CallerId,
    Path(climb_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    let climb = load_climb(&mut conn, climb_id).await?;
    if climb.user_id != caller_id {
        return Err(ApiError::forbidden("only the logger can delete a climb"));
    }

    diesel::delete(climbs::table.find(climb_id))
        .execute(&mut conn)
        .await?;
    if let Some(session_id) = climb.session_id {
        stats::recompute_session_stats(&mut conn, session_id).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// A user's climbs, newest first
pub async fn get_user_climbs(
    State(pool): State<DbPool>,
    Path(user_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    if !user_exists(&mut conn, user_id).await? {
        return Err(ApiError::not_found(format!("user {user_id} not found")));
    }
    let rows: Vec<Climb> = climbs::table
        .filter(climbs::user_id.eq(user_id))
        .order_by(climbs::created_at.desc())
        .limit(PAGE_SIZE)
        .select(Climb::as_select())
        .load(&mut conn)
        .await?;
    Ok(Json(rows))
}

async fn load_climb(
    conn: &mut crate::db::DbConnection,
    climb_id: i32,
) -> Result<Climb, ApiError> {
    climbs::table
        .find(climb_id)
        .select(Climb::as_select())
        .first(conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::not_found(format!("climb {climb_id} not found")))
}
