use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use tracing::debug;

use crate::api::CallerId;
use crate::db::{get_conn, DbPool};
use crate::domain::{
    check_location_refs, engagement, find_session, stats, user_exists, validate_location, PAGE_SIZE,
};
use crate::error::ApiError;
use crate::models::location::{LocationRef, LocationType};
use crate::models::session::{NewSession, Session, SessionDetail};
use crate::schema::sessions;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub location_type: Option<String>,
    #[serde(default, alias = "gym")]
    pub gym_id: Option<LocationRef>,
    #[serde(default, alias = "crag")]
    pub crag_id: Option<LocationRef>,
    pub started_at: Option<NaiveDateTime>,
}

/// Start a new session; active until explicitly ended
pub async fn create_session(
    State(pool): State<DbPool>,
    CallerId(caller_id): CallerId,
    Json(req): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let location_type = req
        .location_type
        .as_deref()
        .ok_or_else(|| ApiError::validation("location_type is required"))
        .and_then(|s| {
            LocationType::parse(s)
                .ok_or_else(|| ApiError::validation("location_type must be 'indoor' or 'outdoor'"))
        })?;
    let gym_id = req.gym_id.as_ref().map(LocationRef::id);
    let crag_id = req.crag_id.as_ref().map(LocationRef::id);
    validate_location(location_type, gym_id, crag_id)?;

    let now = Utc::now().naive_utc();
    let started_at = resolve_started_at(req.started_at, now)?;

    let mut conn = get_conn(&pool).await?;
    check_location_refs(&mut conn, gym_id, crag_id).await?;

    let new_session = NewSession {
        user_id: caller_id,
        location_type: location_type.as_str().to_string(),
        gym_id,
        crag_id,
        started_at,
        created_at: now,
        updated_at: now,
    };
    let session: Session = diesel::insert_into(sessions::table)
        .values(&new_session)
        .returning(Session::as_returning())
        .get_result(&mut conn)
        .await?;
    debug!("Session {} started by user {}", session.id, caller_id);

    Ok((StatusCode::CREATED, Json(session)))
}

/// Backdated starts are fine; future ones are not, since ending such a
/// session would derive a negative duration.
fn resolve_started_at(
    requested: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> Result<NaiveDateTime, ApiError> {
    match requested {
        None => Ok(now),
        Some(t) if t > now => Err(ApiError::validation("started_at cannot be in the future")),
        Some(t) => Ok(t),
    }
}

/// Fetch a session with its climbs, rosters and comments
pub async fn get_session(
    State(pool): State<DbPool>,
    Path(session_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    let session = find_session(&mut conn, session_id).await?;
    let climbs = stats::load_session_climbs(&mut conn, session_id).await?;
    let participants = engagement::participant_roster(&mut conn, session_id).await?;
    let fistbumps = engagement::fistbump_user_ids(&mut conn, session_id).await?;
    let comments = engagement::list_comments(&mut conn, session_id).await?;

    Ok(Json(SessionDetail {
        session,
        climbs,
        participants,
        fistbumps,
        comments,
    }))
}

/// A user's sessions, newest first
pub async fn get_user_sessions(
    State(pool): State<DbPool>,
    Path(user_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    if !user_exists(&mut conn, user_id).await? {
        return Err(ApiError::not_found(format!("user {user_id} not found")));
    }
    let rows: Vec<Session> = sessions::table
        .filter(sessions::user_id.eq(user_id))
        .order_by(sessions::started_at.desc())
        .limit(PAGE_SIZE)
        .select(Session::as_select())
        .load(&mut conn)
        .await?;
    Ok(Json(rows))
}

#[derive(Debug, Default, Deserialize)]
pub struct EndSessionRequest {
    pub rating: Option<i32>,
    pub feeling: Option<String>,
}

/// End a session: freezes ended_at, derives the duration and runs the final
/// counter recompute
pub async fn end_session(
    State(pool): State<DbPool>,
    CallerId(caller_id): CallerId,
    Path(session_id): Path<i32>,
    body: Option<Json<EndSessionRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let mut conn = get_conn(&pool).await?;
    let session =
        stats::end_session(&mut conn, session_id, caller_id, req.rating, req.feeling).await?;
    Ok(Json(session))
}

/// Delete a session; its climbs go first so they never outlive it
pub async fn delete_session(
    State(pool): State<DbPool>,
    CallerId(caller_id): CallerId,
    Path(session_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    stats::delete_session(&mut conn, session_id, caller_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Toggle the caller's fistbump on a session
pub async fn toggle_fistbump(
    State(pool): State<DbPool>,
    CallerId(caller_id): CallerId,
    Path(session_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    let outcome = engagement::toggle_fistbump(&mut conn, session_id, caller_id).await?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
pub struct AddParticipantRequest {
    pub user_id: i32,
}

/// Add a co-climber to an active session; owner-only
pub async fn add_participant(
    State(pool): State<DbPool>,
    CallerId(caller_id): CallerId,
    Path(session_id): Path<i32>,
    Json(req): Json<AddParticipantRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    engagement::add_participant(&mut conn, session_id, caller_id, req.user_id).await?;
    let roster = engagement::participant_roster(&mut conn, session_id).await?;
    Ok((StatusCode::CREATED, Json(roster)))
}

/// Remove a participant from an active session; owner-only
pub async fn remove_participant(
    State(pool): State<DbPool>,
    CallerId(caller_id): CallerId,
    Path((session_id, user_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    engagement::remove_participant(&mut conn, session_id, caller_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 20)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn omitted_start_defaults_to_now() {
        assert_eq!(resolve_started_at(None, at(12)).unwrap(), at(12));
    }

    #[test]
    fn backdated_starts_are_accepted() {
        assert_eq!(resolve_started_at(Some(at(9)), at(12)).unwrap(), at(9));
    }

    #[test]
    fn future_starts_are_rejected() {
        assert!(matches!(
            resolve_started_at(Some(at(15)), at(12)),
            Err(ApiError::Validation(_))
        ));
    }
}
