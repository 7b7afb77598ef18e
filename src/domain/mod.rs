//! Core rules of the climbing log: counter aggregation, the friendship
//! state machine, reactions, notification fan-out and feed composition.
//! Everything here is request-scoped; handlers call in with a pooled
//! connection and no state survives the call.

pub mod engagement;
pub mod feed;
pub mod friendship;
pub mod grades;
pub mod notifications;
pub mod stats;

use crate::db::DbConnection;
use crate::error::ApiError;
use crate::models::location::LocationType;
use crate::models::session::Session;
use crate::models::user::UserSummary;
use crate::schema::{crags, gyms, sessions, users};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use std::collections::HashMap;

/// Cap applied to every listing query: per-user climbs and sessions, the
/// notification inbox, and each of the two feed source streams.
pub const PAGE_SIZE: i64 = 50;

/// Load a session or report NotFound
pub async fn find_session(conn: &mut DbConnection, session_id: i32) -> Result<Session, ApiError> {
    sessions::table
        .find(session_id)
        .select(Session::as_select())
        .first(conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::not_found(format!("session {session_id} not found")))
}

pub async fn user_exists(conn: &mut DbConnection, user_id: i32) -> Result<bool, ApiError> {
    let count: i64 = users::table
        .filter(users::id.eq(user_id))
        .count()
        .get_result(conn)
        .await?;
    Ok(count > 0)
}

/// Resolve a set of user ids to display summaries, keyed by id
pub async fn user_summary_map(
    conn: &mut DbConnection,
    ids: &[i32],
) -> Result<HashMap<i32, UserSummary>, ApiError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(i32, String, String, Option<String>)> = users::table
        .filter(users::id.eq_any(ids.to_vec()))
        .select((
            users::id,
            users::username,
            users::display_name,
            users::avatar_url,
        ))
        .load(conn)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(id, username, display_name, avatar_url)| {
            (
                id,
                UserSummary {
                    id,
                    username,
                    display_name,
                    avatar_url,
                },
            )
        })
        .collect())
}

/// A climb or session names at most one location, and it must agree with
/// the indoor/outdoor discriminator.
pub fn validate_location(
    location_type: LocationType,
    gym_id: Option<i32>,
    crag_id: Option<i32>,
) -> Result<(), ApiError> {
    if gym_id.is_some() && crag_id.is_some() {
        return Err(ApiError::validation(
            "provide either a gym or a crag, not both",
        ));
    }
    match location_type {
        LocationType::Indoor if crag_id.is_some() => Err(ApiError::validation(
            "an indoor entry takes a gym, not a crag",
        )),
        LocationType::Outdoor if gym_id.is_some() => Err(ApiError::validation(
            "an outdoor entry takes a crag, not a gym",
        )),
        _ => Ok(()),
    }
}

/// Verify that referenced locations exist before anything is written
pub async fn check_location_refs(
    conn: &mut DbConnection,
    gym_id: Option<i32>,
    crag_id: Option<i32>,
) -> Result<(), ApiError> {
    if let Some(id) = gym_id {
        let count: i64 = gyms::table
            .filter(gyms::id.eq(id))
            .count()
            .get_result(conn)
            .await?;
        if count == 0 {
            return Err(ApiError::not_found(format!("gym {id} not found")));
        }
    }
    if let Some(id) = crag_id {
        let count: i64 = crags::table
            .filter(crags::id.eq(id))
            .count()
            .get_result(conn)
            .await?;
        if count == 0 {
            return Err(ApiError::not_found(format!("crag {id} not found")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_must_match_the_discriminator() {
        assert!(validate_location(LocationType::Indoor, Some(1), None).is_ok());
        assert!(validate_location(LocationType::Outdoor, None, Some(2)).is_ok());
        assert!(validate_location(LocationType::Indoor, None, Some(2)).is_err());
        assert!(validate_location(LocationType::Outdoor, Some(1), None).is_err());
    }

    #[test]
    fn at_most_one_location_reference() {
        assert!(validate_location(LocationType::Indoor, Some(1), Some(2)).is_err());
        assert!(validate_location(LocationType::Indoor, None, None).is_ok());
    }
}
