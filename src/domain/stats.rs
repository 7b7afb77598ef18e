//! Stats aggregator: keeps the denormalized counters on a session row
//! consistent with the climbs that reference it. Counters are always
//! recomputed from the full climb set at every mutation boundary, never
//! patched incrementally, so any transient drift heals on the next write.

use crate::db::DbConnection;
use crate::domain::find_session;
use crate::error::ApiError;
use crate::models::climb::Climb;
use crate::models::session::Session;
use crate::schema::{climbs, sessions};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

/// Snapshot of the derived counters for one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTally {
    pub climb_count: i32,
    pub tops_count: i32,
    pub projects_count: i32,
    pub hardest_grade: Option<String>,
}

impl SessionTally {
    /// Tally a session's climbs.
    ///
    /// `hardest_grade` is the grade of the first climb in retrieval order.
    /// This is NOT a difficulty ranking: grades are opaque strings drawn
    /// from heterogeneous scales (V-scale, French, hold colors) with no
    /// universal ordering, so no comparator is attempted.
    pub fn from_climbs(climbs: &[Climb]) -> Self {
        let tops = climbs.iter().filter(|c| c.is_top()).count();
        let projects = climbs.iter().filter(|c| c.is_project()).count();
        SessionTally {
            climb_count: climbs.len() as i32,
            tops_count: tops as i32,
            projects_count: projects as i32,
            hardest_grade: climbs.first().map(|c| c.grade.clone()),
        }
    }
}

/// Whole seconds elapsed between session start and end, floored
pub fn duration_seconds(started_at: NaiveDateTime, ended_at: NaiveDateTime) -> i64 {
    (ended_at - started_at).num_seconds()
}

/// All climbs referencing a session, oldest first
pub async fn load_session_climbs(
    conn: &mut DbConnection,
    session_id: i32,
) -> Result<Vec<Climb>, ApiError> {
    let rows = climbs::table
        .filter(climbs::session_id.eq(session_id))
        .order_by(climbs::created_at.asc())
        .select(Climb::as_select())
        .load(conn)
        .await?;
    Ok(rows)
}

/// Re-read the session's climbs and write the tally back to the session row.
/// Invoked on climb creation, climb deletion and session end.
pub async fn recompute_session_stats(
    conn: &mut DbConnection,
    session_id: i32,
) -> Result<SessionTally, ApiError> {
    let session_climbs = load_session_climbs(conn, session_id).await?;
    let tally = SessionTally::from_climbs(&session_climbs);
    debug!(
        "Recomputing stats for session {}: {} climbs, {} tops, {} projects",
        session_id, tally.climb_count, tally.tops_count, tally.projects_count
    );
    diesel::update(sessions::table.find(session_id))
        .set((
            sessions::climb_count.eq(tally.climb_count),
            sessions::tops_count.eq(tally.tops_count),
            sessions::projects_count.eq(tally.projects_count),
            sessions::hardest_grade.eq(tally.hardest_grade.clone()),
            sessions::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(conn)
        .await?;
    Ok(tally)
}

/// Whether the caller may end this session now: owner-only, and only once.
fn ensure_endable(session: &Session, caller_id: i32) -> Result<(), ApiError> {
    if session.user_id != caller_id {
        return Err(ApiError::forbidden("only the session owner can end it"));
    }
    if session.ended_at.is_some() {
        return Err(ApiError::conflict(
            "session_ended",
            format!("session {} has already ended", session.id),
        ));
    }
    Ok(())
}

/// End a session: freeze ended_at, derive duration_seconds exactly once and
/// run the final counter recompute. Ending twice is a conflict.
pub async fn end_session(
    conn: &mut DbConnection,
    session_id: i32,
    caller_id: i32,
    rating: Option<i32>,
    feeling: Option<String>,
) -> Result<Session, ApiError> {
    let session = find_session(conn, session_id).await?;
    ensure_endable(&session, caller_id)?;

    let ended_at = Utc::now().naive_utc();
    let duration = duration_seconds(session.started_at, ended_at);
    diesel::update(sessions::table.find(session_id))
        .set((
            sessions::ended_at.eq(Some(ended_at)),
            sessions::duration_seconds.eq(Some(duration)),
            sessions::rating.eq(rating),
            sessions::feeling.eq(feeling),
            sessions::updated_at.eq(ended_at),
        ))
        .execute(conn)
        .await?;

    recompute_session_stats(conn, session_id).await?;
    find_session(conn, session_id).await
}

/// Delete a session and everything hanging off it. Climbs are removed first
/// in a separate write so they never outlive their session; the remaining
/// children (fistbumps, participants, comments) cascade at the SQL level.
pub async fn delete_session(
    conn: &mut DbConnection,
    session_id: i32,
    caller_id: i32,
) -> Result<(), ApiError> {
    let session = find_session(conn, session_id).await?;
    if session.user_id != caller_id {
        return Err(ApiError::forbidden("only the session owner can delete it"));
    }

    let removed = diesel::delete(climbs::table.filter(climbs::session_id.eq(session_id)))
        .execute(conn)
        .await?;
    debug!("Deleted {} climbs belonging to session {}", removed, session_id);

    diesel::delete(sessions::table.find(session_id))
        .execute(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn climb(id: i32, status: &str, grade: &str) -> Climb {
        let t = NaiveDate::from_ymd_opt(2026, 8, 20)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap();
        Climb {
            id,
            user_id: 1,
            climber_id: None,
            session_id: Some(1),
            status: status.to_string(),
            location_type: "indoor".to_string(),
            gym_id: Some(1),
            crag_id: None,
            grade: grade.to_string(),
            style: None,
            attempts: None,
            media_url: None,
            notes: None,
            created_at: t,
        }
    }

    #[test]
    fn tally_counts_tops_and_projects() {
        let set = vec![
            climb(1, "top", "V3"),
            climb(2, "top", "V4"),
            climb(3, "project", "V6"),
        ];
        let tally = SessionTally::from_climbs(&set);
        assert_eq!(tally.climb_count, 3);
        assert_eq!(tally.tops_count, 2);
        assert_eq!(tally.projects_count, 1);
        assert_eq!(tally.climb_count, tally.tops_count + tally.projects_count);
    }

    #[test]
    fn hardest_grade_is_first_found_not_a_ranking() {
        let set = vec![
            climb(1, "top", "V3"),
            climb(2, "top", "V10"),
            climb(3, "project", "8a"),
        ];
        let tally = SessionTally::from_climbs(&set);
        assert_eq!(tally.hardest_grade.as_deref(), Some("V3"));
    }

    #[test]
    fn empty_session_tallies_to_zero() {
        let tally = SessionTally::from_climbs(&[]);
        assert_eq!(tally.climb_count, 0);
        assert_eq!(tally.tops_count, 0);
        assert_eq!(tally.projects_count, 0);
        assert_eq!(tally.hardest_grade, None);
    }

    fn session(owner_id: i32, ended_at: Option<NaiveDateTime>) -> Session {
        let started = NaiveDate::from_ymd_opt(2026, 8, 20)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap();
        Session {
            id: 42,
            user_id: owner_id,
            location_type: "indoor".to_string(),
            gym_id: Some(1),
            crag_id: None,
            started_at: started,
            ended_at,
            duration_seconds: ended_at.map(|e| duration_seconds(started, e)),
            climb_count: 0,
            tops_count: 0,
            projects_count: 0,
            hardest_grade: None,
            fistbump_count: 0,
            rating: None,
            feeling: None,
            created_at: started,
            updated_at: started,
        }
    }

    #[test]
    fn owner_can_end_an_active_session() {
        assert!(ensure_endable(&session(1, None), 1).is_ok());
    }

    #[test]
    fn ending_twice_conflicts_on_the_second_call() {
        let ended = NaiveDate::from_ymd_opt(2026, 8, 20)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap();
        match ensure_endable(&session(1, Some(ended)), 1) {
            Err(ApiError::Conflict { code, .. }) => assert_eq!(code, "session_ended"),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn only_the_owner_may_end_a_session() {
        assert!(matches!(
            ensure_endable(&session(1, None), 2),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[test]
    fn duration_floors_to_whole_seconds() {
        let start = NaiveDate::from_ymd_opt(2026, 8, 20)
            .unwrap()
            .and_hms_milli_opt(18, 0, 0, 0)
            .unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 8, 20)
            .unwrap()
            .and_hms_milli_opt(19, 30, 12, 900)
            .unwrap();
        assert_eq!(duration_seconds(start, end), 5412);
    }
}
