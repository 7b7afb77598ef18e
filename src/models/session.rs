use crate::models::climb::Climb;
use crate::models::comment::CommentDetail;
use crate::models::user::UserSummary;
use crate::schema::{session_fistbumps, session_participants, sessions};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Model for a climbing session.
///
/// climb_count, tops_count, projects_count, hardest_grade and fistbump_count
/// are denormalized caches recomputed from their source tables at every
/// mutation boundary; they are never patched incrementally.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = sessions)]
pub struct Session {
    pub id: i32,
    pub user_id: i32,
    pub location_type: String,
    pub gym_id: Option<i32>,
    pub crag_id: Option<i32>,
    pub started_at: NaiveDateTime,
    pub ended_at: Option<NaiveDateTime>,
    pub duration_seconds: Option<i64>,
    pub climb_count: i32,
    pub tops_count: i32,
    pub projects_count: i32,
    pub hardest_grade: Option<String>,
    pub fistbump_count: i32,
    pub rating: Option<i32>,
    pub feeling: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Session {
    /// A session is active until it is explicitly ended.
    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }
}

/// DTO for starting a new session
#[derive(Debug, Insertable, Serialize, Deserialize)]
#[diesel(table_name = sessions)]
pub struct NewSession {
    pub user_id: i32,
    pub location_type: String,
    pub gym_id: Option<i32>,
    pub crag_id: Option<i32>,
    pub started_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Model for a fistbump row; the session's fistbump_count is the cardinality
/// of these rows, nothing else.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = session_fistbumps)]
pub struct SessionFistbump {
    pub id: i32,
    pub session_id: i32,
    pub user_id: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = session_fistbumps)]
pub struct NewSessionFistbump {
    pub session_id: i32,
    pub user_id: i32,
    pub created_at: NaiveDateTime,
}

/// Model for a participant row, ordered by added_at
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = session_participants)]
pub struct SessionParticipant {
    pub id: i32,
    pub session_id: i32,
    pub user_id: i32,
    pub added_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = session_participants)]
pub struct NewSessionParticipant {
    pub session_id: i32,
    pub user_id: i32,
    pub added_at: NaiveDateTime,
}

/// Full session card: the record plus its climbs and rosters
#[derive(Debug, Serialize)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub session: Session,
    pub climbs: Vec<Climb>,
    pub participants: Vec<UserSummary>,
    pub fistbumps: Vec<i32>,
    pub comments: Vec<CommentDetail>,
}
