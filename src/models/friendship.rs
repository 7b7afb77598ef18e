use crate::schema::friendships;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_ACCEPTED: &str = "accepted";

/// Model for one directed friendship edge.
///
/// "Friends" is two complementary accepted edges; a lone pending edge
/// records an outstanding request from user_id to friend_id.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = friendships)]
pub struct Friendship {
    pub id: i32,
    pub user_id: i32,
    pub friend_id: i32,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Friendship {
    pub fn is_pending(&self) -> bool {
        self.status == STATUS_PENDING
    }

    pub fn is_accepted(&self) -> bool {
        self.status == STATUS_ACCEPTED
    }
}

/// DTO for inserting a friendship edge
#[derive(Debug, Insertable, Serialize, Deserialize)]
#[diesel(table_name = friendships)]
pub struct NewFriendship {
    pub user_id: i32,
    pub friend_id: i32,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Pairwise relation as reported to callers; direction of a pending request
/// is preserved so the UI can tell who is waiting on whom.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RelationStatus {
    None,
    Pending { requested_by: i32 },
    Accepted,
}
