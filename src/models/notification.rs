use crate::models::user::UserSummary;
use crate::schema::notifications;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Model for a notification row
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = notifications)]
pub struct Notification {
    pub id: i32,
    // Recipient of the notification.
    pub user_id: i32,
    pub kind: String,
    pub actor_id: i32,
    pub session_id: Option<i32>,
    pub comment_id: Option<i32>,
    pub read: bool,
    pub created_at: NaiveDateTime,
}

/// DTO for inserting a notification
#[derive(Debug, Insertable, Serialize, Deserialize)]
#[diesel(table_name = notifications)]
pub struct NewNotification {
    pub user_id: i32,
    pub kind: String,
    pub actor_id: i32,
    pub session_id: Option<i32>,
    pub comment_id: Option<i32>,
    pub read: bool,
    pub created_at: NaiveDateTime,
}

/// The social events that fan out notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    FriendRequest,
    Fistbump,
    Comment,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::FriendRequest => "friend_request",
            NotificationKind::Fistbump => "fistbump",
            NotificationKind::Comment => "comment",
        }
    }
}

/// Notification with its actor resolved for display
#[derive(Debug, Serialize)]
pub struct NotificationDetail {
    pub id: i32,
    pub kind: String,
    pub session_id: Option<i32>,
    pub comment_id: Option<i32>,
    pub read: bool,
    pub created_at: NaiveDateTime,
    pub actor: UserSummary,
}
