use crate::models::user::UserSummary;
use crate::schema::comments;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Model for a comment on a session
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = comments)]
pub struct Comment {
    pub id: i32,
    pub session_id: i32,
    pub author_id: i32,
    pub body: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// DTO for inserting a comment
#[derive(Debug, Insertable, Serialize, Deserialize)]
#[diesel(table_name = comments)]
pub struct NewComment {
    pub session_id: i32,
    pub author_id: i32,
    pub body: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Comment with its author resolved for display
#[derive(Debug, Serialize)]
pub struct CommentDetail {
    pub id: i32,
    pub session_id: i32,
    pub body: String,
    pub created_at: NaiveDateTime,
    pub author: UserSummary,
}
