//! Reactions and session engagement: fistbump toggling, the participant
//! roster of an active session, and comments.

use crate::db::DbConnection;
use crate::domain::{find_session, notifications, user_exists, user_summary_map};
use crate::error::ApiError;
use crate::models::comment::{Comment, CommentDetail, NewComment};
use crate::models::notification::NotificationKind;
use crate::models::session::{NewSessionFistbump, NewSessionParticipant, Session};
use crate::models::user::UserSummary;
use crate::schema::{comments, session_fistbumps, session_participants, sessions, users};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Serialize;
use tracing::debug;

/// Result of a fistbump toggle
#[derive(Debug, Serialize)]
pub struct FistbumpOutcome {
    pub fistbumped: bool,
    pub fistbump_count: i32,
}

/// Effect of one toggle, decided from the caller's current membership.
/// Repeated toggles alternate between the two arms, and only the add arm
/// can notify: removal is silent, and an owner bumping their own session
/// notifies nobody.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToggleAction {
    Remove,
    Add { notify_owner: bool },
}

const fn toggle_action(already_bumped: bool, caller_id: i32, owner_id: i32) -> ToggleAction {
    if already_bumped {
        ToggleAction::Remove
    } else {
        ToggleAction::Add {
            notify_owner: caller_id != owner_id,
        }
    }
}

/// Toggle the caller's fistbump on a session. Adding notifies the session
/// owner (never on removal, never when the owner bumps their own session);
/// the materialized count is recomputed from the rows after every toggle.
pub async fn toggle_fistbump(
    conn: &mut DbConnection,
    session_id: i32,
    caller_id: i32,
) -> Result<FistbumpOutcome, ApiError> {
    let session = find_session(conn, session_id).await?;

    let existing: i64 = session_fistbumps::table
        .filter(session_fistbumps::session_id.eq(session_id))
        .filter(session_fistbumps::user_id.eq(caller_id))
        .count()
        .get_result(conn)
        .await?;

    let fistbumped = match toggle_action(existing > 0, caller_id, session.user_id) {
        ToggleAction::Remove => {
            diesel::delete(
                session_fistbumps::table
                    .filter(session_fistbumps::session_id.eq(session_id))
                    .filter(session_fistbumps::user_id.eq(caller_id)),
            )
            .execute(conn)
            .await?;
            false
        }
        ToggleAction::Add { notify_owner } => {
            let row = NewSessionFistbump {
                session_id,
                user_id: caller_id,
                created_at: Utc::now().naive_utc(),
            };
            diesel::insert_into(session_fistbumps::table)
                .values(&row)
                .execute(conn)
                .await?;
            if notify_owner {
                notifications::notify(
                    conn,
                    session.user_id,
                    NotificationKind::Fistbump,
                    caller_id,
                    Some(session_id),
                    None,
                )
                .await?;
            }
            true
        }
    };

    let fistbump_count = recompute_fistbump_count(conn, session_id).await?;
    debug!(
        "Fistbump toggle on session {} by {}: now {} ({} total)",
        session_id, caller_id, fistbumped, fistbump_count
    );
    Ok(FistbumpOutcome {
        fistbumped,
        fistbump_count,
    })
}

/// Write the cardinality of the fistbump set back to the session row; the
/// count is a cache of the rows, never an independent counter.
async fn recompute_fistbump_count(
    conn: &mut DbConnection,
    session_id: i32,
) -> Result<i32, ApiError> {
    let count: i64 = session_fistbumps::table
        .filter(session_fistbumps::session_id.eq(session_id))
        .count()
        .get_result(conn)
        .await?;
    let count = count as i32;
    diesel::update(sessions::table.find(session_id))
        .set(sessions::fistbump_count.eq(count))
        .execute(conn)
        .await?;
    Ok(count)
}

/// User ids that have fistbumped a session, oldest first
pub async fn fistbump_user_ids(
    conn: &mut DbConnection,
    session_id: i32,
) -> Result<Vec<i32>, ApiError> {
    let ids = session_fistbumps::table
        .filter(session_fistbumps::session_id.eq(session_id))
        .order_by(session_fistbumps::created_at.asc())
        .select(session_fistbumps::user_id)
        .load(conn)
        .await?;
    Ok(ids)
}

fn require_owner(session: &Session, caller_id: i32) -> Result<(), ApiError> {
    if session.user_id != caller_id {
        return Err(ApiError::forbidden(
            "only the session owner can manage participants",
        ));
    }
    Ok(())
}

fn require_active(session: &Session) -> Result<(), ApiError> {
    if !session.is_active() {
        return Err(ApiError::conflict(
            "session_ended",
            "participants cannot change once a session has ended",
        ));
    }
    Ok(())
}

/// Add a co-climber to an active session; owner-only
pub async fn add_participant(
    conn: &mut DbConnection,
    session_id: i32,
    caller_id: i32,
    participant_id: i32,
) -> Result<(), ApiError> {
    let session = find_session(conn, session_id).await?;
    require_owner(&session, caller_id)?;
    require_active(&session)?;
    if !user_exists(conn, participant_id).await? {
        return Err(ApiError::not_found(format!(
            "user {participant_id} not found"
        )));
    }

    let present: i64 = session_participants::table
        .filter(session_participants::session_id.eq(session_id))
        .filter(session_participants::user_id.eq(participant_id))
        .count()
        .get_result(conn)
        .await?;
    if present > 0 {
        return Err(ApiError::conflict(
            "duplicate_participant",
            format!("user {participant_id} is already a participant"),
        ));
    }

    let row = NewSessionParticipant {
        session_id,
        user_id: participant_id,
        added_at: Utc::now().naive_utc(),
    };
    diesel::insert_into(session_participants::table)
        .values(&row)
        .execute(conn)
        .await?;
    Ok(())
}

/// Remove a participant from an active session; owner-only. Removing
/// someone who was never on the roster is a no-op success.
pub async fn remove_participant(
    conn: &mut DbConnection,
    session_id: i32,
    caller_id: i32,
    participant_id: i32,
) -> Result<(), ApiError> {
    let session = find_session(conn, session_id).await?;
    require_owner(&session, caller_id)?;
    require_active(&session)?;

    diesel::delete(
        session_participants::table
            .filter(session_participants::session_id.eq(session_id))
            .filter(session_participants::user_id.eq(participant_id)),
    )
    .execute(conn)
    .await?;
    Ok(())
}

/// The participant roster in the order climbers were added
pub async fn participant_roster(
    conn: &mut DbConnection,
    session_id: i32,
) -> Result<Vec<UserSummary>, ApiError> {
    let ids: Vec<i32> = session_participants::table
        .filter(session_participants::session_id.eq(session_id))
        .order_by(session_participants::added_at.asc())
        .select(session_participants::user_id)
        .load(conn)
        .await?;
    let mut summaries = user_summary_map(conn, &ids).await?;
    Ok(ids
        .into_iter()
        .filter_map(|id| summaries.remove(&id))
        .collect())
}

/// Normalize a comment body: trimmed, and only kept when non-empty
pub fn normalized_comment_body(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Comment on a session; notifies the owner unless they comment themselves
pub async fn create_comment(
    conn: &mut DbConnection,
    session_id: i32,
    author_id: i32,
    body: &str,
) -> Result<Comment, ApiError> {
    let body = normalized_comment_body(body)
        .ok_or_else(|| ApiError::validation("comment body must not be empty"))?;
    let session = find_session(conn, session_id).await?;

    let now = Utc::now().naive_utc();
    let row = NewComment {
        session_id,
        author_id,
        body,
        created_at: now,
        updated_at: now,
    };
    let comment: Comment = diesel::insert_into(comments::table)
        .values(&row)
        .returning(Comment::as_returning())
        .get_result(conn)
        .await?;

    if author_id != session.user_id {
        notifications::notify(
            conn,
            session.user_id,
            NotificationKind::Comment,
            author_id,
            Some(session_id),
            Some(comment.id),
        )
        .await?;
    }
    Ok(comment)
}

/// Delete a comment; author-only
pub async fn delete_comment(
    conn: &mut DbConnection,
    comment_id: i32,
    caller_id: i32,
) -> Result<(), ApiError> {
    let comment: Comment = comments::table
        .find(comment_id)
        .select(Comment::as_select())
        .first(conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::not_found(format!("comment {comment_id} not found")))?;
    if comment.author_id != caller_id {
        return Err(ApiError::forbidden("only the author can delete a comment"));
    }
    diesel::delete(comments::table.find(comment_id))
        .execute(conn)
        .await?;
    Ok(())
}

/// A session's comments with their authors, newest first
pub async fn list_comments(
    conn: &mut DbConnection,
    session_id: i32,
) -> Result<Vec<CommentDetail>, ApiError> {
    let rows: Vec<(Comment, (i32, String, String, Option<String>))> = comments::table
        .inner_join(users::table.on(users::id.eq(comments::author_id)))
        .filter(comments::session_id.eq(session_id))
        .order_by(comments::created_at.desc())
        .select((
            Comment::as_select(),
            (
                users::id,
                users::username,
                users::display_name,
                users::avatar_url,
            ),
        ))
        .load(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(c, (id, username, display_name, avatar_url))| CommentDetail {
            id: c.id,
            session_id: c.session_id,
            body: c.body,
            created_at: c.created_at,
            author: UserSummary {
                id,
                username,
                display_name,
                avatar_url,
            },
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    // Replay toggle decisions against an in-memory fistbump set, counting
    // the notifications each toggle would emit.
    fn apply_toggle(set: &mut HashSet<i32>, caller_id: i32, owner_id: i32) -> usize {
        match toggle_action(set.contains(&caller_id), caller_id, owner_id) {
            ToggleAction::Remove => {
                set.remove(&caller_id);
                0
            }
            ToggleAction::Add { notify_owner } => {
                set.insert(caller_id);
                usize::from(notify_owner)
            }
        }
    }

    #[test]
    fn double_toggle_restores_the_original_set() {
        let owner = 1;
        let caller = 2;
        let mut set = HashSet::from([5, 6]);
        let before = set.clone();

        let mut notified = apply_toggle(&mut set, caller, owner);
        assert!(set.contains(&caller));
        notified += apply_toggle(&mut set, caller, owner);

        assert_eq!(set, before);
        assert!(!set.contains(&caller));
        // Only the add notifies; the removing half of the pair is silent.
        assert_eq!(notified, 1);
    }

    #[test]
    fn owner_bumping_their_own_session_notifies_nobody() {
        let owner = 7;
        let mut set = HashSet::new();
        let notified = apply_toggle(&mut set, owner, owner);
        assert!(set.contains(&owner));
        assert_eq!(notified, 0);
    }

    #[test]
    fn removal_is_always_silent() {
        assert_eq!(toggle_action(true, 2, 1), ToggleAction::Remove);
        assert_eq!(toggle_action(true, 1, 1), ToggleAction::Remove);
    }

    #[test]
    fn add_notifies_exactly_when_caller_is_not_the_owner() {
        assert_eq!(
            toggle_action(false, 2, 1),
            ToggleAction::Add { notify_owner: true }
        );
        assert_eq!(
            toggle_action(false, 1, 1),
            ToggleAction::Add {
                notify_owner: false
            }
        );
    }

    #[test]
    fn comment_bodies_are_trimmed() {
        assert_eq!(
            normalized_comment_body("  nice send!  ").as_deref(),
            Some("nice send!")
        );
    }

    #[test]
    fn whitespace_only_comments_are_rejected() {
        assert_eq!(normalized_comment_body("   \n\t "), None);
        assert_eq!(normalized_comment_body(""), None);
    }
}
