//! Notification fan-out and read lifecycle. Rows are only ever created as a
//! side effect of other mutations (friend request, fistbump, comment); there
//! is no endpoint that creates one directly.

use crate::db::DbConnection;
use crate::domain::PAGE_SIZE;
use crate::error::ApiError;
use crate::models::notification::{
    NewNotification, Notification, NotificationDetail, NotificationKind,
};
use crate::schema::{notifications, users};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

/// Insert one unread notification. Self-notifications are never emitted:
/// call sites check actor != recipient, and the guard here makes the
/// contract hold even if a new call site forgets.
pub async fn notify(
    conn: &mut DbConnection,
    recipient_id: i32,
    kind: NotificationKind,
    actor_id: i32,
    session_id: Option<i32>,
    comment_id: Option<i32>,
) -> Result<(), ApiError> {
    if recipient_id == actor_id {
        return Ok(());
    }
    debug!(
        "Fanning out {} notification from {} to {}",
        kind.as_str(),
        actor_id,
        recipient_id
    );
    let row = NewNotification {
        user_id: recipient_id,
        kind: kind.as_str().to_string(),
        actor_id,
        session_id,
        comment_id,
        read: false,
        created_at: Utc::now().naive_utc(),
    };
    diesel::insert_into(notifications::table)
        .values(&row)
        .execute(conn)
        .await?;
    Ok(())
}

/// Remove the friend_request notifications recording one specific pending
/// request, used when that request is accepted or rejected.
pub async fn delete_friend_request_notifications(
    conn: &mut DbConnection,
    recipient_id: i32,
    actor_id: i32,
) -> Result<(), ApiError> {
    diesel::delete(
        notifications::table
            .filter(notifications::user_id.eq(recipient_id))
            .filter(notifications::actor_id.eq(actor_id))
            .filter(notifications::kind.eq(NotificationKind::FriendRequest.as_str())),
    )
    .execute(conn)
    .await?;
    Ok(())
}

/// The recipient's notifications, newest first, actor resolved for display
pub async fn list(
    conn: &mut DbConnection,
    caller_id: i32,
) -> Result<Vec<NotificationDetail>, ApiError> {
    let rows: Vec<(Notification, (i32, String, String, Option<String>))> = notifications::table
        .inner_join(users::table.on(users::id.eq(notifications::actor_id)))
        .filter(notifications::user_id.eq(caller_id))
        .order_by(notifications::created_at.desc())
        .limit(PAGE_SIZE)
        .select((
            Notification::as_select(),
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
        .map(|(n, (id, username, display_name, avatar_url))| NotificationDetail {
            id: n.id,
            kind: n.kind,
            session_id: n.session_id,
            comment_id: n.comment_id,
            read: n.read,
            created_at: n.created_at,
            actor: crate::models::user::UserSummary {
                id,
                username,
                display_name,
                avatar_url,
            },
        })
        .collect())
}

/// Mark one notification read; recipient-scoped
pub async fn mark_read(
    conn: &mut DbConnection,
    caller_id: i32,
    notification_id: i32,
) -> Result<(), ApiError> {
    let affected = diesel::update(
        notifications::table
            .filter(notifications::id.eq(notification_id))
            .filter(notifications::user_id.eq(caller_id)),
    )
    .set(notifications::read.eq(true))
    .execute(conn)
    .await?;
    if affected == 0 {
        return Err(ApiError::not_found(format!(
            "notification {notification_id} not found"
        )));
    }
    Ok(())
}

/// Mark everything read; succeeds even when nothing was unread
pub async fn mark_all_read(conn: &mut DbConnection, caller_id: i32) -> Result<usize, ApiError> {
    let affected = diesel::update(
        notifications::table
            .filter(notifications::user_id.eq(caller_id))
            .filter(notifications::read.eq(false)),
    )
    .set(notifications::read.eq(true))
    .execute(conn)
    .await?;
    Ok(affected)
}

/// Delete one notification; recipient-scoped
pub async fn delete(
    conn: &mut DbConnection,
    caller_id: i32,
    notification_id: i32,
) -> Result<(), ApiError> {
    let affected = diesel::delete(
        notifications::table
            .filter(notifications::id.eq(notification_id))
            .filter(notifications::user_id.eq(caller_id)),
    )
    .execute(conn)
    .await?;
    if affected == 0 {
        return Err(ApiError::not_found(format!(
            "notification {notification_id} not found"
        )));
    }
    Ok(())
}
