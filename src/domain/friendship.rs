//! Friendship state machine over directed edges. A pending request is a
//! single edge requester -> target; acceptance flips it and inserts the
//! complementary edge, so "friends" is always two accepted rows.

use crate::db::DbConnection;
use crate::domain::{notifications, user_exists};
use crate::error::ApiError;
use crate::models::friendship::{
    Friendship, NewFriendship, RelationStatus, STATUS_ACCEPTED, STATUS_PENDING,
};
use crate::models::notification::NotificationKind;
use crate::schema::friendships;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

/// All edges between a pair, in either direction (at most two)
async fn edges_between(
    conn: &mut DbConnection,
    a: i32,
    b: i32,
) -> Result<Vec<Friendship>, ApiError> {
    let rows = friendships::table
        .filter(
            friendships::user_id
                .eq(a)
                .and(friendships::friend_id.eq(b))
                .or(friendships::user_id.eq(b).and(friendships::friend_id.eq(a))),
        )
        .select(Friendship::as_select())
        .load(conn)
        .await?;
    Ok(rows)
}

/// Conflict raised by an existing relation, if any. Pending and accepted
/// must stay distinguishable in the payload.
fn existing_relation_conflict(edges: &[Friendship]) -> Option<ApiError> {
    if edges.iter().any(Friendship::is_accepted) {
        return Some(ApiError::conflict(
            "already_friends",
            "users are already friends",
        ));
    }
    if edges.iter().any(Friendship::is_pending) {
        return Some(ApiError::conflict(
            "already_pending",
            "a friend request is already pending",
        ));
    }
    None
}

/// Pairwise relation derived from the edges between two users
fn relation_from_edges(edges: &[Friendship]) -> RelationStatus {
    if edges.iter().any(Friendship::is_accepted) {
        return RelationStatus::Accepted;
    }
    match edges.iter().find(|e| e.is_pending()) {
        Some(edge) => RelationStatus::Pending {
            requested_by: edge.user_id,
        },
        None => RelationStatus::None,
    }
}

/// Send a friend request from caller to other
pub async fn request(conn: &mut DbConnection, caller_id: i32, other_id: i32) -> Result<(), ApiError> {
    if caller_id == other_id {
        return Err(ApiError::conflict(
            "self_friend",
            "cannot send a friend request to yourself",
        ));
    }
    if !user_exists(conn, other_id).await? {
        return Err(ApiError::not_found(format!("user {other_id} not found")));
    }

    let edges = edges_between(conn, caller_id, other_id).await?;
    if let Some(conflict) = existing_relation_conflict(&edges) {
        return Err(conflict);
    }

    let now = Utc::now().naive_utc();
    let edge = NewFriendship {
        user_id: caller_id,
        friend_id: other_id,
        status: STATUS_PENDING.to_string(),
        created_at: now,
        updated_at: now,
    };
    diesel::insert_into(friendships::table)
        .values(&edge)
        .execute(conn)
        .await?;
    debug!("Friend request created: {} -> {}", caller_id, other_id);

    notifications::notify(
        conn,
        other_id,
        NotificationKind::FriendRequest,
        caller_id,
        None,
        None,
    )
    .await
}

/// The pending edge requester -> target, or NotFound
async fn pending_edge(
    conn: &mut DbConnection,
    requester_id: i32,
    target_id: i32,
) -> Result<Friendship, ApiError> {
    friendships::table
        .filter(friendships::user_id.eq(requester_id))
        .filter(friendships::friend_id.eq(target_id))
        .filter(friendships::status.eq(STATUS_PENDING))
        .select(Friendship::as_select())
        .first(conn)
        .await
        .optional()?
        .ok_or_else(|| {
            ApiError::not_found(format!(
                "no pending friend request from user {requester_id}"
            ))
        })
}

/// Accept a pending request: flip the edge, insert the reverse accepted edge
/// and drop the request notification
pub async fn accept(
    conn: &mut DbConnection,
    caller_id: i32,
    requester_id: i32,
) -> Result<(), ApiError> {
    let edge = pending_edge(conn, requester_id, caller_id).await?;

    let now = Utc::now().naive_utc();
    diesel::update(friendships::table.find(edge.id))
        .set((
            friendships::status.eq(STATUS_ACCEPTED),
            friendships::updated_at.eq(now),
        ))
        .execute(conn)
        .await?;

    let reverse = NewFriendship {
        user_id: caller_id,
        friend_id: requester_id,
        status: STATUS_ACCEPTED.to_string(),
        created_at: now,
        updated_at: now,
    };
    diesel::insert_into(friendships::table)
        .values(&reverse)
        .execute(conn)
        .await?;
    debug!("Friendship accepted: {} <-> {}", caller_id, requester_id);

    notifications::delete_friend_request_notifications(conn, caller_id, requester_id).await
}

/// Reject a pending request: delete the edge and its notification
pub async fn reject(
    conn: &mut DbConnection,
    caller_id: i32,
    requester_id: i32,
) -> Result<(), ApiError> {
    let edge = pending_edge(conn, requester_id, caller_id).await?;
    diesel::delete(friendships::table.find(edge.id))
        .execute(conn)
        .await?;
    notifications::delete_friend_request_notifications(conn, caller_id, requester_id).await
}

/// Unfriend: drop both directional edges whatever their status. Idempotent;
/// removing a relation that never existed still succeeds.
pub async fn remove(conn: &mut DbConnection, caller_id: i32, other_id: i32) -> Result<(), ApiError> {
    diesel::delete(
        friendships::table.filter(
            friendships::user_id
                .eq(caller_id)
                .and(friendships::friend_id.eq(other_id))
                .or(friendships::user_id
                    .eq(other_id)
                    .and(friendships::friend_id.eq(caller_id))),
        ),
    )
    .execute(conn)
    .await?;
    Ok(())
}

/// Ids of everyone the user holds an accepted edge to
pub async fn friend_ids(conn: &mut DbConnection, user_id: i32) -> Result<Vec<i32>, ApiError> {
    let ids = friendships::table
        .filter(friendships::user_id.eq(user_id))
        .filter(friendships::status.eq(STATUS_ACCEPTED))
        .select(friendships::friend_id)
        .load(conn)
        .await?;
    Ok(ids)
}

/// Pairwise status between two users, with pending direction preserved
pub async fn relation(
    conn: &mut DbConnection,
    caller_id: i32,
    other_id: i32,
) -> Result<RelationStatus, ApiError> {
    let edges = edges_between(conn, caller_id, other_id).await?;
    Ok(relation_from_edges(&edges))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn edge(user_id: i32, friend_id: i32, status: &str) -> Friendship {
        let t = NaiveDate::from_ymd_opt(2026, 8, 20)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        Friendship {
            id: 1,
            user_id,
            friend_id,
            status: status.to_string(),
            created_at: t,
            updated_at: t,
        }
    }

    #[test]
    fn no_edges_means_no_conflict() {
        assert!(existing_relation_conflict(&[]).is_none());
    }

    #[test]
    fn pending_edge_conflicts_as_already_pending() {
        let edges = vec![edge(1, 2, STATUS_PENDING)];
        match existing_relation_conflict(&edges) {
            Some(ApiError::Conflict { code, .. }) => assert_eq!(code, "already_pending"),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn accepted_edges_conflict_as_already_friends() {
        let edges = vec![edge(1, 2, STATUS_ACCEPTED), edge(2, 1, STATUS_ACCEPTED)];
        match existing_relation_conflict(&edges) {
            Some(ApiError::Conflict { code, .. }) => assert_eq!(code, "already_friends"),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn relation_preserves_pending_direction() {
        let edges = vec![edge(4, 9, STATUS_PENDING)];
        match relation_from_edges(&edges) {
            RelationStatus::Pending { requested_by } => assert_eq!(requested_by, 4),
            other => panic!("expected pending, got {other:?}"),
        }
    }

    #[test]
    fn relation_reports_accepted_and_none() {
        let edges = vec![edge(1, 2, STATUS_ACCEPTED), edge(2, 1, STATUS_ACCEPTED)];
        assert!(matches!(
            relation_from_edges(&edges),
            RelationStatus::Accepted
        ));
        assert!(matches!(relation_from_edges(&[]), RelationStatus::None));
    }
}
