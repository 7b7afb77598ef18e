//! Feed composition: two independently-queried streams (standalone top
//! climbs and ended sessions from the caller and their accepted friends)
//! merged into one reverse-chronological timeline. Holds no state of its
//! own; the result is re-derivable from the two source queries alone.

use crate::db::DbConnection;
use crate::domain::{friendship, PAGE_SIZE};
use crate::error::ApiError;
use crate::models::climb::{Climb, ClimbStatus};
use crate::models::session::Session;
use crate::schema::{climbs, sessions};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// A session as it appears in the feed, carrying its nested climbs
#[derive(Debug, Serialize)]
pub struct SessionCard {
    #[serde(flatten)]
    pub session: Session,
    pub climbs: Vec<Climb>,
}

/// One unified feed entry
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FeedItem {
    Climb(Climb),
    Session(SessionCard),
}

fn sort_key(item: &FeedItem) -> NaiveDateTime {
    match item {
        FeedItem::Climb(climb) => climb.created_at,
        // Sessions enter the feed only once ended; started_at covers the
        // degenerate case of a card built from an active session elsewhere.
        FeedItem::Session(card) => card.session.ended_at.unwrap_or(card.session.started_at),
    }
}

/// Merge the two streams. A standalone climb is dropped when its session is
/// already shown, so the same climb never appears twice. Descending by the
/// session's end time versus the climb's creation time; ties keep the
/// underlying retrieval order (stable sort).
pub fn compose(standalone_climbs: Vec<Climb>, session_cards: Vec<SessionCard>) -> Vec<FeedItem> {
    let shown_sessions: HashSet<i32> = session_cards.iter().map(|c| c.session.id).collect();

    let mut items: Vec<FeedItem> = session_cards.into_iter().map(FeedItem::Session).collect();
    items.extend(
        standalone_climbs
            .into_iter()
            .filter(|climb| match climb.session_id {
                Some(session_id) => !shown_sessions.contains(&session_id),
                None => true,
            })
            .map(FeedItem::Climb),
    );

    items.sort_by(|a, b| sort_key(b).cmp(&sort_key(a)));
    items
}

/// The caller's feed: own and accepted friends' activity
pub async fn list_feed(conn: &mut DbConnection, caller_id: i32) -> Result<Vec<FeedItem>, ApiError> {
    let mut audience = friendship::friend_ids(conn, caller_id).await?;
    audience.push(caller_id);

    let top_climbs: Vec<Climb> = climbs::table
        .filter(climbs::user_id.eq_any(audience.clone()))
        .filter(climbs::status.eq(ClimbStatus::Top.as_str()))
        .order_by(climbs::created_at.desc())
        .limit(PAGE_SIZE)
        .select(Climb::as_select())
        .load(conn)
        .await?;

    let ended_sessions: Vec<Session> = sessions::table
        .filter(sessions::user_id.eq_any(audience))
        .filter(sessions::ended_at.is_not_null())
        .order_by(sessions::ended_at.desc())
        .limit(PAGE_SIZE)
        .select(Session::as_select())
        .load(conn)
        .await?;

    let session_ids: Vec<i32> = ended_sessions.iter().map(|s| s.id).collect();
    let mut nested: HashMap<i32, Vec<Climb>> = HashMap::new();
    if !session_ids.is_empty() {
        let nullable_ids: Vec<Option<i32>> = session_ids.iter().map(|id| Some(*id)).collect();
        let rows: Vec<Climb> = climbs::table
            .filter(climbs::session_id.eq_any(nullable_ids))
            .order_by(climbs::created_at.asc())
            .select(Climb::as_select())
            .load(conn)
            .await?;
        for climb in rows {
            if let Some(session_id) = climb.session_id {
                nested.entry(session_id).or_default().push(climb);
            }
        }
    }

    let cards = ended_sessions
        .into_iter()
        .map(|session| {
            let climbs = nested.remove(&session.id).unwrap_or_default();
            SessionCard { session, climbs }
        })
        .collect();

    Ok(compose(top_climbs, cards))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 20)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    fn climb(id: i32, session_id: Option<i32>, created_at: NaiveDateTime) -> Climb {
        Climb {
            id,
            user_id: 2,
            climber_id: None,
            session_id,
            status: "top".to_string(),
            location_type: "indoor".to_string(),
            gym_id: Some(1),
            crag_id: None,
            grade: "V4".to_string(),
            style: None,
            attempts: Some(2),
            media_url: None,
            notes: None,
            created_at,
        }
    }

    fn ended_session(id: i32, ended_at: NaiveDateTime) -> Session {
        Session {
            id,
            user_id: 2,
            location_type: "indoor".to_string(),
            gym_id: Some(1),
            crag_id: None,
            started_at: at(9, 0),
            ended_at: Some(ended_at),
            duration_seconds: Some(3600),
            climb_count: 1,
            tops_count: 1,
            projects_count: 0,
            hardest_grade: Some("V4".to_string()),
            fistbump_count: 0,
            rating: None,
            feeling: None,
            created_at: at(9, 0),
            updated_at: ended_at,
        }
    }

    #[test]
    fn climb_nested_in_a_shown_session_is_not_repeated() {
        let session = ended_session(10, at(12, 0));
        let in_session = climb(1, Some(10), at(11, 0));
        let standalone = climb(2, None, at(13, 0));
        let card = SessionCard {
            session,
            climbs: vec![in_session.clone()],
        };

        let feed = compose(vec![in_session, standalone], vec![card]);
        assert_eq!(feed.len(), 2);
        let repeated = feed
            .iter()
            .filter(|item| matches!(item, FeedItem::Climb(c) if c.id == 1))
            .count();
        assert_eq!(repeated, 0);
    }

    #[test]
    fn climb_from_an_unshown_session_still_appears() {
        let orphan = climb(3, Some(99), at(10, 0));
        let feed = compose(vec![orphan], vec![]);
        assert!(matches!(&feed[0], FeedItem::Climb(c) if c.id == 3));
    }

    #[test]
    fn feed_is_reverse_chronological_across_both_streams() {
        let early_session = SessionCard {
            session: ended_session(10, at(10, 0)),
            climbs: vec![],
        };
        let late_session = SessionCard {
            session: ended_session(11, at(15, 0)),
            climbs: vec![],
        };
        let mid_climb = climb(4, None, at(12, 30));

        let feed = compose(vec![mid_climb], vec![early_session, late_session]);
        let keys: Vec<NaiveDateTime> = feed.iter().map(sort_key).collect();
        assert_eq!(keys, vec![at(15, 0), at(12, 30), at(10, 0)]);
    }

    #[test]
    fn empty_sources_compose_to_an_empty_feed() {
        assert!(compose(vec![], vec![]).is_empty());
    }
}
