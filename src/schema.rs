// Import diesel table macros
use diesel::allow_tables_to_appear_in_same_query;
use diesel::table;

table! {
    users (id) {
        id -> Integer,
        email -> Varchar,
        username -> Varchar,
        display_name -> Varchar,
        password_hash -> Varchar,
        avatar_url -> Nullable<Varchar>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    gyms (id) {
        id -> Integer,
        name -> Varchar,
        city -> Nullable<Varchar>,
        grading -> Nullable<Jsonb>,
    }
}

table! {
    crags (id) {
        id -> Integer,
        name -> Varchar,
        area -> Nullable<Varchar>,
        grading -> Nullable<Jsonb>,
    }
}

table! {
    sessions (id) {
        id -> Integer,
        user_id -> Integer,
        location_type -> Varchar,
        gym_id -> Nullable<Integer>,
        crag_id -> Nullable<Integer>,
        started_at -> Timestamp,
        ended_at -> Nullable<Timestamp>,
        duration_seconds -> Nullable<Bigint>,
        climb_count -> Integer,
        tops_count -> Integer,
        projects_count -> Integer,
        hardest_grade -> Nullable<Varchar>,
        fistbump_count -> Integer,
        rating -> Nullable<Integer>,
        feeling -> Nullable<Varchar>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    climbs (id) {
        id -> Integer,
        user_id -> Integer,
        climber_id -> Nullable<Integer>,
        session_id -> Nullable<Integer>,
        status -> Varchar,
        location_type -> Varchar,
        gym_id -> Nullable<Integer>,
        crag_id -> Nullable<Integer>,
        grade -> Varchar,
        style -> Nullable<Varchar>,
        attempts -> Nullable<Integer>,
        media_url -> Nullable<Varchar>,
        notes -> Nullable<Text>,
        created_at -> Timestamp,
    }
}

table! {
    friendships (id) {
        id -> Integer,
        user_id -> Integer,
        friend_id -> Integer,
        status -> Varchar,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    session_fistbumps (id) {
        id -> Integer,
        session_id -> Integer,
        user_id -> Integer,
        created_at -> Timestamp,
    }
}

table! {
    session_participants (id) {
        id -> Integer,
        session_id -> Integer,
        user_id -> Integer,
        added_at -> Timestamp,
    }
}

table! {
    comments (id) {
        id -> Integer,
        session_id -> Integer,
        author_id -> Integer,
        body -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    notifications (id) {
        id -> Integer,
        user_id -> Integer,
        kind -> Varchar,
        actor_id -> Integer,
        session_id -> Nullable<Integer>,
        comment_id -> Nullable<Integer>,
        read -> Bool,
        created_at -> Timestamp,
    }
}

allow_tables_to_appear_in_same_query!(
    users,
    gyms,
    crags,
    sessions,
    climbs,
    friendships,
    session_fistbumps,
    session_participants,
    comments,
    notifications,
);
