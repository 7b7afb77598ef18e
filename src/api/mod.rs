mod auth;
mod handlers;

pub use auth::CallerId;

use crate::config::Config;
use crate::db::Database;
use anyhow::Result;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Start the API server
pub async fn start_api_server(db: Arc<Database>, config: &Config) -> Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        // General routes
        .route("/health", get(handlers::health::health_check))
        // User routes
        .route("/api/users", post(handlers::users::register))
        .route("/api/users/:id", get(handlers::users::get_user))
        .route("/api/users/:id/sessions", get(handlers::sessions::get_user_sessions))
        .route("/api/users/:id/climbs", get(handlers::climbs::get_user_climbs))
        .route("/api/profile", patch(handlers::users::update_profile))
        // Climb routes
        .route("/api/climbs", post(handlers::climbs::create_climb))
        .route(
            "/api/climbs/:id",
            get(handlers::climbs::get_climb).delete(handlers::climbs::delete_climb),
        )
        // Session routes
        .route("/api/sessions", post(handlers::sessions::create_session))
        .route(
            "/api/sessions/:id",
            get(handlers::sessions::get_session).delete(handlers::sessions::delete_session),
        )
        .route("/api/sessions/:id/end", post(handlers::sessions::end_session))
        .route(
            "/api/sessions/:id/fistbump",
            post(handlers::sessions::toggle_fistbump),
        )
        .route(
            "/api/sessions/:id/participants",
            post(handlers::sessions::add_participant),
        )
        .route(
            "/api/sessions/:id/participants/:user_id",
            delete(handlers::sessions::remove_participant),
        )
        .route(
            "/api/sessions/:id/comments",
            get(handlers::comments::get_session_comments)
                .post(handlers::comments::create_comment),
        )
        .route("/api/comments/:id", delete(handlers::comments::delete_comment))
        // Friendship routes
        .route("/api/friends", get(handlers::friends::get_friends))
        .route(
            "/api/friends/:id/request",
            post(handlers::friends::request_friend),
        )
        .route(
            "/api/friends/:id/accept",
            post(handlers::friends::accept_friend),
        )
        .route(
            "/api/friends/:id/reject",
            post(handlers::friends::reject_friend),
        )
        .route("/api/friends/:id", delete(handlers::friends::remove_friend))
        .route(
            "/api/friends/:id/status",
            get(handlers::friends::get_friend_status),
        )
        // Feed
        .route("/api/feed", get(handlers::feed::get_feed))
        // Notifications
        .route(
            "/api/notifications",
            get(handlers::notifications::get_notifications),
        )
        .route(
            "/api/notifications/read-all",
            post(handlers::notifications::mark_all_read),
        )
        .route(
            "/api/notifications/:id/read",
            post(handlers::notifications::mark_read),
        )
        .route(
            "/api/notifications/:id",
            delete(handlers::notifications::delete_notification),
        )
        // Location routes
        .route(
            "/api/gyms",
            get(handlers::locations::get_gyms).post(handlers::locations::create_gym),
        )
        .route("/api/gyms/:id", get(handlers::locations::get_gym))
        .route("/api/gyms/:id/grades", get(handlers::locations::get_gym_grades))
        .route(
            "/api/crags",
            get(handlers::locations::get_crags).post(handlers::locations::create_crag),
        )
        .route("/api/crags/:id", get(handlers::locations::get_crag))
        .route(
            "/api/crags/:id/grades",
            get(handlers::locations::get_crag_grades),
        )
        // Add state and middleware
        .with_state(db.get_pool().clone())
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = format!("{}:{}", config.server.host, config.server.port).parse::<SocketAddr>()?;

    info!("Starting API server on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
