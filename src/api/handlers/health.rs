use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": "cruxlog",
        })),
    )
}
