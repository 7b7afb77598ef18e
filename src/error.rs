use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

/// Error taxonomy for every core operation. Business-rule violations are
/// reported synchronously; nothing is retried here.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed input, rejected before any write
    #[error("{0}")]
    Validation(String),

    /// No verified caller identity on the request
    #[error("{0}")]
    Unauthorized(String),

    /// Caller is not the owner of the resource
    #[error("{0}")]
    Forbidden(String),

    /// Referenced record does not exist
    #[error("{0}")]
    NotFound(String),

    /// State-incompatible request; `code` distinguishes the cases
    /// (e.g. already_pending vs already_friends)
    #[error("{message}")]
    Conflict { code: &'static str, message: String },

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        ApiError::Conflict {
            code,
            message: message.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict { code, .. } => code,
            ApiError::Database(_) => "database_error",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("request failed: {}", self);
        }
        let body = Json(serde_json::json!({
            "error": self.to_string(),
            "code": self.code(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_codes_stay_distinguishable() {
        let pending = ApiError::conflict("already_pending", "friend request already pending");
        let friends = ApiError::conflict("already_friends", "users are already friends");
        assert_eq!(pending.status(), StatusCode::CONFLICT);
        assert_eq!(friends.status(), StatusCode::CONFLICT);
        assert_ne!(pending.code(), friends.code());
    }

    #[test]
    fn taxonomy_maps_to_http_statuses() {
        assert_eq!(
            ApiError::validation("grade is required").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::not_found("session not found").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::forbidden("not the session owner").status(),
            StatusCode::FORBIDDEN
        );
    }
}
