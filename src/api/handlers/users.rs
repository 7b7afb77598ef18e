use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use tracing::debug;

use crate::api::CallerId;
use crate::db::{get_conn, DbPool};
use crate::error::ApiError;
use crate::models::user::{NewUser, UpdateUser, User};
use crate::schema::users;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub display_name: String,
    // Already hashed by the external hashing collaborator.
    pub password_hash: String,
    pub avatar_url: Option<String>,
}

/// Register a new account
pub async fn register(
    State(pool): State<DbPool>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = req.email.trim().to_string();
    let username = req.username.trim().to_string();
    if email.is_empty() {
        return Err(ApiError::validation("email is required"));
    }
    if username.is_empty() {
        return Err(ApiError::validation("username is required"));
    }
    if req.display_name.trim().is_empty() {
        return Err(ApiError::validation("display_name is required"));
    }
    if req.password_hash.is_empty() {
        return Err(ApiError::validation("password_hash is required"));
    }

    let mut conn = get_conn(&pool).await?;

    let email_taken: i64 = users::table
        .filter(users::email.eq(&email))
        .count()
        .get_result(&mut conn)
        .await?;
    if email_taken > 0 {
        return Err(ApiError::conflict("email_taken", "email is already in use"));
    }
    let username_taken: i64 = users::table
        .filter(users::username.eq(&username))
        .count()
        .get_result(&mut conn)
        .await?;
    if username_taken > 0 {
        return Err(ApiError::conflict(
            "username_taken",
            "username is already in use",
        ));
    }

    let now = Utc::now().naive_utc();
    let new_user = NewUser {
        email,
        username,
        display_name: req.display_name.trim().to_string(),
        password_hash: req.password_hash,
        avatar_url: req.avatar_url,
        created_at: now,
        updated_at: now,
    };
    let user: User = diesel::insert_into(users::table)
        .values(&new_user)
        .returning(User::as_returning())
        .get_result(&mut conn)
        .await?;
    debug!("Registered user {} ({})", user.id, user.username);

    Ok((StatusCode::CREATED, Json(user)))
}

/// Fetch a user's public profile
pub async fn get_user(
    State(pool): State<DbPool>,
    Path(user_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    let user: User = users::table
        .find(user_id)
        .select(User::as_select())
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::not_found(format!("user {user_id} not found")))?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    // Absent keeps the current avatar, an explicit null clears it, a
    // string replaces it.
    #[serde(default, deserialize_with = "double_option")]
    pub avatar_url: Option<Option<String>>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Update the caller's own profile
pub async fn update_profile(
    State(pool): State<DbPool>,
    CallerId(caller_id): CallerId,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(name) = &req.display_name {
        if name.trim().is_empty() {
            return Err(ApiError::validation("display_name must not be empty"));
        }
    }

    let mut conn = get_conn(&pool).await?;
    let changes = UpdateUser {
        display_name: req.display_name,
        avatar_url: req.avatar_url,
        updated_at: Utc::now().naive_utc(),
    };
    let user: User = diesel::update(users::table.find(caller_id))
        .set(&changes)
        .returning(User::as_returning())
        .get_result(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::not_found(format!("user {caller_id} not found")))?;
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_avatar_field_keeps_the_current_avatar() {
        let req: UpdateProfileRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(req.avatar_url, None);
    }

    #[test]
    fn null_avatar_clears_it() {
        let req: UpdateProfileRequest = serde_json::from_str(r#"{"avatar_url": null}"#).unwrap();
        assert_eq!(req.avatar_url, Some(None));
    }

    #[test]
    fn string_avatar_replaces_it() {
        let req: UpdateProfileRequest =
            serde_json::from_str(r#"{"avatar_url": "https://cdn.example/me.jpg"}"#).unwrap();
        assert_eq!(
            req.avatar_url,
            Some(Some("https://cdn.example/me.jpg".to_string()))
        );
    }
}
