use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;

use crate::db::{get_conn, DbPool};
use crate::domain::grades;
use crate::error::ApiError;
use crate::models::location::{Crag, Gym, NewCrag, NewGym};
use crate::schema::{crags, gyms};

/// List gyms
pub async fn get_gyms(State(pool): State<DbPool>) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    let rows: Vec<Gym> = gyms::table
        .order_by(gyms::name.asc())
        .select(Gym::as_select())
        .load(&mut conn)
        .await?;
    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
pub struct CreateGymRequest {
    pub name: String,
    pub city: Option<String>,
    pub grading: Option<Vec<String>>,
}

/// Register a gym, optionally with a custom grade palette
pub async fn create_gym(
    State(pool): State<DbPool>,
    Json(req): Json<CreateGymRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::validation("name is required"));
    }
    let mut conn = get_conn(&pool).await?;
    let new_gym = NewGym {
        name: req.name.trim().to_string(),
        city: req.city,
        grading: req.grading.map(|g| serde_json::json!(g)),
    };
    let gym: Gym = diesel::insert_into(gyms::table)
        .values(&new_gym)
        .returning(Gym::as_returning())
        .get_result(&mut conn)
        .await?;
    Ok((StatusCode::CREATED, Json(gym)))
}

/// Fetch one gym
pub async fn get_gym(
    State(pool): State<DbPool>,
    Path(gym_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    let gym = load_gym(&mut conn, gym_id).await?;
    Ok(Json(gym))
}

/// The grade palette to offer when logging at this gym: its custom grading
/// when present, the standard vocabularies otherwise
pub async fn get_gym_grades(
    State(pool): State<DbPool>,
    Path(gym_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    let gym = load_gym(&mut conn, gym_id).await?;
    Ok(Json(grades::palette_for(gym.grading.as_ref())))
}

/// List crags
pub async fn get_crags(State(pool): State<DbPool>) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    let rows: Vec<Crag> = crags::table
        .order_by(crags::name.asc())
        .select(Crag::as_select())
        .load(&mut conn)
        .await?;
    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
pub struct CreateCragRequest {
    pub name: String,
    pub area: Option<String>,
    pub grading: Option<Vec<String>>,
}

/// Register a crag
pub async fn create_crag(
    State(pool): State<DbPool>,
    Json(req): Json<CreateCragRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::validation("name is required"));
    }
    let mut conn = get_conn(&pool).await?;
    let new_crag = NewCrag {
        name: req.name.trim().to_string(),
        area: req.area,
        grading: req.grading.map(|g| serde_json::json!(g)),
    };
    let crag: Crag = diesel::insert_into(crags::table)
        .values(&new_crag)
        .returning(Crag::as_returning())
        .get_result(&mut conn)
        .await?;
    Ok((StatusCode::CREATED, Json(crag)))
}

/// Fetch one crag
pub async fn get_crag(
    State(pool): State<DbPool>,
    Path(crag_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    let crag = load_crag(&mut conn, crag_id).await?;
    Ok(Json(crag))
}

/// The grade palette for a crag
pub async fn get_crag_grades(
    State(pool): State<DbPool>,
    Path(crag_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn(&pool).await?;
    let crag = load_crag(&mut conn, crag_id).await?;
    Ok(Json(grades::palette_for(crag.grading.as_ref())))
}

async fn load_gym(conn: &mut crate::db::DbConnection, gym_id: i32) -> Result<Gym, ApiError> {
    gyms::table
        .find(gym_id)
        .select(Gym::as_select())
        .first(conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::not_found(format!("gym {gym_id} not found")))
}

async fn load_crag(conn: &mut crate::db::DbConnection, crag_id: i32) -> Result<Crag, ApiError> {
    crags::table
        .find(crag_id)
        .select(Crag::as_select())
        .first(conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::not_found(format!("crag {crag_id} not found")))
}
