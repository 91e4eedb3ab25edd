// src/handlers/profile.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use sqlx::{PgPool, types::Json as SqlJson};
use validator::Validate;

use crate::{
    error::AppError,
    models::user::{LEVELS, UpdateProfileRequest, User},
    utils::jwt::Claims,
};

/// Get the current user's profile.
pub async fn get_me(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, password, role, subjects, current_level, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(claims.user_id())
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Onboarding/profile update. Only the provided fields change.
pub async fn update_profile(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if let Some(level) = &payload.current_level {
        if !LEVELS.contains(&level.as_str()) {
            return Err(AppError::BadRequest(format!(
                "current_level must be one of {:?}",
                LEVELS
            )));
        }
    }

    let subjects = payload.subjects.map(SqlJson);

    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET name = COALESCE($2, name),
            subjects = COALESCE($3, subjects),
            current_level = COALESCE($4, current_level)
        WHERE id = $1
        RETURNING id, name, email, password, role, subjects, current_level, created_at
        "#,
    )
    .bind(claims.user_id())
    .bind(&payload.name)
    .bind(&subjects)
    .bind(&payload.current_level)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}
