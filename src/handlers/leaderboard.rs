// src/handlers/leaderboard.rs

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::{PgPool, Postgres};

use crate::{
    config::LEADERBOARD_SIZE,
    core::aggregate,
    error::AppError,
    models::result::{LeaderboardEntry, ScoreRow},
};

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub subject: Option<String>,
}

/// Helper struct for joining display names onto ranked scores.
#[derive(sqlx::FromRow)]
struct UserName {
    id: i64,
    name: String,
}

/// Top 20 users by total score, optionally filtered by subject.
///
/// Retakes count once: only the best score per (user, subject, term, exam)
/// contributes to the total.
pub async fn get_leaderboard(
    State(pool): State<PgPool>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rows: Vec<ScoreRow> = match &params.subject {
        Some(subject) => {
            sqlx::query_as::<_, ScoreRow>(
                "SELECT user_id, subject, term, exam, score FROM results WHERE subject = $1",
            )
            .bind(subject)
            .fetch_all(&pool)
            .await
        }
        None => {
            sqlx::query_as::<_, ScoreRow>(
                "SELECT user_id, subject, term, exam, score FROM results",
            )
            .fetch_all(&pool)
            .await
        }
    }
    .map_err(|e| {
        tracing::error!("Failed to fetch leaderboard rows: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let ranked = aggregate::leaderboard(&rows, LEADERBOARD_SIZE);
    if ranked.is_empty() {
        return Ok(Json(Vec::<LeaderboardEntry>::new()));
    }

    let mut query_builder =
        sqlx::QueryBuilder::<Postgres>::new("SELECT id, name FROM users WHERE id IN (");
    let mut separated = query_builder.separated(",");
    for entry in &ranked {
        separated.push_bind(entry.user_id);
    }
    separated.push_unseparated(")");

    let names: Vec<UserName> = query_builder
        .build_query_as()
        .fetch_all(&pool)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    let names: HashMap<i64, String> = names.into_iter().map(|u| (u.id, u.name)).collect();

    let entries: Vec<LeaderboardEntry> = ranked
        .into_iter()
        .map(|r| LeaderboardEntry {
            user_id: r.user_id,
            name: names
                .get(&r.user_id)
                .cloned()
                .unwrap_or_else(|| "Unknown".to_string()),
            total_score: r.total_score,
            quizzes_taken: r.quizzes_taken,
        })
        .collect();

    Ok(Json(entries))
}
