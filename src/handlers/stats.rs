// src/handlers/stats.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    config::SKILLS_LIMIT,
    core::aggregate::{self, TopicEntry},
    error::AppError,
    models::result::{AnswerStatus, LastQuizSummary, QuizResult},
    utils::jwt::Claims,
};

async fn fetch_user_results(pool: &PgPool, user_id: i64) -> Result<Vec<QuizResult>, AppError> {
    let results = sqlx::query_as::<_, QuizResult>(
        r#"
        SELECT id, user_id, subject, term, exam, questions, start_time, end_time,
               time_taken, score, total_questions, analysis, created_at
        FROM results
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(results)
}

/// Flattens every answered question, tagging it with the subject of its
/// owning result.
fn topic_entries(results: &[QuizResult]) -> Vec<TopicEntry> {
    results
        .iter()
        .flat_map(|result| {
            result.questions.0.iter().map(|answered| TopicEntry {
                subject: result.subject.clone(),
                topic: answered.topic.clone(),
                correct: answered.status == AnswerStatus::Correct,
            })
        })
        .collect()
}

/// Dashboard summary: daily streak, weakest topic, and the last quiz taken.
pub async fn dashboard_stats(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let results = fetch_user_results(&pool, claims.user_id()).await?;

    let activity_dates: Vec<chrono::NaiveDate> = results
        .iter()
        .map(|r| r.created_at.unwrap_or(r.end_time).date_naive())
        .collect();
    let streak = aggregate::current_streak(chrono::Utc::now().date_naive(), &activity_dates);

    let focus_area = aggregate::weakest_topic(&topic_entries(&results));

    let last_quiz = results.first().map(|r| LastQuizSummary {
        subject: r.subject.clone(),
        score: r.score,
        total_questions: r.total_questions,
        created_at: r.created_at,
    });

    Ok(Json(json!({
        "streak": streak,
        "focus_area": focus_area,
        "last_quiz": last_quiz,
    })))
}

/// Per-subject proficiency percentages, strongest first.
pub async fn skills(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let results = fetch_user_results(&pool, claims.user_id()).await?;
    let skills = aggregate::subject_skills(&topic_entries(&results), SKILLS_LIMIT);
    Ok(Json(skills))
}
