// src/handlers/questions.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use sqlx::PgPool;

use crate::{
    config::DEFAULT_QUESTION_LIMIT,
    core::select::select_questions,
    error::AppError,
    models::{
        question::{PublicQuestion, Question, QuestionQuery},
        subject::Subject,
    },
};

/// Lists all subjects with question banks.
pub async fn list_subjects(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let subjects = sqlx::query_as::<_, Subject>(
        "SELECT id, subject_name, created_at FROM subjects ORDER BY subject_name",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(subjects))
}

/// Serves a balanced random selection of questions for a quiz attempt.
///
/// 400 when subject or exam is missing, 404 when the subject (or its exam
/// paper) is unknown. Answer keys are stripped before the response.
pub async fn get_questions(
    State(pool): State<PgPool>,
    Query(params): Query<QuestionQuery>,
) -> Result<impl IntoResponse, AppError> {
    let subject = params
        .subject
        .filter(|s| !s.trim().is_empty())
        .ok_or(AppError::BadRequest("subject is required".to_string()))?;
    let exam = params
        .exam
        .filter(|s| !s.trim().is_empty())
        .ok_or(AppError::BadRequest("exam is required".to_string()))?;
    let limit = params.limit.unwrap_or(DEFAULT_QUESTION_LIMIT).clamp(1, 100);

    let known = sqlx::query_scalar::<_, i64>("SELECT id FROM subjects WHERE subject_name = $1")
        .bind(&subject)
        .fetch_optional(&pool)
        .await?;
    if known.is_none() {
        return Err(AppError::NotFound(format!(
            "Subject '{}' not found",
            subject
        )));
    }

    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, subject, exam, term, topic, question_type, question,
               context, image, explanation, options, correct_option, created_at
        FROM questions
        WHERE subject = $1 AND exam = $2
        "#,
    )
    .bind(&subject)
    .bind(&exam)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch questions: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    if questions.is_empty() {
        return Err(AppError::NotFound(format!(
            "No questions for subject '{}' exam '{}'",
            subject, exam
        )));
    }

    let mut rng = StdRng::from_entropy();
    let selected = select_questions(&mut rng, questions, params.topic.as_deref(), limit);

    let public: Vec<PublicQuestion> = selected.into_iter().map(PublicQuestion::from).collect();
    Ok(Json(public))
}
