// src/handlers/results.rs

use std::collections::HashMap;

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use sqlx::{PgPool, Postgres, types::Json as SqlJson};
use validator::Validate;

use crate::{
    core::session::QuizSession,
    error::AppError,
    models::{
        question::Question,
        result::{QuizResult, SubmitResultRequest},
    },
    utils::jwt::Claims,
};

/// Scores and persists a completed quiz attempt.
///
/// The submitted answers are replayed through a `QuizSession`: every
/// referenced question is fetched, each answer classified, marks summed,
/// and exactly one `results` row is inserted. Returns the persisted
/// record with its generated id.
pub async fn submit_result(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SubmitResultRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    if payload.answers.is_empty() {
        return Err(AppError::BadRequest("No answers submitted".to_string()));
    }
    if payload.end_time < payload.start_time {
        return Err(AppError::BadRequest(
            "end_time precedes start_time".to_string(),
        ));
    }

    // Dynamic IN clause to fetch the referenced questions.
    let mut query_builder = sqlx::QueryBuilder::<Postgres>::new(
        "SELECT id, subject, exam, term, topic, question_type, question,
                context, image, explanation, options, correct_option, created_at
         FROM questions WHERE id IN (",
    );

    let mut separated = query_builder.separated(",");
    for answer in &payload.answers {
        separated.push_bind(answer.question_id);
    }
    separated.push_unseparated(")");

    let fetched: Vec<Question> = query_builder
        .build_query_as()
        .fetch_all(&pool)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let by_id: HashMap<i64, Question> = fetched.into_iter().map(|q| (q.id, q)).collect();

    let mut questions = Vec::with_capacity(payload.answers.len());
    for answer in &payload.answers {
        let question = by_id.get(&answer.question_id).ok_or_else(|| {
            AppError::NotFound(format!("Question {} not found", answer.question_id))
        })?;
        questions.push(question.clone());
    }

    let mut session = QuizSession::start(
        payload.subject.clone(),
        payload.term.clone(),
        payload.exam.clone(),
        questions,
        payload.start_time,
        None,
    )?;

    for (index, answer) in payload.answers.iter().enumerate() {
        session.record_answer(index, answer.answer.clone())?;
    }

    let outcome = session
        .finish(payload.end_time)
        .ok_or_else(|| AppError::InvalidSession("Quiz already submitted".to_string()))?;

    let result = sqlx::query_as::<_, QuizResult>(
        r#"
        INSERT INTO results
            (user_id, subject, term, exam, questions, start_time, end_time,
             time_taken, score, total_questions)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id, user_id, subject, term, exam, questions, start_time, end_time,
                  time_taken, score, total_questions, analysis, created_at
        "#,
    )
    .bind(claims.user_id())
    .bind(&outcome.subject)
    .bind(&outcome.term)
    .bind(&outcome.exam)
    .bind(SqlJson(&outcome.questions))
    .bind(outcome.started_at)
    .bind(outcome.ended_at)
    .bind(outcome.time_taken)
    .bind(outcome.score)
    .bind(outcome.total_questions)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to persist quiz result: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(result)))
}

/// Lists the caller's quiz results, newest first.
pub async fn list_my_results(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let results = sqlx::query_as::<_, QuizResult>(
        r#"
        SELECT id, user_id, subject, term, exam, questions, start_time, end_time,
               time_taken, score, total_questions, analysis, created_at
        FROM results
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(claims.user_id())
    .fetch_all(&pool)
    .await?;

    Ok(Json(results))
}
