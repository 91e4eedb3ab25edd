// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::{PgPool, types::Json as SqlJson};
use validator::Validate;

use crate::{
    error::AppError,
    models::question::{CorrectAnswer, ImportQuestion, QuestionType},
};

fn validate_import(q: &ImportQuestion) -> Result<(), AppError> {
    if let Err(validation_errors) = q.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if !q.correct_option.matches_type(q.question_type) {
        return Err(AppError::BadRequest(format!(
            "correct_option shape does not match question type for '{}'",
            q.question
        )));
    }

    match q.question_type {
        QuestionType::Numerical => {}
        _ => {
            let options = q.options.as_ref().ok_or_else(|| {
                AppError::BadRequest(format!("options are required for '{}'", q.question))
            })?;

            // Every correct key must exist among the options.
            let keys: Vec<&String> = match &q.correct_option {
                CorrectAnswer::Single(key) => vec![key],
                CorrectAnswer::Multiple(keys) => keys.iter().collect(),
                _ => vec![],
            };
            for key in keys {
                if !options.contains_key(key) {
                    return Err(AppError::BadRequest(format!(
                        "correct option '{}' is not among the options for '{}'",
                        key, q.question
                    )));
                }
            }
        }
    }

    Ok(())
}

/// Bulk question import with merge/dedup semantics.
///
/// Duplicate questions (same text, term and exam) are skipped via the
/// unique constraint; missing subject rows are created on the fly. The
/// whole batch is applied in one transaction.
pub async fn import_questions(
    State(pool): State<PgPool>,
    Json(payload): Json<Vec<ImportQuestion>>,
) -> Result<impl IntoResponse, AppError> {
    if payload.is_empty() {
        return Err(AppError::BadRequest("No questions provided".to_string()));
    }
    for question in &payload {
        validate_import(question)?;
    }

    let mut tx = pool.begin().await?;
    let mut imported = 0u64;

    for q in &payload {
        sqlx::query("INSERT INTO subjects (subject_name) VALUES ($1) ON CONFLICT DO NOTHING")
            .bind(&q.subject)
            .execute(&mut *tx)
            .await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO questions
                (subject, exam, term, topic, question_type, question,
                 context, image, explanation, options, correct_option)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (question, term, exam) DO NOTHING
            "#,
        )
        .bind(&q.subject)
        .bind(&q.exam)
        .bind(&q.term)
        .bind(&q.topic)
        .bind(q.question_type)
        .bind(&q.question)
        .bind(&q.context)
        .bind(&q.image)
        .bind(&q.explanation)
        .bind(q.options.as_ref().map(SqlJson))
        .bind(SqlJson(&q.correct_option))
        .execute(&mut *tx)
        .await?;

        imported += inserted.rows_affected();
    }

    tx.commit().await?;

    let skipped = payload.len() as u64 - imported;
    tracing::info!("Imported {} questions ({} duplicates skipped)", imported, skipped);

    Ok(Json(json!({
        "imported": imported,
        "skipped": skipped,
    })))
}

/// Deletes a question by id.
pub async fn delete_question(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = sqlx::query("DELETE FROM questions WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Question {} not found", id)));
    }

    Ok(Json(json!({ "message": "Question deleted" })))
}
