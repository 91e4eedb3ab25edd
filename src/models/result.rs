// src/models/result.rs

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use validator::Validate;

/// Answer payload as submitted by the client.
/// Untagged: a selected option key, a set of keys, or a numeric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmittedAnswer {
    Choice(String),
    Choices(Vec<String>),
    Value(f64),
}

/// Outcome of classifying one answer.
///
/// `PartiallyCorrect` is part of the stored vocabulary but the classifier
/// never produces it; the current scoring policy has no partial credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    Correct,
    Incorrect,
    PartiallyCorrect,
    NotAttempted,
}

/// One graded question, embedded in `results.questions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    pub question_id: i64,
    pub user_answer: Option<SubmittedAnswer>,
    pub status: AnswerStatus,
    pub marks: i64,
    pub topic: String,
}

/// Represents the 'results' table in the database.
/// One row per completed quiz attempt; immutable except for `analysis`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizResult {
    pub id: i64,
    pub user_id: i64,
    pub subject: String,
    pub term: Option<String>,
    pub exam: Option<String>,
    pub questions: Json<Vec<AnsweredQuestion>>,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
    pub time_taken: i64,
    pub score: i64,
    pub total_questions: i64,
    pub analysis: Option<Json<serde_json::Value>>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// One submitted answer within a result submission.
#[derive(Debug, Deserialize)]
pub struct AnswerInput {
    pub question_id: i64,
    pub answer: Option<SubmittedAnswer>,
}

/// DTO for submitting a completed quiz session.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitResultRequest {
    #[validate(length(min = 1, max = 100))]
    pub subject: String,
    pub term: Option<String>,
    pub exam: Option<String>,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
    pub answers: Vec<AnswerInput>,
}

/// Projection of a result used by the leaderboard aggregation.
#[derive(Debug, Clone, FromRow)]
pub struct ScoreRow {
    pub user_id: i64,
    pub subject: String,
    pub term: Option<String>,
    pub exam: Option<String>,
    pub score: i64,
}

/// Aggregated leaderboard row joined with user profile data.
#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub user_id: i64,
    pub name: String,
    pub total_score: i64,
    pub quizzes_taken: usize,
}

/// Summary of the most recent quiz, shown on the dashboard.
#[derive(Debug, Serialize, FromRow)]
pub struct LastQuizSummary {
    pub subject: String,
    pub score: i64,
    pub total_questions: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}
