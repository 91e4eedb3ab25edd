// src/models/question.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

/// Question category, mapped to the Postgres enum `question_kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "question_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Single,
    Multiple,
    Numerical,
}

/// Correct-answer payload, shape-keyed by `QuestionType`.
///
/// Kept untagged so the stored JSON matches the wire shape:
/// a bare option key, an array of option keys, or a `{min, max}` range.
/// Scalar numerical answers may arrive as a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorrectAnswer {
    Range { min: f64, max: f64 },
    Multiple(Vec<String>),
    Single(String),
    Scalar(f64),
}

impl CorrectAnswer {
    /// Whether this answer shape is legal for the given question type.
    pub fn matches_type(&self, question_type: QuestionType) -> bool {
        match (question_type, self) {
            (QuestionType::Single, CorrectAnswer::Single(_)) => true,
            (QuestionType::Multiple, CorrectAnswer::Multiple(keys)) => !keys.is_empty(),
            (QuestionType::Numerical, CorrectAnswer::Range { min, max }) => min <= max,
            (QuestionType::Numerical, CorrectAnswer::Single(_) | CorrectAnswer::Scalar(_)) => true,
            _ => false,
        }
    }
}

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub subject: String,
    pub exam: String,
    pub term: String,
    pub topic: String,
    pub question_type: QuestionType,

    /// The text content of the question.
    pub question: String,
    pub context: Option<String>,
    pub image: Option<String>,

    /// Explanation of the correct answer.
    pub explanation: Option<String>,

    /// Option key -> option text. None for numerical questions.
    pub options: Option<Json<BTreeMap<String, String>>>,

    pub correct_option: Json<CorrectAnswer>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for sending a question to the client (excludes the answer key
/// and explanation).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub subject: String,
    pub exam: String,
    pub term: String,
    pub topic: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub question: String,
    pub context: Option<String>,
    pub image: Option<String>,
    pub options: Option<Json<BTreeMap<String, String>>>,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            subject: q.subject,
            exam: q.exam,
            term: q.term,
            topic: q.topic,
            question_type: q.question_type,
            question: q.question,
            context: q.context,
            image: q.image,
            options: q.options,
        }
    }
}

/// DTO for importing a question (admin bulk import).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ImportQuestion {
    #[validate(length(min = 1, max = 100))]
    pub subject: String,
    #[validate(length(min = 1, max = 20))]
    pub exam: String,
    #[validate(length(min = 1, max = 50))]
    pub term: String,
    #[validate(length(min = 1, max = 100))]
    pub topic: String,
    pub question_type: QuestionType,
    #[validate(length(min = 1, max = 5000))]
    pub question: String,
    pub context: Option<String>,
    pub image: Option<String>,
    pub explanation: Option<String>,
    pub options: Option<BTreeMap<String, String>>,
    pub correct_option: CorrectAnswer,
}

/// Query parameters for the question-selection endpoint.
#[derive(Debug, Deserialize)]
pub struct QuestionQuery {
    pub subject: Option<String>,
    pub exam: Option<String>,
    pub topic: Option<String>,
    pub limit: Option<usize>,
}
