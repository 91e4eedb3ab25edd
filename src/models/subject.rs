// src/models/subject.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'subjects' table: shared, read-mostly reference data.
/// Rows are created as a side effect of administrative question imports.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub subject_name: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}
