// src/models/result.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'results' table in the database.
/// One row per student per exam.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ExamResult {
    pub id: i64,
    pub student_id: i64,
    pub exam_id: i64,
    pub score: i64,

    /// Set by the publish step; NULL before that.
    pub rank: Option<i64>,
}

/// A row of the ranking table shown to students.
#[derive(Debug, Serialize, FromRow)]
pub struct RankingEntry {
    pub student_id: i64,
    pub username: String,
    pub score: i64,
    pub rank: Option<i64>,
}

/// Response for a student viewing an exam's results.
#[derive(Debug, Serialize)]
pub struct ViewResultsResponse {
    pub result: ExamResult,
    pub rankings: Vec<RankingEntry>,
}

/// DTO for submitting an exam attempt.
#[derive(Debug, Deserialize)]
pub struct SubmitExamRequest {
    /// User's answers map.
    /// Key: MCQ ID
    /// Value: the chosen option text
    #[serde(default)]
    pub answers: HashMap<i64, String>,
}
