// src/models/query.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'queries' table: a student's message to the admins.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudentQuery {
    pub id: i64,
    pub student_id: i64,
    pub message: String,

    /// NULL until an admin answers.
    pub response: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Unanswered query joined with the asking student's username.
#[derive(Debug, Serialize, FromRow)]
pub struct PendingQuery {
    pub id: i64,
    pub student_id: i64,
    pub username: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ContactAdminRequest {
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RespondQueryRequest {
    pub query_id: i64,
    #[validate(length(min = 1, max = 2000))]
    pub response: String,
}
