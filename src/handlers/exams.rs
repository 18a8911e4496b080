// src/handlers/exams.rs
//
// Exam lookups shared by the admin and student handlers.

use std::collections::HashMap;

use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{exam::Exam, mcq::Mcq},
};

/// Fetches one exam with its college whitelist, or NotFound.
pub async fn fetch_exam(pool: &SqlitePool, exam_id: i64) -> Result<Exam, AppError> {
    let mut exam = sqlx::query_as::<_, Exam>(
        r#"
        SELECT id, name, description, age_min, age_max, education_level, start_time
        FROM exams
        WHERE id = ?
        "#,
    )
    .bind(exam_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Exam not found".to_string()))?;

    exam.eligible_colleges = sqlx::query_scalar::<_, String>(
        "SELECT college_name FROM exam_colleges WHERE exam_id = ? ORDER BY rowid",
    )
    .bind(exam_id)
    .fetch_all(pool)
    .await?;

    Ok(exam)
}

/// Lists every exam, newest first, with college whitelists attached.
pub async fn list_exams(pool: &SqlitePool) -> Result<Vec<Exam>, AppError> {
    let mut exams = sqlx::query_as::<_, Exam>(
        r#"
        SELECT id, name, description, age_min, age_max, education_level, start_time
        FROM exams
        ORDER BY id DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list exams: {:?}", e);
        AppError::from(e)
    })?;

    let rows = sqlx::query_as::<_, (i64, String)>(
        "SELECT exam_id, college_name FROM exam_colleges ORDER BY rowid",
    )
    .fetch_all(pool)
    .await?;

    let mut by_exam: HashMap<i64, Vec<String>> = HashMap::new();
    for (exam_id, college) in rows {
        by_exam.entry(exam_id).or_default().push(college);
    }
    for exam in &mut exams {
        exam.eligible_colleges = by_exam.remove(&exam.id).unwrap_or_default();
    }

    Ok(exams)
}

/// All MCQs of an exam in insertion order, including correct answers.
pub async fn fetch_mcqs(pool: &SqlitePool, exam_id: i64) -> Result<Vec<Mcq>, AppError> {
    let mcqs = sqlx::query_as::<_, Mcq>(
        r#"
        SELECT id, exam_id, question, option1, option2, option3, option4, correct_answer
        FROM mcqs
        WHERE exam_id = ?
        ORDER BY id
        "#,
    )
    .bind(exam_id)
    .fetch_all(pool)
    .await?;

    Ok(mcqs)
}
