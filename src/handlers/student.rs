// src/handlers/student.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::{AppError, is_unique_violation},
    handlers::exams::{fetch_exam, fetch_mcqs, list_exams},
    models::{
        mcq::PublicMcq,
        query::{ContactAdminRequest, StudentQuery},
        registration::{ExamRegistration, RegisterExamRequest, check_eligibility},
        result::{ExamResult, RankingEntry, SubmitExamRequest, ViewResultsResponse},
    },
    utils::{html::clean_html, session::AuthSession},
};

/// Counts answers that equal the stored correct answer exactly.
/// Answers for ids missing from `answer_key` score nothing.
fn calculate_score(user_answers: &HashMap<i64, String>, answer_key: &HashMap<i64, String>) -> i64 {
    user_answers
        .iter()
        .filter(|(mcq_id, answer)| answer_key.get(*mcq_id) == Some(*answer))
        .count() as i64
}

/// Lists all exams along with the student's registrations and results.
/// Student only.
pub async fn dashboard(
    State(pool): State<SqlitePool>,
    Extension(session): Extension<AuthSession>,
) -> Result<impl IntoResponse, AppError> {
    let exams = list_exams(&pool).await?;

    let registrations = sqlx::query_as::<_, ExamRegistration>(
        r#"
        SELECT id, student_id, exam_id, name, college_name, address, aadhaar_number, age
        FROM exam_registrations
        WHERE student_id = ?
        ORDER BY id
        "#,
    )
    .bind(session.user_id)
    .fetch_all(&pool)
    .await?;
    let registered_exam_ids: Vec<i64> = registrations.iter().map(|r| r.exam_id).collect();

    let results = sqlx::query_as::<_, ExamResult>(
        "SELECT id, student_id, exam_id, score, rank FROM results WHERE student_id = ? ORDER BY id",
    )
    .bind(session.user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({
        "username": session.username,
        "exams": exams,
        "registered_exam_ids": registered_exam_ids,
        "registrations": registrations,
        "results": results,
    })))
}

/// Shows the exam and its eligibility criteria.
/// Student only.
pub async fn register_exam_form(
    State(pool): State<SqlitePool>,
    Path(exam_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exam = fetch_exam(&pool, exam_id).await?;
    Ok(Json(exam))
}

/// Registers the student for an exam after the eligibility checks pass.
/// Student only.
pub async fn register_exam(
    State(pool): State<SqlitePool>,
    Extension(session): Extension<AuthSession>,
    Path(exam_id): Path<i64>,
    Json(payload): Json<RegisterExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    let exam = fetch_exam(&pool, exam_id).await?;
    payload.validate()?;

    if let Err(reason) = check_eligibility(&exam, &payload) {
        tracing::info!(exam_id, student_id = session.user_id, ?reason, "Registration rejected");
        return Err(reason.into());
    }

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO exam_registrations
            (student_id, exam_id, name, college_name, address, aadhaar_number, age)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(session.user_id)
    .bind(exam_id)
    .bind(&payload.name)
    .bind(&payload.college_name)
    .bind(&payload.address)
    .bind(&payload.aadhaar_number)
    .bind(payload.age)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("You have already registered for this exam.".to_string())
        } else {
            tracing::error!("Failed to register for exam: {:?}", e);
            AppError::from(e)
        }
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": id,
            "message": "You have successfully registered for the exam!",
        })),
    ))
}

/// Shows the exam's questions without their answers.
/// Student only.
pub async fn exam_paper(
    State(pool): State<SqlitePool>,
    Path(exam_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exam = fetch_exam(&pool, exam_id).await?;
    let mcqs: Vec<PublicMcq> = fetch_mcqs(&pool, exam_id)
        .await?
        .into_iter()
        .map(PublicMcq::from)
        .collect();

    Ok(Json(json!({ "exam": exam, "mcqs": mcqs })))
}

/// Grades a submission and stores the student's result.
///
/// * Compares each answer with the exam's answer key (exact string match).
/// * Score is the number of correct answers.
/// * One result per student per exam; the rank is left for publishing.
pub async fn submit_exam(
    State(pool): State<SqlitePool>,
    Extension(session): Extension<AuthSession>,
    Path(exam_id): Path<i64>,
    Json(req): Json<SubmitExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    fetch_exam(&pool, exam_id).await?;

    let answer_key: HashMap<i64, String> = sqlx::query_as::<_, (i64, String)>(
        "SELECT id, correct_answer FROM mcqs WHERE exam_id = ?",
    )
    .bind(exam_id)
    .fetch_all(&pool)
    .await?
    .into_iter()
    .collect();

    let score = calculate_score(&req.answers, &answer_key);

    sqlx::query("INSERT INTO results (student_id, exam_id, score) VALUES (?, ?, ?)")
        .bind(session.user_id)
        .bind(exam_id)
        .bind(score)
        .execute(&pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("You have already completed this exam.".to_string())
            } else {
                tracing::error!("Failed to save result: {:?}", e);
                AppError::from(e)
            }
        })?;

    tracing::info!(exam_id, student_id = session.user_id, score, "Exam submitted");

    Ok(Json(json!({
        "score": score,
        "total_questions": answer_key.len(),
        "message": format!("You completed the exam! Your score is {}.", score),
    })))
}

/// Shows the student's own result and the exam's ranking table.
/// Student only.
pub async fn view_results(
    State(pool): State<SqlitePool>,
    Extension(session): Extension<AuthSession>,
    Path(exam_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query_as::<_, ExamResult>(
        r#"
        SELECT id, student_id, exam_id, score, rank
        FROM results
        WHERE student_id = ? AND exam_id = ?
        "#,
    )
    .bind(session.user_id)
    .bind(exam_id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| AppError::NotFound("You have not completed this exam.".to_string()))?;

    let rankings = sqlx::query_as::<_, RankingEntry>(
        r#"
        SELECT r.student_id, u.username, r.score, r.rank
        FROM results r
        JOIN users u ON u.id = r.student_id
        WHERE r.exam_id = ?
        ORDER BY r.score DESC, r.id ASC
        "#,
    )
    .bind(exam_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(ViewResultsResponse { result, rankings }))
}

/// Lists the student's own queries, newest first, with any responses.
/// Student only.
pub async fn my_queries(
    State(pool): State<SqlitePool>,
    Extension(session): Extension<AuthSession>,
) -> Result<impl IntoResponse, AppError> {
    let queries = sqlx::query_as::<_, StudentQuery>(
        r#"
        SELECT id, student_id, message, response, created_at
        FROM queries
        WHERE student_id = ?
        ORDER BY id DESC
        "#,
    )
    .bind(session.user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(queries))
}

/// Sends a query to the admins.
/// Student only.
pub async fn contact_admin(
    State(pool): State<SqlitePool>,
    Extension(session): Extension<AuthSession>,
    Json(payload): Json<ContactAdminRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let message = clean_html(&payload.message);
    if message.is_empty() {
        return Err(AppError::BadRequest("Message must not be empty".to_string()));
    }

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO queries (student_id, message, created_at) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(session.user_id)
    .bind(&message)
    .bind(Utc::now())
    .fetch_one(&pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": id,
            "message": "Your query has been sent to the admin.",
        })),
    ))
}
