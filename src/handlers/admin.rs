// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::{FromRow, SqlitePool};
use validator::Validate;

use crate::{
    error::AppError,
    handlers::exams::{fetch_exam, fetch_mcqs, list_exams},
    models::{
        exam::{CreateExamRequest, ScheduleExamRequest},
        mcq::CreateMcqRequest,
        query::{PendingQuery, RespondQueryRequest},
    },
    utils::html::clean_html,
};

/// Score of one submission, as read back for ranking.
#[derive(Debug, Clone, FromRow)]
struct ScoreEntry {
    id: i64,
    score: i64,
}

/// Orders submissions by score descending, breaking ties by result id
/// (earlier submission first), and returns `(result_id, rank)` pairs with
/// 1-based consecutive ranks.
fn assign_ranks(mut entries: Vec<ScoreEntry>) -> Vec<(i64, i64)> {
    entries.sort_by(|a, b| b.score.cmp(&a.score).then(a.id.cmp(&b.id)));
    entries
        .into_iter()
        .zip(1..)
        .map(|(entry, rank)| (entry.id, rank))
        .collect()
}

/// Lists all exams.
/// Admin only.
pub async fn dashboard(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let exams = list_exams(&pool).await?;
    Ok(Json(json!({ "exams": exams })))
}

/// The add-exam form needs no data; this only confirms access.
pub async fn add_exam_form() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Creates a new exam together with its college whitelist.
/// Admin only.
pub async fn add_exam(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let description = payload
        .description
        .as_deref()
        .map(clean_html)
        .filter(|d| !d.is_empty());
    let colleges = payload.normalized_colleges();

    let mut tx = pool.begin().await?;

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO exams (name, description, age_min, age_max, education_level)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(payload.name.trim())
    .bind(description)
    .bind(payload.age_min)
    .bind(payload.age_max)
    .bind(&payload.education_level)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create exam: {:?}", e);
        AppError::from(e)
    })?;

    for college in &colleges {
        sqlx::query("INSERT INTO exam_colleges (exam_id, college_name) VALUES (?, ?)")
            .bind(id)
            .bind(college)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    tracing::info!(exam_id = id, colleges = colleges.len(), "Exam created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "message": "Exam added successfully!" })),
    ))
}

/// Shows an exam with its questions, answers included.
/// Admin only.
pub async fn list_mcqs(
    State(pool): State<SqlitePool>,
    Path(exam_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exam = fetch_exam(&pool, exam_id).await?;
    let mcqs = fetch_mcqs(&pool, exam_id).await?;
    Ok(Json(json!({ "exam": exam, "mcqs": mcqs })))
}

/// Appends one question to an exam. Duplicates are not checked.
/// Admin only.
pub async fn add_mcq(
    State(pool): State<SqlitePool>,
    Path(exam_id): Path<i64>,
    Json(payload): Json<CreateMcqRequest>,
) -> Result<impl IntoResponse, AppError> {
    fetch_exam(&pool, exam_id).await?;
    payload.validate()?;

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO mcqs (exam_id, question, option1, option2, option3, option4, correct_answer)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(exam_id)
    .bind(&payload.question)
    .bind(&payload.option1)
    .bind(&payload.option2)
    .bind(&payload.option3)
    .bind(&payload.option4)
    .bind(&payload.correct_answer)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to add MCQ: {:?}", e);
        AppError::from(e)
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "message": "MCQ added successfully!" })),
    ))
}

/// Shows the exam being scheduled.
/// Admin only.
pub async fn schedule_form(
    State(pool): State<SqlitePool>,
    Path(exam_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exam = fetch_exam(&pool, exam_id).await?;
    Ok(Json(exam))
}

/// Sets the exam's start time.
/// Admin only.
pub async fn schedule_exam(
    State(pool): State<SqlitePool>,
    Path(exam_id): Path<i64>,
    Json(payload): Json<ScheduleExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("UPDATE exams SET start_time = ? WHERE id = ?")
        .bind(payload.start_time)
        .bind(exam_id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Exam not found".to_string()));
    }

    tracing::info!(exam_id, start_time = %payload.start_time, "Exam scheduled");

    Ok(Json(json!({
        "message": "Exam date scheduled successfully!",
        "start_time": payload.start_time,
    })))
}

/// Ranks every submission of the exam and stores the ranks.
///
/// Submissions that arrive after this runs stay unranked until it runs again.
/// Admin only.
pub async fn publish_results(
    State(pool): State<SqlitePool>,
    Path(exam_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    fetch_exam(&pool, exam_id).await?;

    let mut tx = pool.begin().await?;

    let entries = sqlx::query_as::<_, ScoreEntry>(
        "SELECT id, score FROM results WHERE exam_id = ? ORDER BY score DESC, id ASC",
    )
    .bind(exam_id)
    .fetch_all(&mut *tx)
    .await?;

    let ranks = assign_ranks(entries);
    for (result_id, rank) in &ranks {
        sqlx::query("UPDATE results SET rank = ? WHERE id = ?")
            .bind(rank)
            .bind(result_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await.map_err(|e| {
        tracing::error!("Failed to publish results: {:?}", e);
        AppError::from(e)
    })?;

    tracing::info!(exam_id, ranked = ranks.len(), "Results published");

    Ok(Json(json!({
        "message": "Results published successfully!",
        "ranked": ranks.len(),
    })))
}

/// Lists unanswered queries, oldest first.
/// Admin only.
pub async fn view_queries(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let queries = sqlx::query_as::<_, PendingQuery>(
        r#"
        SELECT q.id, q.student_id, u.username, q.message, q.created_at
        FROM queries q
        JOIN users u ON u.id = q.student_id
        WHERE q.response IS NULL
        ORDER BY q.id
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(queries))
}

/// Records the admin's answer to one query. A query is answered only once.
/// Admin only.
pub async fn respond_query(
    State(pool): State<SqlitePool>,
    Json(payload): Json<RespondQueryRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let existing = sqlx::query_scalar::<_, Option<String>>("SELECT response FROM queries WHERE id = ?")
        .bind(payload.query_id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Query not found".to_string()))?;

    if existing.is_some() {
        return Err(AppError::Conflict(
            "This query has already been answered.".to_string(),
        ));
    }

    let response = clean_html(&payload.response);
    if response.is_empty() {
        return Err(AppError::BadRequest("Response must not be empty".to_string()));
    }

    let result = sqlx::query("UPDATE queries SET response = ? WHERE id = ? AND response IS NULL")
        .bind(&response)
        .bind(payload.query_id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Conflict(
            "This query has already been answered.".to_string(),
        ));
    }

    Ok(Json(json!({ "message": "Query responded successfully!" })))
}
