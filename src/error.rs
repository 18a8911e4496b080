// src/error.rs

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{config::LOGIN_PATH, models::registration::Ineligibility};

/// Global Application Error Enum.
/// The `Display` text of each variant is the notice shown to the user.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // 500 Internal Server Error
    #[error("{0}")]
    InternalServerError(String),

    // 400 Bad Request (validation failures)
    #[error("{0}")]
    BadRequest(String),

    // 401, same notice for unknown user and wrong password
    #[error("Invalid username or password.")]
    InvalidCredentials,

    // 303 to the login page
    #[error("{0}")]
    Unauthorized(String),

    // 404 Not Found
    #[error("{0}")]
    NotFound(String),

    // 409
    #[error("Username already exists. Choose a different one.")]
    DuplicateUsername,

    // 409 (already registered, already submitted, already answered)
    #[error("{0}")]
    Conflict(String),

    // 403, registration rejected by an eligibility rule
    #[error("{0}")]
    Ineligible(#[from] Ineligibility),
}

impl AppError {
    pub fn unauthorized() -> Self {
        AppError::Unauthorized("Unauthorized access!".to_string())
    }
}

/// Converts the error into a JSON notice with the matching status code.
/// Authorization failures redirect to the login page instead.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                let body = Json(json!({ "error": "Internal Server Error" }));
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }
            AppError::Unauthorized(msg) => {
                let body = Json(json!({ "error": msg, "redirect": LOGIN_PATH }));
                return (StatusCode::SEE_OTHER, [(header::LOCATION, LOGIN_PATH)], body)
                    .into_response();
            }
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateUsername | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Ineligible(_) => StatusCode::FORBIDDEN,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::BadRequest(errors.to_string())
    }
}

/// True when the database rejected a write because of a UNIQUE constraint.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
