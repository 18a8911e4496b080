// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::{Config, SESSION_COOKIE},
    error::{AppError, is_unique_violation},
    models::user::{LoginRequest, RegisterRequest, Role, User},
    utils::{
        hash::{hash_password, verify_against_decoy, verify_password},
        session::{create_session, current_session, destroy_session, removal_cookie, session_cookie},
    },
};

/// Login page data: who, if anyone, is signed in on this cookie.
pub async fn session_status(
    State(pool): State<SqlitePool>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let body = match current_session(&pool, &jar).await? {
        Some(session) => json!({
            "authenticated": true,
            "username": session.username,
            "role": session.role,
            "dashboard": session.role.dashboard_path(),
        }),
        None => json!({ "authenticated": false }),
    };
    Ok(Json(body))
}

/// Registration page data: the roles an account can be created with.
pub async fn register_page() -> impl IntoResponse {
    Json(json!({ "roles": [Role::Admin, Role::Student] }))
}

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created with the new user's id.
pub async fn register(
    State(pool): State<SqlitePool>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let taken = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = ?")
        .bind(&payload.username)
        .fetch_optional(&pool)
        .await?;
    if taken.is_some() {
        return Err(AppError::DuplicateUsername);
    }

    let hashed_password = hash_password(&payload.password)?;

    // The UNIQUE index still decides when two registrations race.
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (username, password, role) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(&payload.username)
    .bind(&hashed_password)
    .bind(payload.role.as_str())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::DuplicateUsername
        } else {
            tracing::error!("Failed to register user: {:?}", e);
            AppError::from(e)
        }
    })?;

    tracing::info!(user_id = id, role = %payload.role, "Registered user {}", payload.username);

    let role_label = match payload.role {
        Role::Admin => "Admin",
        Role::Student => "Student",
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": id,
            "message": format!("{} registered successfully!", role_label),
        })),
    ))
}

/// Authenticates a user and opens a server-side session.
///
/// Unknown usernames and wrong passwords produce the same notice.
/// On success the session cookie is set and the role's dashboard is reported.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password, role FROM users WHERE username = ?",
    )
    .bind(&payload.username)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Login DB error: {:?}", e);
        AppError::from(e)
    })?;

    let Some(user) = user else {
        verify_against_decoy(&payload.password);
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(&payload.password, &user.password)? {
        return Err(AppError::InvalidCredentials);
    }

    let role = user.role()?;

    // Replace any session this browser already had.
    if let Some(previous) = jar.get(SESSION_COOKIE) {
        destroy_session(&pool, previous.value()).await?;
    }
    let token = create_session(&pool, &user, config.session_ttl_seconds).await?;
    let jar = jar.add(session_cookie(token, &config));

    tracing::info!(user_id = user.id, role = %role, "User logged in");

    Ok((
        jar,
        Json(json!({
            "message": "Login successful!",
            "user_id": user.id,
            "username": user.username,
            "role": role,
            "redirect": role.dashboard_path(),
        })),
    ))
}

/// Ends the current session, if there is one.
pub async fn logout(
    State(pool): State<SqlitePool>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        destroy_session(&pool, cookie.value()).await?;
    }
    let jar = jar.remove(removal_cookie());

    Ok((
        jar,
        Json(json!({ "message": "You have been logged out.", "redirect": "/" })),
    ))
}
