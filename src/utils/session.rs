// src/utils/session.rs

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    config::{Config, SESSION_COOKIE},
    error::AppError,
    models::user::{Role, User},
};

/// Identity of the logged-in user for the current request.
/// Inserted into request extensions by `session_middleware`.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

#[derive(FromRow)]
struct SessionRow {
    user_id: i64,
    username: String,
    role: String,
    expires_at: DateTime<Utc>,
}

/// Persists a new server-side session for `user` and returns its opaque token.
/// Expired sessions left behind by earlier logins are swept first.
pub async fn create_session(
    pool: &SqlitePool,
    user: &User,
    ttl_seconds: i64,
) -> Result<String, AppError> {
    let token = Uuid::new_v4().simple().to_string();
    let now = Utc::now();
    let expires_at = now + Duration::seconds(ttl_seconds);

    let purged = purge_expired_sessions(pool, now).await?;
    if purged > 0 {
        tracing::debug!(purged, "Removed expired sessions");
    }

    sqlx::query(
        r#"
        INSERT INTO sessions (token, user_id, username, role, created_at, expires_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&token)
    .bind(user.id)
    .bind(&user.username)
    .bind(&user.role)
    .bind(now)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(token)
}

/// Looks up a session by token. Expired sessions are deleted and treated as absent.
pub async fn load_session(pool: &SqlitePool, token: &str) -> Result<Option<AuthSession>, AppError> {
    let row = sqlx::query_as::<_, SessionRow>(
        "SELECT user_id, username, role, expires_at FROM sessions WHERE token = ?",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    if row.expires_at <= Utc::now() {
        destroy_session(pool, token).await?;
        return Ok(None);
    }

    Ok(Some(AuthSession {
        user_id: row.user_id,
        username: row.username,
        role: row.role.parse()?,
    }))
}

/// Deletes every session whose expiry is at or before `now`.
pub async fn purge_expired_sessions(pool: &SqlitePool, now: DateTime<Utc>) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(now)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn destroy_session(pool: &SqlitePool, token: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

/// Resolves the session referenced by the request's cookie, if any.
pub async fn current_session(
    pool: &SqlitePool,
    jar: &CookieJar,
) -> Result<Option<AuthSession>, AppError> {
    match jar.get(SESSION_COOKIE) {
        Some(cookie) => load_session(pool, cookie.value()).await,
        None => Ok(None),
    }
}

/// Builds the cookie that carries a freshly issued session token.
pub fn session_cookie(token: String, config: &Config) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies)
        .build()
}

/// Cookie value used to clear the session cookie on the client.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

/// Axum Middleware: Authentication.
///
/// Resolves the session cookie against the sessions table and injects
/// `AuthSession` into the request extensions for handlers to use.
/// Requests without a live session are redirected to the login page.
pub async fn session_middleware(
    State(pool): State<SqlitePool>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session = current_session(&pool, &jar).await?.ok_or_else(|| {
        tracing::debug!(path = %req.uri().path(), "Rejected request without a live session");
        AppError::unauthorized()
    })?;

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

fn require_role(req: &Request, role: Role) -> Result<(), AppError> {
    let session = req
        .extensions()
        .get::<AuthSession>()
        .ok_or_else(AppError::unauthorized)?;

    if session.role != role {
        tracing::debug!(
            user_id = session.user_id,
            path = %req.uri().path(),
            "Rejected {} on a {} route",
            session.role,
            role
        );
        return Err(AppError::Unauthorized(role.access_notice().to_string()));
    }
    Ok(())
}

/// Axum Middleware: Admin Authorization.
///
/// Must be used AFTER `session_middleware`.
pub async fn admin_middleware(req: Request, next: Next) -> Result<Response, AppError> {
    require_role(&req, Role::Admin)?;
    Ok(next.run(req).await)
}

/// Axum Middleware: Student Authorization.
///
/// Must be used AFTER `session_middleware`.
pub async fn student_middleware(req: Request, next: Next) -> Result<Response, AppError> {
    require_role(&req, Role::Student)?;
    Ok(next.run(req).await)
}
