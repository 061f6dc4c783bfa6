//! Axum route handlers for the Users API: registration, sign-in, sign-out,
//! and profile lookup.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{
    create_session, destroy_session, generate_salt, generate_token_secret, hash_password,
    verify_password, AuthSession, SESSION_TTL_SECS,
};
use crate::errors::AppError;
use crate::models::user::UserRow;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// User representation safe to return to clients; no credential fields.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for PublicUser {
    fn from(row: UserRow) -> Self {
        PublicUser {
            id: row.id,
            username: row.username,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub message: String,
    pub user: PublicUser,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /users/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    validate_registration(&request)?;

    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(request.email.trim())
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let salt = generate_salt()?;
    let password_hash = hash_password(&request.password, &salt);

    let user = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (id, username, email, password_hash, password_salt)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(request.username.trim())
    .bind(request.email.trim())
    .bind(&password_hash)
    .bind(&salt)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Registered user {} ({})", user.id, user.username);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "New user created successfully".to_string(),
            user: user.into(),
        }),
    ))
}

/// POST /users/signin
///
/// Mints an opaque session token, stores it in Redis, and hands it back
/// both as an HttpOnly cookie and in the response body.
pub async fn handle_signin(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
        .bind(request.email.trim())
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&request.password, &user.password_salt, &user.password_hash) {
        return Err(AppError::InvalidCredentials);
    }

    let token = generate_token_secret()?;
    create_session(&state.redis, &token, user.id).await?;

    let cookie = format!(
        "token={token}; HttpOnly; Path=/; Max-Age={SESSION_TTL_SECS}; SameSite=Lax"
    );

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(SignInResponse {
            message: "User signed in successfully.".to_string(),
            user: user.into(),
            token,
        }),
    ))
}

/// POST /users/logout
pub async fn handle_logout(
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<impl IntoResponse, AppError> {
    destroy_session(&state.redis, &session.token).await?;

    let cookie = "token=; HttpOnly; Path=/; Max-Age=0".to_string();

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(MessageResponse {
            message: "User logged out successfully.".to_string(),
        }),
    ))
}

/// GET /users/profile
pub async fn handle_profile(session: AuthSession) -> Json<PublicUser> {
    Json(session.user.into())
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

fn validate_registration(request: &RegisterRequest) -> Result<(), AppError> {
    if request.username.trim().is_empty() {
        return Err(AppError::Validation("username is required".to_string()));
    }
    let email = request.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation(
            "a valid email address is required".to_string(),
        ));
    }
    if request.password.len() < 8 {
        return Err(AppError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}
