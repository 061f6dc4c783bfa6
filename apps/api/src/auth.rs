//! Session authentication: opaque bearer tokens, stored hashed in Redis.
//!
//! Signing in mints a 32-byte hex token secret; only its blake3 hash is
//! ever written to the session store. Requests present the token via the
//! `token` cookie or an `Authorization: Bearer` header.

use anyhow::Result;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use redis::AsyncCommands;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::UserRow;
use crate::state::AppState;

/// Session lifetime; also drives the Max-Age of the signin cookie.
pub const SESSION_TTL_SECS: u64 = 86_400;

pub fn hash_token(secret: &str) -> String {
    blake3::hash(secret.as_bytes()).to_hex().to_string()
}

pub fn generate_token_secret() -> Result<String> {
    // 32 bytes of entropy, hex-encoded.
    random_hex(32)
}

pub fn generate_salt() -> Result<String> {
    random_hex(16)
}

fn random_hex(len: usize) -> Result<String> {
    let mut bytes = vec![0u8; len];
    getrandom::getrandom(&mut bytes).map_err(|e| anyhow::anyhow!("getrandom: {:?}", e))?;
    let mut out = String::with_capacity(len * 2);
    for b in &bytes {
        out.push_str(&format!("{:02x}", b));
    }
    Ok(out)
}

pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(salt.as_bytes());
    hasher.update(b"\n");
    hasher.update(password.as_bytes());
    hasher.finalize().to_hex().to_string()
}

pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    hash_password(password, salt) == expected_hash
}

fn session_key(token_hash: &str) -> String {
    format!("session:{token_hash}")
}

pub async fn create_session(
    redis: &redis::Client,
    token: &str,
    user_id: Uuid,
) -> Result<(), AppError> {
    let mut conn = redis.get_multiplexed_async_connection().await?;
    let _: () = conn
        .set_ex(
            session_key(&hash_token(token)),
            user_id.to_string(),
            SESSION_TTL_SECS,
        )
        .await?;
    Ok(())
}

pub async fn destroy_session(redis: &redis::Client, token: &str) -> Result<(), AppError> {
    let mut conn = redis.get_multiplexed_async_connection().await?;
    let _: () = conn.del(session_key(&hash_token(token))).await?;
    Ok(())
}

async fn session_user_id(redis: &redis::Client, token: &str) -> Result<Option<Uuid>, AppError> {
    let mut conn = redis.get_multiplexed_async_connection().await?;
    let value: Option<String> = conn.get(session_key(&hash_token(token))).await?;
    Ok(value.and_then(|v| Uuid::parse_str(&v).ok()))
}

/// Pulls the session token from the `token` cookie, falling back to an
/// `Authorization: Bearer` header.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(cookies) = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) {
        for pair in cookies.split(';') {
            if let Some(value) = pair.trim().strip_prefix("token=") {
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }

    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// The authenticated caller, attached to requests by the extractor below.
/// Carries the raw token so logout can destroy the session it rode in on.
pub struct AuthSession {
    pub user: UserRow,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = token_from_headers(&parts.headers) else {
            return Err(AppError::Unauthorized);
        };

        let Some(user_id) = session_user_id(&state.redis, &token).await? else {
            return Err(AppError::Unauthorized);
        };

        let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&state.db)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthSession { user, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_hash_token_is_stable_hex() {
        let a = hash_token("secret");
        let b = hash_token("secret");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generated_secrets_differ() {
        let a = generate_token_secret().unwrap();
        let b = generate_token_secret().unwrap();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }

    #[test]
    fn test_password_hash_depends_on_salt() {
        let h1 = hash_password("hunter22", "aa");
        let h2 = hash_password("hunter22", "bb");
        assert_ne!(h1, h2);
        assert!(verify_password("hunter22", "aa", &h1));
        assert!(!verify_password("wrong", "aa", &h1));
    }

    #[test]
    fn test_token_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; token=abc123"),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_token_from_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc123"),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_cookie_takes_precedence_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("token=cookie"));
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer header"),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("cookie"));
    }

    #[test]
    fn test_missing_token_is_none() {
        assert!(token_from_headers(&HeaderMap::new()).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("token="));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic x"));
        assert!(token_from_headers(&headers).is_none());
    }
}
