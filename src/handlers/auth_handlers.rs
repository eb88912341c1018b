use std::sync::Arc;
use crate::handlers::auth_middleware::AuthUser;
use axum::{
    Json,
    extract::{Extension, State},
    http::StatusCode,
};
use jsonwebtoken::{encode, Header, EncodingKey};
use chrono::{Duration, Utc};
use once_cell::sync::Lazy;

use crate::{
    error::{api_error, store_failure, ApiError},
    handlers::auth_dtos::{
        Claims, LoginRequest, LoginResponse, SessionResponse, SetupAdminRequest, SetupAdminResponse,
    },
    models::user_models::{User, ADMIN_ROLE},
    AppState,
};

const TOKEN_TTL_DAYS: i64 = 7;

// Checked against when the email has no account so both paths cost one bcrypt verify.
static UNKNOWN_USER_HASH: Lazy<Option<String>> =
    Lazy::new(|| bcrypt::hash("naveye-unknown-user", bcrypt::DEFAULT_COST).ok());

fn verify_password(candidate: &str, user: Option<&User>) -> bool {
    let hash = match user {
        Some(user) => Some(user.password_hash.as_str()),
        None => UNKNOWN_USER_HASH.as_deref(),
    };
    let matches = hash
        .map(|hash| bcrypt::verify(candidate, hash).unwrap_or(false))
        .unwrap_or(false);
    matches && user.is_some()
}

pub fn issue_token(user_id: i32, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: user_id,
        exp: (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(login_req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let limiter_key = login_req.email.trim().to_lowercase();
    if state.login_limiter.check_key(&limiter_key).is_err() {
        tracing::warn!("Rate limit exceeded for admin login: [redacted]");
        return Err(api_error(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many login attempts, try again later",
        ));
    }

    let user = state
        .user_core
        .find_by_email(&login_req.email)
        .map_err(|e| store_failure("login", e))?;

    let verified = verify_password(&login_req.password, user.as_ref());
    let user = match user {
        Some(user) if verified => user,
        _ => return Err(api_error(StatusCode::UNAUTHORIZED, "Invalid credentials")),
    };

    let is_admin = state
        .user_core
        .is_admin(user.id)
        .map_err(|e| store_failure("login", e))?;
    if !is_admin {
        tracing::info!("Login refused for user {} without admin role", user.id);
        return Err(api_error(
            StatusCode::FORBIDDEN,
            "You don't have admin privileges.",
        ));
    }

    let token = issue_token(user.id, &state.config.jwt_secret).map_err(|e| {
        tracing::error!("Token generation failed: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Token generation failed")
    })?;

    tracing::info!("Admin {} logged in", user.id);
    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
    }))
}

/// One-off bootstrap of the admin account named in configuration.
pub async fn setup_admin(
    State(state): State<Arc<AppState>>,
    Json(setup_req): Json<SetupAdminRequest>,
) -> Result<Json<SetupAdminResponse>, ApiError> {
    let Some(expected_secret) = state.config.admin_setup_secret.as_deref() else {
        return Err(api_error(StatusCode::NOT_FOUND, "Admin setup is disabled"));
    };
    if setup_req.secret_key != expected_secret {
        tracing::warn!("Admin setup attempted with a wrong secret");
        return Err(api_error(StatusCode::UNAUTHORIZED, "Unauthorized"));
    }

    let (Some(email), Some(password)) = (
        state.config.admin_email.as_deref(),
        state.config.admin_password.as_deref(),
    ) else {
        tracing::error!("ADMIN_EMAIL and ADMIN_PASSWORD must be set for admin setup");
        return Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Admin account is not configured",
        ));
    };

    let now = Utc::now().timestamp();
    let existing = state
        .user_core
        .find_by_email(email)
        .map_err(|e| store_failure("admin setup", e))?;

    let (user_id, message) = match existing {
        Some(user) => (user.id, "Admin role assigned to existing user"),
        None => {
            let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| {
                tracing::error!("Password hashing failed: {}", e);
                api_error(StatusCode::INTERNAL_SERVER_ERROR, "Password hashing failed")
            })?;
            let user = state
                .user_core
                .create_user(email, &password_hash, now)
                .map_err(|e| store_failure("admin setup", e))?;
            (user.id, "Admin user created successfully")
        }
    };

    state
        .user_core
        .grant_role(user_id, ADMIN_ROLE, now)
        .map_err(|e| store_failure("admin setup", e))?;

    tracing::info!("Admin setup completed for user {}", user_id);
    Ok(Json(SetupAdminResponse {
        success: true,
        message: message.to_string(),
        user_id,
    }))
}

pub async fn session(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<SessionResponse>, ApiError> {
    let user = state
        .user_core
        .find_by_id(auth_user.user_id)
        .map_err(|e| store_failure("session", e))?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "User not found"))?;

    Ok(Json(SessionResponse {
        user_id: user.id,
        email: user.email,
        is_admin: auth_user.is_admin,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_password(password: &str) -> User {
        User {
            id: 1,
            email: "admin@naveye.app".to_string(),
            password_hash: bcrypt::hash(password, 4).unwrap(),
            created_at: 0,
        }
    }

    #[test]
    fn known_user_needs_the_right_password() {
        let user = user_with_password("hunter22");
        assert!(verify_password("hunter22", Some(&user)));
        assert!(!verify_password("hunter23", Some(&user)));
    }

    #[test]
    fn unknown_user_still_runs_a_bcrypt_check_and_fails() {
        assert!(UNKNOWN_USER_HASH.is_some());
        assert!(!verify_password("naveye-unknown-user", None));
    }

    #[test]
    fn issued_tokens_decode_with_the_same_secret() {
        let token = issue_token(7, "secret").unwrap();
        let claims = crate::handlers::auth_middleware::decode_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, 7);
        assert!(crate::handlers::auth_middleware::decode_token(&token, "other").is_err());
    }
}
