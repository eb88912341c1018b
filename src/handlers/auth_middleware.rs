use futures::Future;
use axum::{
    extract::FromRequestParts,
    http::{Request, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    body::Body,
    Json,
};
use std::sync::Arc;
use crate::AppState;
use jsonwebtoken::{decode, DecodingKey, Validation, Algorithm};
use serde_json::json;

use crate::handlers::auth_dtos::Claims;

#[derive(Clone, Copy, Debug)]
pub struct AuthUser {
    pub user_id: i32,
    pub is_admin: bool,
}

use tracing::{debug, error, warn};

// Admin area gate. Runs the AuthUser extractor first, so a missing or bad
// token is rejected with 401 before the role is looked at. The checked user
// is left in the request extensions for the handlers.
pub async fn require_admin(
    auth_user: AuthUser,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    if !auth_user.is_admin {
        warn!(user_id = auth_user.user_id, "Non-admin user tried to reach the admin area");
        return Err(AuthError {
            status: StatusCode::FORBIDDEN,
            message: "Access denied: admin privileges required".to_string(),
        });
    }

    debug!(user_id = auth_user.user_id, "Admin access granted");
    request.extensions_mut().insert(auth_user);
    Ok(next.run(request).await)
}

#[derive(Debug)]
pub struct AuthError {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
        }));

        (self.status, body).into_response()
    }
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|_| AuthError {
        status: StatusCode::UNAUTHORIZED,
        message: "Invalid token".to_string(),
    })
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AuthError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
        // Extract the token from the Authorization header
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|header| header.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "));

        let token = auth_header.ok_or(AuthError {
            status: StatusCode::UNAUTHORIZED,
            message: "No authorization token provided".to_string(),
        })?;

        let claims = decode_token(token, &state.config.jwt_secret)?;

        // Role is looked up per request; tokens carry only the user id
        let is_admin = state
            .user_core
            .is_admin(claims.sub)
            .map_err(|e| {
                error!("Failed to check admin status for user {}: {}", claims.sub, e);
                AuthError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Failed to check admin status".to_string(),
                }
            })?;

        Ok(AuthUser {
            user_id: claims.sub,
            is_admin,
        })
        }
    }
}
