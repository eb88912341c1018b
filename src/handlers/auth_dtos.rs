use serde::{Deserialize, Serialize};
use std::fmt::Debug;

#[derive(Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i32,
}

#[derive(Deserialize)]
pub struct SetupAdminRequest {
    pub secret_key: String,
}

#[derive(Debug, Serialize)]
pub struct SetupAdminResponse {
    pub success: bool,
    pub message: String,
    pub user_id: i32,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user_id: i32,
    pub email: String,
    pub is_admin: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub exp: i64,
}
