use std::sync::Arc;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use serde_json::json;

use crate::{
    error::{api_error, store_failure, validation_failure, ApiError},
    handlers::content_dtos::{DetailedBugReportRequest, JoinRequestForm, QuickNoteRequest},
    models::content_models::BlogPost,
    services::eye_cycle::{frame_at, EyeDemoFrame},
    utils::validation,
    AppState,
};

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn eye_demo_state(State(state): State<Arc<AppState>>) -> Json<EyeDemoFrame> {
    Json(frame_at(state.started_at.elapsed()))
}

pub async fn submit_quick_note(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QuickNoteRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let new_report = validation::quick_note(&req.quick_note, Utc::now().timestamp())
        .map_err(validation_failure)?;
    let report = state
        .content
        .create_bug_report(new_report)
        .map_err(|e| store_failure("quick note", e))?;

    tracing::info!("Quick note {} submitted", report.id);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": report.id,
            "message": "Thanks for the quick feedback. We appreciate it!"
        })),
    ))
}

pub async fn submit_bug_report(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DetailedBugReportRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let new_report = validation::detailed_bug_report(&req, Utc::now().timestamp())
        .map_err(validation_failure)?;
    let report = state
        .content
        .create_bug_report(new_report)
        .map_err(|e| store_failure("bug report", e))?;

    tracing::info!("Bug report {} submitted", report.id);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": report.id,
            "message": "Thank you for helping us improve NavEye. We'll look into this issue."
        })),
    ))
}

pub async fn submit_join_request(
    State(state): State<Arc<AppState>>,
    Json(form): Json<JoinRequestForm>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let new_request = validation::join_request(&form, Utc::now().timestamp())
        .map_err(validation_failure)?;
    let request = state
        .content
        .create_join_request(new_request)
        .map_err(|e| store_failure("join request", e))?;

    tracing::info!("Join request {} submitted for {}", request.id, request.role_type);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": request.id,
            "message": "Thank you for your interest. We'll be in touch soon."
        })),
    ))
}

pub async fn list_published_posts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BlogPost>>, ApiError> {
    let posts = state
        .content
        .list_blog_posts(true)
        .map_err(|e| store_failure("blog posts", e))?;
    Ok(Json(posts))
}

pub async fn get_published_post(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<i32>,
) -> Result<Json<BlogPost>, ApiError> {
    state
        .content
        .find_published_blog_post(post_id)
        .map_err(|e| store_failure("blog post", e))?
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Post not found"))
}
