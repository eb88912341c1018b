use std::sync::Arc;
use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde_json::json;

use crate::{
    error::{store_failure, validation_failure, ApiError},
    handlers::{
        auth_middleware::AuthUser,
        content_dtos::{BlogPostForm, BugReportFilter, BugReportListResponse, StatusCounts, StatusUpdateRequest},
    },
    models::content_models::{BlogPost, BlogPostChanges, BugReport, JoinRequest, NewBlogPost},
    utils::validation,
    AppState,
};

// Blog

pub async fn list_all_posts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BlogPost>>, ApiError> {
    let posts = state
        .content
        .list_blog_posts(false)
        .map_err(|e| store_failure("blog posts", e))?;
    Ok(Json(posts))
}

pub async fn create_post(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Json(form): Json<BlogPostForm>,
) -> Result<(StatusCode, Json<BlogPost>), ApiError> {
    let valid = validation::blog_post(&form).map_err(validation_failure)?;
    let now = Utc::now().timestamp();

    let post = state
        .content
        .create_blog_post(NewBlogPost {
            title: valid.title,
            content: valid.content,
            author: valid.author,
            author_id: Some(auth_user.user_id),
            location: valid.location,
            published: valid.published,
            created_at: now,
            updated_at: now,
        })
        .map_err(|e| store_failure("blog post", e))?;

    tracing::info!(
        "Admin {} created blog post {} (published: {})",
        auth_user.user_id,
        post.id,
        post.published
    );
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update_post(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<i32>,
    Json(form): Json<BlogPostForm>,
) -> Result<Json<BlogPost>, ApiError> {
    let valid = validation::blog_post(&form).map_err(validation_failure)?;
    let post = state
        .content
        .update_blog_post(
            post_id,
            BlogPostChanges {
                title: valid.title,
                content: valid.content,
                author: valid.author,
                location: valid.location,
                published: valid.published,
                updated_at: Utc::now().timestamp(),
            },
        )
        .map_err(|e| store_failure("blog post", e))?;
    Ok(Json(post))
}

pub async fn toggle_post_published(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<i32>,
) -> Result<Json<BlogPost>, ApiError> {
    let post = state
        .content
        .toggle_blog_post_published(post_id, Utc::now().timestamp())
        .map_err(|e| store_failure("blog post", e))?;
    tracing::info!("Blog post {} is now {}", post.id, if post.published { "live" } else { "a draft" });
    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<i32>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .content
        .delete_blog_post(post_id)
        .map_err(|e| store_failure("blog post", e))?;
    Ok(Json(json!({
        "message": "The blog post has been removed."
    })))
}

// Bug reports

pub async fn list_bug_reports(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<BugReportFilter>,
) -> Result<Json<BugReportListResponse>, ApiError> {
    let reports = state
        .content
        .list_bug_reports(filter.status)
        .map_err(|e| store_failure("bug reports", e))?;
    // Counts cover every report, not just the filtered ones.
    let counts = state
        .content
        .count_bug_reports_by_status()
        .map_err(|e| store_failure("bug reports", e))?;
    Ok(Json(BugReportListResponse {
        reports,
        counts: StatusCounts::from_rows(&counts),
    }))
}

pub async fn update_bug_report_status(
    State(state): State<Arc<AppState>>,
    Path(report_id): Path<i32>,
    Json(req): Json<StatusUpdateRequest>,
) -> Result<Json<BugReport>, ApiError> {
    let report = state
        .content
        .update_bug_report_status(report_id, req.status)
        .map_err(|e| store_failure("bug report", e))?;
    tracing::info!("Bug report {} status changed to {}", report.id, req.status.as_str());
    Ok(Json(report))
}

pub async fn delete_bug_report(
    State(state): State<Arc<AppState>>,
    Path(report_id): Path<i32>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .content
        .delete_bug_report(report_id)
        .map_err(|e| store_failure("bug report", e))?;
    Ok(Json(json!({
        "message": "The bug report has been removed."
    })))
}

// Join requests

pub async fn list_join_requests(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<JoinRequest>>, ApiError> {
    let requests = state
        .content
        .list_join_requests()
        .map_err(|e| store_failure("join requests", e))?;
    Ok(Json(requests))
}
