use serde::{Deserialize, Serialize};
use crate::models::content_models::{BugReport, BugStatus};

#[derive(Deserialize)]
pub struct QuickNoteRequest {
    pub quick_note: String,
}

#[derive(Deserialize)]
pub struct DetailedBugReportRequest {
    pub title: String,
    pub category: String,
    pub platform: String,
    pub description: String,
    #[serde(default)]
    pub steps_to_reproduce: Option<String>,
    #[serde(default)]
    pub expected_behavior: Option<String>,
    #[serde(default)]
    pub actual_behavior: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct JoinRequestForm {
    pub role_type: String,
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default)]
    pub portfolio_url: Option<String>,
}

#[derive(Deserialize)]
pub struct BlogPostForm {
    pub title: String,
    pub content: String,
    pub author: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub published: bool,
}

#[derive(Deserialize)]
pub struct StatusUpdateRequest {
    pub status: BugStatus,
}

#[derive(Debug, Deserialize)]
pub struct BugReportFilter {
    pub status: Option<BugStatus>,
}

#[derive(Serialize, Default, Debug, PartialEq, Eq)]
pub struct StatusCounts {
    pub open: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub closed: usize,
}

impl StatusCounts {
    /// Builds the counts from `(status, count)` rows.
    pub fn from_rows(rows: &[(String, i64)]) -> Self {
        let mut counts = Self::default();
        for (status, count) in rows {
            let count = usize::try_from(*count).unwrap_or(0);
            match status.parse::<BugStatus>() {
                Ok(BugStatus::Open) => counts.open += count,
                Ok(BugStatus::InProgress) => counts.in_progress += count,
                Ok(BugStatus::Resolved) => counts.resolved += count,
                Ok(BugStatus::Closed) => counts.closed += count,
                Err(e) => tracing::warn!("Skipping {} bug reports: {}", count, e),
            }
        }
        counts
    }
}

#[derive(Serialize)]
pub struct BugReportListResponse {
    pub reports: Vec<BugReport>,
    pub counts: StatusCounts,
}
