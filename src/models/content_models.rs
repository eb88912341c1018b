use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use crate::schema::{blog_posts, bug_reports, join_requests};

#[derive(Queryable, Selectable, Serialize, Clone, Debug)]
#[diesel(table_name = blog_posts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BlogPost {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub author: String,
    pub author_id: Option<i32>, // admin who created the post
    pub location: Option<String>,
    pub published: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Insertable)]
#[diesel(table_name = blog_posts)]
pub struct NewBlogPost {
    pub title: String,
    pub content: String,
    pub author: String,
    pub author_id: Option<i32>,
    pub location: Option<String>,
    pub published: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(AsChangeset)]
#[diesel(table_name = blog_posts)]
#[diesel(treat_none_as_null = true)]
pub struct BlogPostChanges {
    pub title: String,
    pub content: String,
    pub author: String,
    pub location: Option<String>,
    pub published: bool,
    pub updated_at: i64,
}

#[derive(Queryable, Selectable, Serialize, Clone, Debug)]
#[diesel(table_name = bug_reports)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BugReport {
    pub id: i32,
    pub report_type: String, // "quick" or "detailed"
    pub quick_note: Option<String>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub platform: Option<String>,
    pub description: Option<String>,
    pub steps_to_reproduce: Option<String>,
    pub expected_behavior: Option<String>,
    pub actual_behavior: Option<String>,
    pub email: Option<String>,
    pub status: String,
    pub created_at: i64,
}

#[derive(Insertable, Default, Debug)]
#[diesel(table_name = bug_reports)]
pub struct NewBugReport {
    pub report_type: String,
    pub quick_note: Option<String>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub platform: Option<String>,
    pub description: Option<String>,
    pub steps_to_reproduce: Option<String>,
    pub expected_behavior: Option<String>,
    pub actual_behavior: Option<String>,
    pub email: Option<String>,
    pub status: String,
    pub created_at: i64,
}

#[derive(Queryable, Selectable, Serialize, Clone, Debug)]
#[diesel(table_name = join_requests)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct JoinRequest {
    pub id: i32,
    pub role_type: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub skills: Option<String>,
    pub portfolio_url: Option<String>,
    pub created_at: i64,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = join_requests)]
pub struct NewJoinRequest {
    pub role_type: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub skills: Option<String>,
    pub portfolio_url: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BugStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl BugStatus {
    pub const ALL: [BugStatus; 4] = [
        BugStatus::Open,
        BugStatus::InProgress,
        BugStatus::Resolved,
        BugStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BugStatus::Open => "open",
            BugStatus::InProgress => "in_progress",
            BugStatus::Resolved => "resolved",
            BugStatus::Closed => "closed",
        }
    }
}

impl FromStr for BugStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BugStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown bug report status: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportType {
    Quick,
    Detailed,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Quick => "quick",
            ReportType::Detailed => "detailed",
        }
    }
}

/// Categories offered on the detailed bug report form.
pub const BUG_CATEGORIES: [&str; 7] = [
    "eye-tracking",
    "scrolling",
    "calibration",
    "ui",
    "performance",
    "crash",
    "other",
];

/// Operating systems a bug can be reported against.
pub const BUG_PLATFORMS: [&str; 3] = ["windows", "macos", "linux"];

/// Roles on the join page whose applicants may attach skills and a portfolio.
pub const DEVELOPER_ROLES: [&str; 2] = ["App Maintainers", "Mobile Developers"];

pub fn is_developer_role(role_type: &str) -> bool {
    DEVELOPER_ROLES.contains(&role_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bug_status_round_trips_through_storage_text() {
        for status in BugStatus::ALL {
            assert_eq!(status.as_str().parse::<BugStatus>(), Ok(status));
        }
        assert!("reopened".parse::<BugStatus>().is_err());
    }

    #[test]
    fn only_engineering_roles_are_developer_roles() {
        assert!(is_developer_role("App Maintainers"));
        assert!(is_developer_role("Mobile Developers"));
        assert!(!is_developer_role("Angel Investors"));
        assert!(!is_developer_role("Donors & Supporters"));
    }
}
