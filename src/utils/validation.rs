use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use crate::{
    handlers::content_dtos::{BlogPostForm, DetailedBugReportRequest, JoinRequestForm},
    models::content_models::{
        is_developer_role, BugStatus, NewBugReport, NewJoinRequest, ReportType, BUG_CATEGORIES,
        BUG_PLATFORMS,
    },
};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

fn label(field: &'static str) -> String {
    let mut words = field.replace('_', " ");
    if let Some(first) = words.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    words
}

fn too_long(field: &'static str, max: usize) -> FieldError {
    FieldError::new(field, format!("{} must be less than {} characters", label(field), max))
}

/// Trimmed, non-empty, at most `max` characters.
pub fn required_text(field: &'static str, value: &str, max: usize) -> Result<String, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new(field, format!("{} is required", label(field))));
    }
    if trimmed.chars().count() > max {
        return Err(too_long(field, max));
    }
    Ok(trimmed.to_string())
}

/// Trimmed; blank becomes `None`.
pub fn optional_text(field: &'static str, value: Option<&str>, max: usize) -> Result<Option<String>, FieldError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) if v.chars().count() > max => Err(too_long(field, max)),
        Some(v) => Ok(Some(v.to_string())),
    }
}

pub fn email(field: &'static str, value: &str, max: usize) -> Result<String, FieldError> {
    let trimmed = value.trim();
    if !EMAIL_RE.is_match(trimmed) {
        return Err(FieldError::new(field, "Invalid email address"));
    }
    if trimmed.chars().count() > max {
        return Err(too_long(field, max));
    }
    Ok(trimmed.to_string())
}

pub fn optional_email(field: &'static str, value: Option<&str>, max: usize) -> Result<Option<String>, FieldError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => email(field, v, max).map(Some),
    }
}

/// Absolute http(s) URL; blank becomes `None`.
pub fn optional_url(field: &'static str, value: Option<&str>, max: usize) -> Result<Option<String>, FieldError> {
    let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    match url::Url::parse(v) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
        _ => return Err(FieldError::new(field, "Invalid URL")),
    }
    if v.chars().count() > max {
        return Err(too_long(field, max));
    }
    Ok(Some(v.to_string()))
}

pub fn one_of(field: &'static str, value: &str, allowed: &[&str]) -> Result<String, FieldError> {
    let trimmed = value.trim();
    if allowed.contains(&trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(FieldError::new(field, format!("Unknown {}: {}", field.replace('_', " "), trimmed)))
    }
}

pub fn quick_note(note: &str, now: i64) -> Result<NewBugReport, FieldError> {
    Ok(NewBugReport {
        report_type: ReportType::Quick.as_str().to_string(),
        quick_note: Some(required_text("quick_note", note, 2000)?),
        status: BugStatus::Open.as_str().to_string(),
        created_at: now,
        ..Default::default()
    })
}

pub fn detailed_bug_report(form: &DetailedBugReportRequest, now: i64) -> Result<NewBugReport, FieldError> {
    Ok(NewBugReport {
        report_type: ReportType::Detailed.as_str().to_string(),
        quick_note: None,
        title: Some(required_text("title", &form.title, 200)?),
        category: Some(one_of("category", &form.category, &BUG_CATEGORIES)?),
        platform: Some(one_of("platform", &form.platform, &BUG_PLATFORMS)?),
        description: Some(required_text("description", &form.description, 5000)?),
        steps_to_reproduce: optional_text("steps_to_reproduce", form.steps_to_reproduce.as_deref(), 5000)?,
        expected_behavior: optional_text("expected_behavior", form.expected_behavior.as_deref(), 5000)?,
        actual_behavior: optional_text("actual_behavior", form.actual_behavior.as_deref(), 5000)?,
        email: optional_email("email", form.email.as_deref(), 255)?,
        status: BugStatus::Open.as_str().to_string(),
        created_at: now,
    })
}

/// Skills and portfolio are only kept for developer roles.
pub fn join_request(form: &JoinRequestForm, now: i64) -> Result<NewJoinRequest, FieldError> {
    let role_type = required_text("role_type", &form.role_type, 100)?;
    let developer = is_developer_role(&role_type);
    let (skills, portfolio_url) = if developer {
        (
            optional_text("skills", form.skills.as_deref(), 500)?,
            optional_url("portfolio_url", form.portfolio_url.as_deref(), 500)?,
        )
    } else {
        (None, None)
    };

    Ok(NewJoinRequest {
        name: required_text("name", &form.name, 100)?,
        email: email("email", &form.email, 255)?,
        message: required_text("message", &form.message, 2000)?,
        role_type,
        skills,
        portfolio_url,
        created_at: now,
    })
}

pub struct ValidBlogPost {
    pub title: String,
    pub content: String,
    pub author: String,
    pub location: Option<String>,
    pub published: bool,
}

pub fn blog_post(form: &BlogPostForm) -> Result<ValidBlogPost, FieldError> {
    Ok(ValidBlogPost {
        title: required_text("title", &form.title, 200)?,
        content: required_text("content", &form.content, 50_000)?,
        author: required_text("author", &form.author, 100)?,
        location: optional_text("location", form.location.as_deref(), 200)?,
        published: form.published,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join_form(role: &str) -> JoinRequestForm {
        JoinRequestForm {
            role_type: role.to_string(),
            name: "  Ada  ".to_string(),
            email: "ada@example.com".to_string(),
            message: "I'd love to help".to_string(),
            skills: Some("Rust, OpenCV".to_string()),
            portfolio_url: Some("https://ada.dev".to_string()),
        }
    }

    #[test]
    fn required_text_trims_and_bounds() {
        assert_eq!(required_text("name", "  Ami ", 100).unwrap(), "Ami");
        assert_eq!(
            required_text("name", "   ", 100).unwrap_err().message,
            "Name is required"
        );
        assert_eq!(
            required_text("name", &"x".repeat(101), 100).unwrap_err().message,
            "Name must be less than 100 characters"
        );
    }

    #[test]
    fn email_and_url_checks() {
        assert!(email("email", "someone@example.com", 255).is_ok());
        assert_eq!(
            email("email", "not-an-email", 255).unwrap_err().message,
            "Invalid email address"
        );
        assert_eq!(optional_url("portfolio_url", Some(""), 500), Ok(None));
        assert!(optional_url("portfolio_url", Some("ftp://x.org"), 500).is_err());
        assert!(optional_url("portfolio_url", Some("github.com/ami"), 500).is_err());
    }

    #[test]
    fn developer_roles_keep_portfolio_others_drop_it() {
        let dev = join_request(&join_form("App Maintainers"), 1).unwrap();
        assert_eq!(dev.name, "Ada");
        assert_eq!(dev.skills.as_deref(), Some("Rust, OpenCV"));
        assert_eq!(dev.portfolio_url.as_deref(), Some("https://ada.dev"));

        let investor = join_request(&join_form("Angel Investors"), 1).unwrap();
        assert_eq!(investor.skills, None);
        assert_eq!(investor.portfolio_url, None);
    }

    #[test]
    fn invalid_portfolio_is_rejected_for_developers_only() {
        let mut form = join_form("Mobile Developers");
        form.portfolio_url = Some("not a url".to_string());
        assert_eq!(join_request(&form, 1).unwrap_err().field, "portfolio_url");

        form.role_type = "Donors & Supporters".to_string();
        assert!(join_request(&form, 1).is_ok());
    }

    #[test]
    fn detailed_report_requires_known_category_and_platform() {
        let mut form = DetailedBugReportRequest {
            title: "Scroll stutters".to_string(),
            category: "scrolling".to_string(),
            platform: "macos".to_string(),
            description: "Scrolling stops after a minute".to_string(),
            steps_to_reproduce: Some("  ".to_string()),
            expected_behavior: None,
            actual_behavior: None,
            email: Some("".to_string()),
        };
        let report = detailed_bug_report(&form, 5).unwrap();
        assert_eq!(report.report_type, "detailed");
        assert_eq!(report.status, "open");
        assert_eq!(report.steps_to_reproduce, None);
        assert_eq!(report.email, None);

        form.category = "billing".to_string();
        assert_eq!(detailed_bug_report(&form, 5).unwrap_err().field, "category");
    }

    fn detailed_form() -> DetailedBugReportRequest {
        DetailedBugReportRequest {
            title: "Scroll stutters".to_string(),
            category: "scrolling".to_string(),
            platform: "windows".to_string(),
            description: "Scrolling stops after a minute".to_string(),
            steps_to_reproduce: None,
            expected_behavior: None,
            actual_behavior: None,
            email: None,
        }
    }

    #[test]
    fn detailed_report_rejects_overlong_fields() {
        let cases: [(&str, fn(&mut DetailedBugReportRequest)); 6] = [
            ("title", |f| f.title = "t".repeat(201)),
            ("description", |f| f.description = "d".repeat(5001)),
            ("steps_to_reproduce", |f| f.steps_to_reproduce = Some("s".repeat(5001))),
            ("expected_behavior", |f| f.expected_behavior = Some("e".repeat(5001))),
            ("actual_behavior", |f| f.actual_behavior = Some("a".repeat(5001))),
            ("email", |f| f.email = Some(format!("{}@example.com", "x".repeat(250)))),
        ];
        for (field, overflow) in cases {
            let mut form = detailed_form();
            overflow(&mut form);
            assert_eq!(detailed_bug_report(&form, 1).unwrap_err().field, field);
        }

        let mut at_limit = detailed_form();
        at_limit.title = "t".repeat(200);
        at_limit.description = "d".repeat(5000);
        assert!(detailed_bug_report(&at_limit, 1).is_ok());
    }

    #[test]
    fn join_request_rejects_overlong_fields() {
        let cases: [(&str, fn(&mut JoinRequestForm)); 5] = [
            ("name", |f| f.name = "n".repeat(101)),
            ("email", |f| f.email = format!("{}@example.com", "x".repeat(250))),
            ("message", |f| f.message = "m".repeat(2001)),
            ("skills", |f| f.skills = Some("s".repeat(501))),
            ("portfolio_url", |f| {
                f.portfolio_url = Some(format!("https://ada.dev/{}", "p".repeat(490)))
            }),
        ];
        for (field, overflow) in cases {
            let mut form = join_form("App Maintainers");
            overflow(&mut form);
            let err = join_request(&form, 1).unwrap_err();
            assert_eq!(err.field, field);
            assert!(err.message.contains("must be less than"), "{}", err.message);
        }
    }

    #[test]
    fn quick_note_must_not_be_blank() {
        assert!(quick_note("\n\t ", 1).is_err());
        assert_eq!(
            quick_note(" camera light stays on ", 1).unwrap().quick_note.as_deref(),
            Some("camera light stays on")
        );
    }
}
