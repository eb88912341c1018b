use diesel::prelude::*;
use diesel::dsl::sql;
use diesel::sql_types::Integer;
use crate::{
    error::StoreError,
    models::content_models::{
        BlogPost, BlogPostChanges, BugReport, BugStatus, JoinRequest, NewBlogPost, NewBugReport,
        NewJoinRequest,
    },
    schema::{blog_posts, bug_reports, join_requests},
    DbPool,
};

/// Blog posts, bug reports and join requests.
pub struct ContentRepository {
    pool: DbPool,
}

fn last_insert_id(conn: &mut SqliteConnection) -> QueryResult<i32> {
    diesel::select(sql::<Integer>("last_insert_rowid()")).get_result(conn)
}

impl ContentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    // Blog posts

    pub fn create_blog_post(&self, new_post: NewBlogPost) -> Result<BlogPost, StoreError> {
        let mut conn = self.pool.get()?;
        let post = conn.transaction(|conn| {
            diesel::insert_into(blog_posts::table)
                .values(&new_post)
                .execute(conn)?;
            let id = last_insert_id(conn)?;
            blog_posts::table
                .find(id)
                .select(BlogPost::as_select())
                .first(conn)
        })?;
        Ok(post)
    }

    pub fn update_blog_post(&self, post_id: i32, changes: BlogPostChanges) -> Result<BlogPost, StoreError> {
        let mut conn = self.pool.get()?;
        let post = conn.transaction(|conn| {
            let updated = diesel::update(blog_posts::table.find(post_id))
                .set(&changes)
                .execute(conn)?;
            if updated == 0 {
                return Err(diesel::result::Error::NotFound);
            }
            blog_posts::table
                .find(post_id)
                .select(BlogPost::as_select())
                .first(conn)
        })?;
        Ok(post)
    }

    pub fn toggle_blog_post_published(&self, post_id: i32, now: i64) -> Result<BlogPost, StoreError> {
        let mut conn = self.pool.get()?;
        let post = conn.transaction(|conn| {
            let current: bool = blog_posts::table
                .find(post_id)
                .select(blog_posts::published)
                .first(conn)?;
            diesel::update(blog_posts::table.find(post_id))
                .set((
                    blog_posts::published.eq(!current),
                    blog_posts::updated_at.eq(now),
                ))
                .execute(conn)?;
            blog_posts::table
                .find(post_id)
                .select(BlogPost::as_select())
                .first(conn)
        })?;
        Ok(post)
    }

    pub fn delete_blog_post(&self, post_id: i32) -> Result<(), StoreError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(blog_posts::table.find(post_id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(StoreError::Query(diesel::result::Error::NotFound));
        }
        Ok(())
    }

    /// Newest first.
    pub fn list_blog_posts(&self, published_only: bool) -> Result<Vec<BlogPost>, StoreError> {
        let mut conn = self.pool.get()?;
        let mut query = blog_posts::table
            .select(BlogPost::as_select())
            .order((blog_posts::created_at.desc(), blog_posts::id.desc()))
            .into_boxed();
        if published_only {
            query = query.filter(blog_posts::published.eq(true));
        }
        Ok(query.load(&mut conn)?)
    }

    pub fn find_published_blog_post(&self, post_id: i32) -> Result<Option<BlogPost>, StoreError> {
        let mut conn = self.pool.get()?;
        let post = blog_posts::table
            .find(post_id)
            .filter(blog_posts::published.eq(true))
            .select(BlogPost::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(post)
    }

    // Bug reports

    pub fn create_bug_report(&self, new_report: NewBugReport) -> Result<BugReport, StoreError> {
        let mut conn = self.pool.get()?;
        let report = conn.transaction(|conn| {
            diesel::insert_into(bug_reports::table)
                .values(&new_report)
                .execute(conn)?;
            let id = last_insert_id(conn)?;
            bug_reports::table
                .find(id)
                .select(BugReport::as_select())
                .first(conn)
        })?;
        Ok(report)
    }

    /// Newest first, optionally restricted to one status.
    pub fn list_bug_reports(&self, status: Option<BugStatus>) -> Result<Vec<BugReport>, StoreError> {
        let mut conn = self.pool.get()?;
        let mut query = bug_reports::table
            .select(BugReport::as_select())
            .order((bug_reports::created_at.desc(), bug_reports::id.desc()))
            .into_boxed();
        if let Some(status) = status {
            query = query.filter(bug_reports::status.eq(status.as_str()));
        }
        Ok(query.load(&mut conn)?)
    }

    /// Number of reports per stored status value.
    pub fn count_bug_reports_by_status(&self) -> Result<Vec<(String, i64)>, StoreError> {
        let mut conn = self.pool.get()?;
        let counts = bug_reports::table
            .group_by(bug_reports::status)
            .select((bug_reports::status, diesel::dsl::count_star()))
            .load::<(String, i64)>(&mut conn)?;
        Ok(counts)
    }

    pub fn update_bug_report_status(&self, report_id: i32, status: BugStatus) -> Result<BugReport, StoreError> {
        let mut conn = self.pool.get()?;
        let report = conn.transaction(|conn| {
            let updated = diesel::update(bug_reports::table.find(report_id))
                .set(bug_reports::status.eq(status.as_str()))
                .execute(conn)?;
            if updated == 0 {
                return Err(diesel::result::Error::NotFound);
            }
            bug_reports::table
                .find(report_id)
                .select(BugReport::as_select())
                .first(conn)
        })?;
        Ok(report)
    }

    pub fn delete_bug_report(&self, report_id: i32) -> Result<(), StoreError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(bug_reports::table.find(report_id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(StoreError::Query(diesel::result::Error::NotFound));
        }
        Ok(())
    }

    // Join requests

    pub fn create_join_request(&self, new_request: NewJoinRequest) -> Result<JoinRequest, StoreError> {
        let mut conn = self.pool.get()?;
        let request = conn.transaction(|conn| {
            diesel::insert_into(join_requests::table)
                .values(&new_request)
                .execute(conn)?;
            let id = last_insert_id(conn)?;
            join_requests::table
                .find(id)
                .select(JoinRequest::as_select())
                .first(conn)
        })?;
        Ok(request)
    }

    pub fn list_join_requests(&self) -> Result<Vec<JoinRequest>, StoreError> {
        let mut conn = self.pool.get()?;
        let requests = join_requests::table
            .select(JoinRequest::as_select())
            .order((join_requests::created_at.desc(), join_requests::id.desc()))
            .load(&mut conn)?;
        Ok(requests)
    }
}
