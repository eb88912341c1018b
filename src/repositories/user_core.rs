use diesel::prelude::*;
use diesel::sql_types::Text;
use crate::{
    error::StoreError,
    models::user_models::{NewUser, NewUserRole, User, ADMIN_ROLE},
    schema::{user_roles, users},
    DbPool,
};

define_sql_function! {
    fn lower(x: Text) -> Text;
}

pub struct UserCore {
    pool: DbPool
}

impl UserCore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn create_user(&self, email: &str, password_hash: &str, now: i64) -> Result<User, StoreError> {
        let mut conn = self.pool.get()?;
        let user = conn.transaction(|conn| {
            diesel::insert_into(users::table)
                .values(&NewUser {
                    email: email.trim().to_lowercase(),
                    password_hash: password_hash.to_string(),
                    created_at: now,
                })
                .execute(conn)?;
            users::table
                .filter(users::email.eq(email.trim().to_lowercase()))
                .select(User::as_select())
                .first(conn)
        })?;
        Ok(user)
    }

    pub fn find_by_email(&self, search_email: &str) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.get()?;
        let user = users::table
            .filter(lower(users::email).eq(lower(search_email.trim())))
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(user)
    }

    pub fn find_by_id(&self, user_id: i32) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.get()?;
        let user = users::table
            .find(user_id)
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(user)
    }

    pub fn has_role(&self, user_id: i32, role: &str) -> Result<bool, StoreError> {
        let mut conn = self.pool.get()?;
        let count: i64 = user_roles::table
            .filter(user_roles::user_id.eq(user_id))
            .filter(user_roles::role.eq(role))
            .count()
            .get_result(&mut conn)?;
        Ok(count > 0)
    }

    pub fn is_admin(&self, user_id: i32) -> Result<bool, StoreError> {
        self.has_role(user_id, ADMIN_ROLE)
    }

    /// Grants a role, doing nothing if the user already holds it.
    pub fn grant_role(&self, user_id: i32, role: &str, now: i64) -> Result<(), StoreError> {
        let mut conn = self.pool.get()?;
        diesel::insert_or_ignore_into(user_roles::table)
            .values(&NewUserRole {
                user_id,
                role: role.to_string(),
                created_at: now,
            })
            .execute(&mut conn)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;

    #[test]
    fn admin_role_is_granted_once() {
        let core = UserCore::new(memory_pool().unwrap());
        let user = core.create_user("Admin@NavEye.app", "hash", 1).unwrap();
        assert_eq!(user.email, "admin@naveye.app");
        assert!(!core.is_admin(user.id).unwrap());

        core.grant_role(user.id, ADMIN_ROLE, 2).unwrap();
        core.grant_role(user.id, ADMIN_ROLE, 3).unwrap();
        assert!(core.is_admin(user.id).unwrap());
        assert!(!core.has_role(user.id, "moderator").unwrap());
    }

    #[test]
    fn email_lookup_ignores_case() {
        let core = UserCore::new(memory_pool().unwrap());
        core.create_user("ami_admin@naveye.app", "hash", 1).unwrap();
        assert!(core.find_by_email("AMI_ADMIN@naveye.app").unwrap().is_some());
        assert!(core.find_by_email("someone@else.app").unwrap().is_none());
    }
}
