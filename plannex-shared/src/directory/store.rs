/// Persistence seam for the user directory
///
/// [`UserStore`] is everything the directory needs from storage. Production
/// uses [`PgUserStore`]; tests use
/// [`MemoryUserStore`](super::memory::MemoryUserStore).

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::{UpdateUser, User};

/// Error type for user store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write; carries the constraint name
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Another row still references the one being written or deleted;
    /// carries the constraint name
    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unique").to_string();
                return StoreError::UniqueViolation(constraint);
            }
            if db_err.is_foreign_key_violation() {
                let constraint = db_err.constraint().unwrap_or("foreign key").to_string();
                return StoreError::ForeignKeyViolation(constraint);
            }
        }
        StoreError::Database(err)
    }
}

/// Storage operations backing [`UserDirectory`](super::UserDirectory)
#[async_trait]
pub trait UserStore: Send + Sync {
    /// One page of users matching `search`, plus the total match count
    ///
    /// `search` is a raw term (not a pattern) matched case-insensitively as a
    /// substring of email or full name. Page and total must come from the
    /// same snapshot. Ordering is `created_at` descending, then `id`
    /// descending.
    async fn search(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<User>, i64), StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Applies a partial update; `None` if no user has `id`
    async fn update(&self, id: Uuid, patch: UpdateUser) -> Result<Option<User>, StoreError>;

    /// Deletes a user; false if no user had `id`
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

/// PostgreSQL-backed user store
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn search(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<User>, i64), StoreError> {
        Ok(User::search(&self.pool, search, limit, offset).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn update(&self, id: Uuid, patch: UpdateUser) -> Result<Option<User>, StoreError> {
        Ok(User::update(&self.pool, id, patch).await?)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(User::delete(&self.pool, id).await?)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_are_not_unique_violations() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::UniqueViolation("user_email_key".to_string());
        assert_eq!(err.to_string(), "Unique constraint violated: user_email_key");
    }
}
