//! User repository trait and implementation

use crate::error::Result;
use crate::models::User;
use async_trait::async_trait;
use sqlx::{query_as, SqlitePool};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// User repository interface for data access operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by the external account handle
    ///
    /// # Returns
    /// - `Ok(Some(user))` if found
    /// - `Ok(None)` if not found
    async fn find_by_osm_user(&self, osm_user: &str) -> Result<Option<User>>;

    /// Get the user with the given handle, creating it on first encounter
    ///
    /// Idempotent: calling twice with the same handle never creates a
    /// duplicate row.
    async fn get_or_create(&self, osm_user: &str) -> Result<User>;
}

/// SQLite implementation of UserRepository
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Create a new SQLite user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn now_unix() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_by_osm_user(&self, osm_user: &str) -> Result<Option<User>> {
        let user = query_as::<_, User>("SELECT * FROM users WHERE osm_user = ?")
            .bind(osm_user)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn get_or_create(&self, osm_user: &str) -> Result<User> {
        if let Some(existing) = self.find_by_osm_user(osm_user).await? {
            return Ok(existing);
        }

        let created_at = Self::now_unix();
        let result = sqlx::query("INSERT INTO users (osm_user, created_at) VALUES (?, ?)")
            .bind(osm_user)
            .bind(created_at)
            .execute(&self.pool)
            .await?;

        debug!(osm_user, "Created user");

        Ok(User {
            id: result.last_insert_rowid(),
            osm_user: osm_user.to_string(),
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteUserRepository::new(pool.clone());

        let first = repo.get_or_create("mapper").await.unwrap();
        let second = repo.get_or_create("mapper").await.unwrap();
        assert_eq!(first.id, second.id);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_find_by_osm_user_missing() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteUserRepository::new(pool);

        assert!(repo.find_by_osm_user("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_distinct_handles_create_distinct_users() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteUserRepository::new(pool);

        let a = repo.get_or_create("alice").await.unwrap();
        let b = repo.get_or_create("bob").await.unwrap();
        assert_ne!(a.id, b.id);
    }
}
