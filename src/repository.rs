use crate::{
    access::Role,
    models::{AdminStats, ArtisanProfile, CreatePortfolioItemRequest, PortfolioItem, UserRecord},
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// RepoError
///
/// A database failure surfaced to the handler, which answers 500 so the page can
/// show its retry state instead of an empty list.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Repository Trait
///
/// The persistence contract. Handlers and the data-layer role check only ever see
/// this trait, so tests swap in an in-memory mock.
///
/// `get_user` backs every authorization decision: a failed lookup is logged and
/// reported as "no such user", so those paths fail closed. Everything else
/// returns the error.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn get_user(&self, id: &str) -> Option<UserRecord>;
    async fn list_users(&self) -> Result<Vec<UserRecord>, RepoError>;
    // Admin action. `Ok(None)` if the user does not exist.
    async fn set_user_role(&self, id: &str, role: Role) -> Result<Option<UserRecord>, RepoError>;
    async fn get_stats(&self) -> Result<AdminStats, RepoError>;

    // --- Marketplace ---
    async fn list_artisans(&self) -> Result<Vec<ArtisanProfile>, RepoError>;
    async fn get_portfolio(&self, artisan_id: &str) -> Result<Vec<PortfolioItem>, RepoError>;
    async fn create_portfolio_item(
        &self,
        artisan_id: &str,
        req: CreatePortfolioItemRequest,
    ) -> Result<PortfolioItem, RepoError>;
    // Owner-Only: deletes only if artisan_id owns the item.
    async fn delete_portfolio_item(&self, id: Uuid, artisan_id: &str) -> Result<bool, RepoError>;
}

/// RepositoryState
///
/// Shared handle to the persistence layer.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// `Repository` backed by the Postgres schema in `migrations/`.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, email, role, display_name, location, created_at";

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: &str) -> Option<UserRecord> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_user error: {:?}", e);
                None
            })
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, RepoError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC");
        let users = sqlx::query_as::<_, UserRecord>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn set_user_role(&self, id: &str, role: Role) -> Result<Option<UserRecord>, RepoError> {
        let sql = format!("UPDATE users SET role = $1 WHERE id = $2 RETURNING {USER_COLUMNS}");
        let user = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(role.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// get_stats
    ///
    /// One round trip of scalar subqueries.
    async fn get_stats(&self) -> Result<AdminStats, RepoError> {
        let stats = sqlx::query_as::<_, AdminStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM users WHERE role = 'admin') AS admins,
                (SELECT COUNT(*) FROM users WHERE role = 'artisan') AS artisans,
                (SELECT COUNT(*) FROM users WHERE role = 'client') AS clients,
                (SELECT COUNT(*) FROM portfolio_items) AS portfolio_items
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }

    async fn list_artisans(&self) -> Result<Vec<ArtisanProfile>, RepoError> {
        let artisans = sqlx::query_as::<_, ArtisanProfile>(
            "SELECT id, display_name, location FROM users WHERE role = 'artisan' ORDER BY display_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(artisans)
    }

    async fn get_portfolio(&self, artisan_id: &str) -> Result<Vec<PortfolioItem>, RepoError> {
        let items = sqlx::query_as::<_, PortfolioItem>(
            r#"SELECT id, artisan_id, title, description, image_key, created_at
               FROM portfolio_items
               WHERE artisan_id = $1
               ORDER BY created_at DESC"#,
        )
        .bind(artisan_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn create_portfolio_item(
        &self,
        artisan_id: &str,
        req: CreatePortfolioItemRequest,
    ) -> Result<PortfolioItem, RepoError> {
        let item = sqlx::query_as::<_, PortfolioItem>(
            r#"INSERT INTO portfolio_items (id, artisan_id, title, description, image_key, created_at)
               VALUES ($1, $2, $3, $4, $5, NOW())
               RETURNING id, artisan_id, title, description, image_key, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(artisan_id)
        .bind(req.title)
        .bind(req.description)
        .bind(req.image_key)
        .fetch_one(&self.pool)
        .await?;
        Ok(item)
    }

    async fn delete_portfolio_item(&self, id: Uuid, artisan_id: &str) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM portfolio_items WHERE id = $1 AND artisan_id = $2")
            .bind(id)
            .bind(artisan_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
