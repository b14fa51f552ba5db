//! Repository store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use conveyor_core::repository::Repository;
use sqlx::PgPool;

use crate::{DbError, DbResult};

#[async_trait]
pub trait RepositoryStore: Send + Sync {
    /// Look up a repository by its `org` and `name` pair.
    async fn get_by_full_name(&self, org: &str, name: &str) -> DbResult<Repository>;
}

#[derive(sqlx::FromRow)]
struct RepositoryRow {
    id: uuid::Uuid,
    user_id: uuid::Uuid,
    org: String,
    name: String,
    full_name: String,
    branch: String,
    config_path: String,
    created_at: DateTime<Utc>,
}

impl From<RepositoryRow> for Repository {
    fn from(row: RepositoryRow) -> Self {
        Repository {
            id: row.id,
            user_id: row.user_id,
            org: row.org,
            name: row.name,
            full_name: row.full_name,
            branch: row.branch,
            config_path: row.config_path,
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL implementation of RepositoryStore.
pub struct PgRepositoryStore {
    pool: PgPool,
}

impl PgRepositoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RepositoryStore for PgRepositoryStore {
    async fn get_by_full_name(&self, org: &str, name: &str) -> DbResult<Repository> {
        let row = sqlx::query_as::<_, RepositoryRow>(
            r#"
            SELECT id, user_id, org, name, full_name, branch, config_path, created_at
            FROM repositories
            WHERE org = $1 AND name = $2
            "#,
        )
        .bind(org)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("repository {}/{}", org, name)))?;
        Ok(row.into())
    }
}
