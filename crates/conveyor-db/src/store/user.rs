//! User store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use conveyor_core::ResourceId;
use conveyor_core::user::User;
use sqlx::PgPool;

use crate::{DbError, DbResult};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up the owner record for a repository's user id.
    async fn get_by_id(&self, id: ResourceId) -> DbResult<User>;
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: uuid::Uuid,
    name: String,
    token: String,
    active: bool,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            token: row.token,
            active: row.active,
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL implementation of UserStore.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get_by_id(&self, id: ResourceId) -> DbResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, token, active, created_at FROM users WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("user {}", id)))?;
        Ok(row.into())
    }
}
