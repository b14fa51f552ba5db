//! User and repository stores for Conveyor.
//!
//! The compiler needs two lookups from persistence: the repository identity
//! for an `org/name` pair, and the owner record whose token authenticates
//! configuration retrieval. Both are read-only from the compiler's side.

pub mod error;
pub mod store;

pub use error::{DbError, DbResult};
pub use store::{PgRepositoryStore, PgUserStore, RepositoryStore, UserStore};

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Create a connection pool for the given database URL.
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}
