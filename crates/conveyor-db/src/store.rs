//! Store traits and Postgres implementations.

pub mod repository;
pub mod user;

pub use repository::{PgRepositoryStore, RepositoryStore};
pub use user::{PgUserStore, UserStore};
