//! Application state.

use conveyor_compiler::Compiler;
use conveyor_core::{ConfigSource, Metadata};
use conveyor_db::{PgRepositoryStore, PgUserStore, RepositoryStore, UserStore};
use conveyor_source::GithubSource;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state.
///
/// The compiler is request-scoped in behavior: it holds only the injected
/// collaborators and platform metadata, so one instance serves concurrent
/// compilations.
#[derive(Clone)]
pub struct AppState {
    pub user_store: Arc<dyn UserStore>,
    pub repository_store: Arc<dyn RepositoryStore>,
    pub compiler: Arc<Compiler>,
}

impl AppState {
    pub fn new(pool: PgPool, metadata: Metadata) -> Self {
        let api_address = std::env::var("GITHUB_API_ADDR")
            .unwrap_or_else(|_| "https://api.github.com".to_string());
        let source = Arc::new(GithubSource::new(api_address));

        Self::with_collaborators(
            Arc::new(PgUserStore::new(pool.clone())),
            Arc::new(PgRepositoryStore::new(pool)),
            source,
            metadata,
        )
    }

    /// Assemble state from explicit collaborators. Used by tests and by
    /// deployments with a non-GitHub source.
    pub fn with_collaborators(
        user_store: Arc<dyn UserStore>,
        repository_store: Arc<dyn RepositoryStore>,
        source: Arc<dyn ConfigSource>,
        metadata: Metadata,
    ) -> Self {
        Self {
            user_store,
            repository_store,
            compiler: Arc::new(Compiler::new(source, metadata)),
        }
    }
}
