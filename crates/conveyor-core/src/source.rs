//! Configuration retrieval trait.

use async_trait::async_trait;
use thiserror::Error;

use crate::user::User;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("configuration not found for {org}/{repo}")]
    NotFound { org: String, repo: String },

    #[error("request failed: {0}")]
    Request(String),

    #[error("source API error: {0}")]
    Api(String),

    #[error("retries exhausted after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },
}

pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Retrieves raw pipeline configuration text from a source-code host.
///
/// Implementations own their retry/backoff policy; when a fetch returns an
/// error the caller treats it as terminal for that compilation and performs
/// no further retries.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Fetch the raw pipeline definition for `org/repo`, authenticated as
    /// `owner`. `ref_override` selects a commit or branch other than the
    /// repository default.
    async fn fetch_config(
        &self,
        owner: &User,
        org: &str,
        repo: &str,
        ref_override: Option<&str>,
    ) -> SourceResult<Vec<u8>>;
}
