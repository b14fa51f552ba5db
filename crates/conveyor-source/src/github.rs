//! GitHub-backed configuration source.

use async_trait::async_trait;
use conveyor_core::source::{ConfigSource, SourceError, SourceResult};
use conveyor_core::user::User;
use std::time::Duration;
use tracing::{debug, warn};

/// Maximum fetch attempts before giving up on a configuration.
const MAX_ATTEMPTS: u32 = 5;

/// Fetches pipeline definitions through the GitHub contents API.
///
/// Transient failures are retried with a linearly growing delay; a definite
/// not-found is returned immediately. Once the attempt budget is exhausted
/// the error is terminal for the compilation.
pub struct GithubSource {
    client: reqwest::Client,
    api_address: String,
    config_path: String,
}

impl GithubSource {
    pub fn new(api_address: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_address: api_address.into(),
            config_path: ".conveyor.kdl".to_string(),
        }
    }

    /// Override the in-repository path of the pipeline definition.
    pub fn with_config_path(mut self, path: impl Into<String>) -> Self {
        self.config_path = path.into();
        self
    }

    fn contents_url(&self, org: &str, repo: &str, ref_override: Option<&str>) -> String {
        // The config path may contain slashes; those are path separators to
        // the contents API and must not be escaped.
        let mut url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_address,
            urlencoding::encode(org),
            urlencoding::encode(repo),
            self.config_path,
        );
        if let Some(r) = ref_override {
            url.push_str(&format!("?ref={}", urlencoding::encode(r)));
        }
        url
    }

    async fn fetch_once(
        &self,
        owner: &User,
        org: &str,
        repo: &str,
        ref_override: Option<&str>,
    ) -> SourceResult<Vec<u8>> {
        let response = self
            .client
            .get(self.contents_url(org, repo, ref_override))
            .header("Authorization", format!("Bearer {}", owner.token))
            .header("User-Agent", "Conveyor-CI")
            .header("Accept", "application/vnd.github.raw+json")
            .send()
            .await
            .map_err(|e| SourceError::Request(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound {
                org: org.to_string(),
                repo: repo.to_string(),
            });
        }

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(SourceError::Api(format!("{}: {}", status, text)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SourceError::Request(e.to_string()))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl ConfigSource for GithubSource {
    async fn fetch_config(
        &self,
        owner: &User,
        org: &str,
        repo: &str,
        ref_override: Option<&str>,
    ) -> SourceResult<Vec<u8>> {
        let mut last_message = String::new();

        for attempt in 1..=MAX_ATTEMPTS {
            match self.fetch_once(owner, org, repo, ref_override).await {
                Ok(config) => {
                    debug!(org, repo, attempt, "fetched pipeline configuration");
                    return Ok(config);
                }
                // A missing file will not appear on retry.
                Err(err @ SourceError::NotFound { .. }) => return Err(err),
                Err(err) => {
                    warn!(org, repo, attempt, error = %err, "configuration fetch failed");
                    last_message = err.to_string();
                }
            }

            if attempt < MAX_ATTEMPTS {
                tokio::time::sleep(backoff(attempt)).await;
            }
        }

        Err(SourceError::RetriesExhausted {
            attempts: MAX_ATTEMPTS,
            message: last_message,
        })
    }
}

/// Delay before the next attempt: one additional second per failure.
fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(u64::from(attempt))
}
