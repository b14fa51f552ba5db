//! In-memory configuration source for tests and local development.

use async_trait::async_trait;
use conveyor_core::source::{ConfigSource, SourceError, SourceResult};
use conveyor_core::user::User;
use std::collections::HashMap;
use std::sync::RwLock;

/// Serves configurations from an in-process map keyed by `org/repo`.
#[derive(Default)]
pub struct MemorySource {
    configs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the configuration served for `org/repo`.
    pub fn insert(&self, org: &str, repo: &str, config: impl Into<Vec<u8>>) {
        self.configs
            .write()
            .expect("config map lock poisoned")
            .insert(format!("{}/{}", org, repo), config.into());
    }
}

#[async_trait]
impl ConfigSource for MemorySource {
    async fn fetch_config(
        &self,
        _owner: &User,
        org: &str,
        repo: &str,
        _ref_override: Option<&str>,
    ) -> SourceResult<Vec<u8>> {
        self.configs
            .read()
            .expect("config map lock poisoned")
            .get(&format!("{}/{}", org, repo))
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                org: org.to_string(),
                repo: repo.to_string(),
            })
    }
}
