//! User records for repository owners.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The owner of a connected repository. The access token is used when
/// fetching that repository's pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Source-host access token. Never serialized into responses.
    #[serde(skip_serializing)]
    pub token: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}
