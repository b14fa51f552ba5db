//! Repository identity records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A connected Git repository whose pipeline configuration Conveyor can
/// compile. Identity only; the compiler does not mutate these records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub id: Uuid,
    /// Owner whose token is used for configuration retrieval.
    pub user_id: Uuid,
    pub org: String,
    pub name: String,
    /// `org/name`, unique across the system.
    pub full_name: String,
    /// Default branch configurations are fetched from.
    pub branch: String,
    /// Path of the pipeline definition within the repository.
    pub config_path: String,
    pub created_at: DateTime<Utc>,
}
