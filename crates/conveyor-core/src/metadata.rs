//! Platform metadata attached to every compilation.

use serde::{Deserialize, Serialize};

/// Ambient platform context threaded through a compilation. Injected by the
/// caller, never derived or mutated by the compiler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub server: ServerMetadata,
    pub source: SourceMetadata,
    pub queue: QueueMetadata,
}

/// Address of the Conveyor server itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerMetadata {
    pub address: String,
}

/// Address of the source-code host configurations are fetched from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub address: String,
}

/// Queue channel compiled pipelines are published to for execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueMetadata {
    pub channel: String,
}

impl Metadata {
    /// Build metadata from `CONVEYOR_*` environment variables, falling back
    /// to development defaults.
    pub fn from_env() -> Self {
        Self {
            server: ServerMetadata {
                address: std::env::var("CONVEYOR_SERVER_ADDR")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            },
            source: SourceMetadata {
                address: std::env::var("CONVEYOR_SOURCE_ADDR")
                    .unwrap_or_else(|_| "https://github.com".to_string()),
            },
            queue: QueueMetadata {
                channel: std::env::var("CONVEYOR_QUEUE_CHANNEL")
                    .unwrap_or_else(|_| "conveyor".to_string()),
            },
        }
    }
}
