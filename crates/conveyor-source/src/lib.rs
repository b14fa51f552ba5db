//! Configuration retrieval backends.
//!
//! Implementations of [`ConfigSource`](conveyor_core::ConfigSource): a
//! GitHub-backed source with bounded retry, and an in-memory source for
//! tests and local development.

pub mod github;
pub mod memory;

pub use github::GithubSource;
pub use memory::MemorySource;
