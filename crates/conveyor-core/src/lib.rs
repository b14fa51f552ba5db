//! Core domain types and traits for the Conveyor pipeline compiler.
//!
//! This crate contains:
//! - Resource identifiers and common types
//! - Pipeline document types (templates, stages, steps)
//! - Compiled pipeline output types
//! - Platform metadata attached to every compilation
//! - User and repository identity records
//! - The `ConfigSource` trait for configuration retrieval
//!
//! Per-concern error types live beside their concern (`SourceError` here,
//! compiler and store errors in their own crates).

pub mod id;
pub mod metadata;
pub mod pipeline;
pub mod repository;
pub mod source;
pub mod user;

pub use id::ResourceId;
pub use metadata::Metadata;
pub use source::{ConfigSource, SourceError};
