//! API server for the Conveyor pipeline compiler.
//!
//! Exposes pipeline compilation over HTTP REST.

pub mod error;
pub mod routes;
pub mod state;

pub use state::AppState;
