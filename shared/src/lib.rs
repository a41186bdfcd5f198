//! Shared types for the investor portal
//!
//! Entity models persisted to the JSON file store, plus the legacy
//! `{success, data, error}` response envelope used by every API handler.

pub mod models;
pub mod response;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use response::{ApiResponse, DataEnvelope};
