//! Shared types for the WMS ordering platform
//!
//! Error codes, API response envelope and domain models used by the
//! server and by API clients.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};
