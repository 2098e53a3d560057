//! wms-server: restaurant front-of-house ordering service
//!
//! - `db`: SQLite persistence, dense menu ordering, table claims
//! - `auth`: staff JWTs, customer session tokens, rate limiting
//! - `api`: axum router and handlers
//! - `email` / `stripe`: outbound collaborators

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod state;
pub mod stripe;
pub mod util;

pub use config::Config;
pub use state::AppState;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
