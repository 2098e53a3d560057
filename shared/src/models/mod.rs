//! Data models
//!
//! Shared between the server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod category;
pub mod dining_table;
pub mod menu_item;
pub mod order;
pub mod restaurant;
pub mod session;
pub mod staff;

// Re-exports
pub use category::*;
pub use dining_table::*;
pub use menu_item::*;
pub use order::*;
pub use restaurant::*;
pub use session::*;
pub use staff::*;
