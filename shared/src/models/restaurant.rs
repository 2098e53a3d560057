//! Restaurant Model

use serde::{Deserialize, Serialize};

/// Restaurant entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub location: String,
    /// Number of categories owned, equal to the highest category position
    pub num_categories: i64,
    pub created_at: i64,
}

/// Public restaurant lookup result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantLookup {
    pub restaurant_id: i64,
}

/// Restaurant details as seen by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantDetails {
    pub name: String,
    pub location: String,
    /// Present when the caller is a seated customer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_number: Option<i64>,
}
