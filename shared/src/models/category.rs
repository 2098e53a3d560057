//! Category Model

use serde::{Deserialize, Serialize};

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    /// Dense 1-based position among the restaurant's categories
    pub position: i64,
    /// Number of menu items owned, equal to the highest item position
    pub num_menu_items: i64,
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
}

/// Update category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
}

/// One entry of a category reorder
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CategoryPosition {
    pub category_id: i64,
    pub new_position: i64,
}

/// Bulk category reorder payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryReorder {
    pub categories: Vec<CategoryPosition>,
}
