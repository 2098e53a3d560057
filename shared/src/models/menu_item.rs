//! Menu Item Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Dietary tag carried by a menu item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DietaryRequirement {
    #[default]
    #[serde(rename = "")]
    None,
    #[serde(rename = "DF")]
    DairyFree,
    #[serde(rename = "GF")]
    GlutenFree,
    #[serde(rename = "V")]
    Vegetarian,
    #[serde(rename = "VG")]
    Vegan,
}

impl DietaryRequirement {
    /// Parse from database string value
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "" => Some(Self::None),
            "DF" => Some(Self::DairyFree),
            "GF" => Some(Self::GlutenFree),
            "V" => Some(Self::Vegetarian),
            "VG" => Some(Self::Vegan),
            _ => None,
        }
    }

    /// Database string representation
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::DairyFree => "DF",
            Self::GlutenFree => "GF",
            Self::Vegetarian => "V",
            Self::Vegan => "VG",
        }
    }
}

/// Menu item entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: i64,
    pub restaurant_id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub dietary_requirements: DietaryRequirement,
    /// Minutes
    pub preparation_time: i64,
    pub popular: bool,
    pub image: Option<String>,
    /// Dense 1-based position within the category
    pub position: i64,
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemCreate {
    pub category_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub dietary_requirements: DietaryRequirement,
    #[serde(default)]
    pub preparation_time: i64,
    #[serde(default)]
    pub popular: bool,
    pub image: Option<String>,
}

/// Update menu item payload
///
/// Setting `category_id` moves the item to the end of that category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemUpdate {
    pub category_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub dietary_requirements: Option<DietaryRequirement>,
    pub preparation_time: Option<i64>,
    pub popular: Option<bool>,
    pub image: Option<String>,
}

/// One entry of a menu item reorder
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MenuItemPosition {
    pub menu_item_id: i64,
    pub new_position: i64,
}

/// Bulk menu item reorder payload, scoped to one category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemReorder {
    pub category_id: i64,
    pub menu_items: Vec<MenuItemPosition>,
}
