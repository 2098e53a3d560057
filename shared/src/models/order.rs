//! Order Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fulfilment status of a single ordered unit
///
/// Advances strictly `ORDER SENT -> PREPARED -> SERVED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OrderItemStatus {
    #[serde(rename = "ORDER SENT")]
    OrderSent,
    #[serde(rename = "PREPARED")]
    Prepared,
    #[serde(rename = "SERVED")]
    Served,
}

impl OrderItemStatus {
    /// Parse from database string value
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "ORDER SENT" => Some(Self::OrderSent),
            "PREPARED" => Some(Self::Prepared),
            "SERVED" => Some(Self::Served),
            _ => None,
        }
    }

    /// Database string representation
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::OrderSent => "ORDER SENT",
            Self::Prepared => "PREPARED",
            Self::Served => "SERVED",
        }
    }

    /// The only status this one may advance to
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::OrderSent => Some(Self::Prepared),
            Self::Prepared => Some(Self::Served),
            Self::Served => None,
        }
    }

    /// Whether moving from `self` to `to` is a legal single step
    pub fn can_advance_to(&self, to: Self) -> bool {
        self.next() == Some(to)
    }
}

/// One ordered unit of a menu item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub menu_item_name: String,
    pub price: Decimal,
    pub status: OrderItemStatus,
    pub table_number: i64,
}

/// A batch of items placed at one instant under a customer session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub session_id: i64,
    pub table_number: i64,
    /// Milliseconds since epoch
    pub order_time: i64,
    pub items: Vec<OrderItem>,
}

/// One line of a place-order request
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderLine {
    pub menu_item_id: i64,
    pub quantity: i64,
}

/// Place order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrder {
    #[serde(default)]
    pub order_items: Vec<OrderLine>,
}

/// Order item status update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemStatusUpdate {
    pub status: OrderItemStatus,
}

/// Bill for a table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub table_number: i64,
    /// Sorted by menu item name
    pub items: Vec<OrderItem>,
    pub total: Decimal,
}
