//! Dining Table Model

use serde::{Deserialize, Serialize};

/// A table and whether a customer session currently holds it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub table_number: i64,
    pub is_occupied: bool,
}

/// Add tables payload
///
/// `count` appends that many tables after the highest existing number;
/// `number` adds one specific table number. Exactly one must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TablesAdd {
    pub count: Option<i64>,
    pub number: Option<i64>,
}
