//! Customer Session Model

use serde::{Deserialize, Serialize};

/// A live customer session holding one table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CustomerSession {
    pub id: i64,
    pub restaurant_id: i64,
    pub table_number: i64,
    /// Opaque token the customer presents on later requests
    pub token: String,
    pub need_assistance: bool,
    pub created_at: i64,
}

/// Successful outcome of claiming a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimOutcome {
    /// A new session was created for the table
    Created,
    /// The caller already held the table
    Reconnected,
}

/// Claim table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimTable {
    pub restaurant_id: i64,
    pub table_number: i64,
}

/// Claim table response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimResponse {
    pub outcome: ClaimOutcome,
    pub token: String,
    pub restaurant_id: i64,
    pub table_number: i64,
}

/// Result of a customer's assistance request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssistanceOutcome {
    /// The call was newly raised
    Requested,
    /// A call was already in progress
    AlreadyRequested,
}
