//! Request identity
//!
//! Every request is made either by a customer seated at a table (holding a
//! session token) or by a staff member (holding a JWT). Handlers receive
//! the resolved [`Principal`] and pass it to the operations they call.

pub mod extractor;
pub mod jwt;
pub mod rate_limit;

use shared::error::{AppError, ErrorCode};
use shared::models::StaffRole;

/// Header carrying a customer's session token
pub const SESSION_TOKEN_HEADER: &str = "x-session-token";

/// Opaque token identifying one customer session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(pub String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Authenticated staff member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaffContext {
    pub staff_id: i64,
    pub restaurant_id: i64,
    pub role: StaffRole,
}

/// Who is making the request
#[derive(Debug, Clone)]
pub enum Principal {
    Customer(SessionToken),
    Staff(StaffContext),
}

impl Principal {
    /// Any staff member
    pub fn require_staff(&self) -> Result<&StaffContext, AppError> {
        match self {
            Principal::Staff(staff) => Ok(staff),
            Principal::Customer(_) => Err(AppError::new(ErrorCode::StaffRequired)),
        }
    }

    pub fn require_manager(&self) -> Result<&StaffContext, AppError> {
        match self {
            Principal::Staff(staff) if staff.role == StaffRole::Manager => Ok(staff),
            Principal::Staff(_) | Principal::Customer(_) => {
                Err(AppError::new(ErrorCode::ManagerRequired))
            }
        }
    }

    pub fn require_customer(&self) -> Result<&SessionToken, AppError> {
        match self {
            Principal::Customer(token) => Ok(token),
            Principal::Staff(_) => Err(AppError::new(ErrorCode::CustomerSessionRequired)),
        }
    }
}
