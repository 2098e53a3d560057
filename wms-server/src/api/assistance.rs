use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::AssistanceOutcome;

use crate::auth::Principal;
use crate::db;
use crate::state::AppState;

use super::{ApiResult, customer_session};

#[derive(Debug, Serialize)]
pub struct AssistanceState {
    pub table_number: i64,
    pub need_assistance: bool,
}

#[derive(Debug, Serialize)]
pub struct AssistanceRequested {
    pub outcome: AssistanceOutcome,
}

/// POST /api/assistance (customer)
pub async fn request(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<(StatusCode, Json<AssistanceRequested>), AppError> {
    let token = principal.require_customer()?;
    let session = customer_session(&state, token).await?;
    let outcome = db::sessions::request_assistance(&state.pool, session.id).await?;
    let status = match outcome {
        AssistanceOutcome::Requested => StatusCode::CREATED,
        AssistanceOutcome::AlreadyRequested => StatusCode::OK,
    };
    Ok((status, Json(AssistanceRequested { outcome })))
}

/// POST /api/assistance/{table}/toggle (staff, or the customer at that table)
pub async fn toggle(
    State(state): State<AppState>,
    principal: Principal,
    Path(table_number): Path<i64>,
) -> ApiResult<AssistanceState> {
    let restaurant_id = match &principal {
        Principal::Staff(staff) => staff.restaurant_id,
        Principal::Customer(token) => {
            let session = customer_session(&state, token).await?;
            if session.table_number != table_number {
                return Err(AppError::with_message(
                    ErrorCode::PermissionDenied,
                    "Customers may only change assistance for their own table",
                ));
            }
            session.restaurant_id
        }
    };
    let need_assistance =
        db::sessions::toggle_assistance(&state.pool, restaurant_id, table_number).await?;
    Ok(Json(AssistanceState {
        table_number,
        need_assistance,
    }))
}

/// DELETE /api/assistance/{table} (staff)
pub async fn clear(
    State(state): State<AppState>,
    principal: Principal,
    Path(table_number): Path<i64>,
) -> ApiResult<ApiResponse<()>> {
    let staff = principal.require_staff()?;
    db::sessions::clear_assistance(&state.pool, staff.restaurant_id, table_number).await?;
    Ok(Json(ApiResponse::ok()))
}

/// GET /api/assistance (staff): tables waiting for help
pub async fn list(State(state): State<AppState>, principal: Principal) -> ApiResult<Vec<i64>> {
    let staff = principal.require_staff()?;
    let tables = db::sessions::tables_needing_assistance(&state.pool, staff.restaurant_id).await?;
    Ok(Json(tables))
}
