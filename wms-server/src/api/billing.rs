use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::Bill;

use crate::auth::Principal;
use crate::db;
use crate::state::AppState;

use super::{ApiResult, customer_session};

/// GET /api/bill (customer)
pub async fn bill(State(state): State<AppState>, principal: Principal) -> ApiResult<Bill> {
    let token = principal.require_customer()?;
    let session = customer_session(&state, token).await?;
    let bill = db::orders::bill(&state.pool, session.restaurant_id, session.table_number).await?;
    Ok(Json(bill))
}

/// GET /api/bill/{table} (staff)
pub async fn staff_bill(
    State(state): State<AppState>,
    principal: Principal,
    Path(table_number): Path<i64>,
) -> ApiResult<Bill> {
    let staff = principal.require_staff()?;
    let bill = db::orders::bill(&state.pool, staff.restaurant_id, table_number).await?;
    Ok(Json(bill))
}
