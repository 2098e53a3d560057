use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use shared::error::{ApiResponse, AppError};
use shared::models::{DiningTable, TablesAdd};

use crate::auth::Principal;
use crate::db;
use crate::state::AppState;

use super::ApiResult;

#[derive(Debug, Serialize)]
pub struct TablesAdded {
    pub table_numbers: Vec<i64>,
}

/// GET /api/tables (staff)
pub async fn list(State(state): State<AppState>, principal: Principal) -> ApiResult<Vec<DiningTable>> {
    let staff = principal.require_staff()?;
    let tables = db::tables::list(&state.pool, staff.restaurant_id).await?;
    Ok(Json(tables))
}

/// POST /api/tables (manager)
///
/// `{"count": n}` appends n tables after the highest number;
/// `{"number": k}` adds table k. An empty body adds one table.
pub async fn add(
    State(state): State<AppState>,
    principal: Principal,
    Json(data): Json<TablesAdd>,
) -> Result<(StatusCode, Json<TablesAdded>), AppError> {
    let manager = principal.require_manager()?;
    let table_numbers = match (data.count, data.number) {
        (Some(_), Some(_)) => {
            return Err(AppError::validation("Give either count or number, not both"));
        }
        (None, Some(number)) => {
            db::tables::add_number(&state.pool, manager.restaurant_id, number).await?;
            vec![number]
        }
        (count, None) => {
            db::tables::add_count(&state.pool, manager.restaurant_id, count.unwrap_or(1)).await?
        }
    };
    Ok((StatusCode::CREATED, Json(TablesAdded { table_numbers })))
}

/// DELETE /api/tables/{number} (manager)
pub async fn remove(
    State(state): State<AppState>,
    principal: Principal,
    Path(number): Path<i64>,
) -> ApiResult<ApiResponse<()>> {
    let manager = principal.require_manager()?;
    db::tables::delete(&state.pool, manager.restaurant_id, number).await?;
    Ok(Json(ApiResponse::ok()))
}
