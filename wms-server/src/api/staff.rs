use axum::{Json, extract::State, http::StatusCode};
use shared::error::AppError;
use shared::models::{Staff, StaffCreate};

use crate::auth::Principal;
use crate::db;
use crate::state::AppState;

use super::ApiResult;
use super::auth::{check_password, hash, normalize_email};

/// POST /api/staff (manager)
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    Json(data): Json<StaffCreate>,
) -> Result<(StatusCode, Json<Staff>), AppError> {
    let manager = principal.require_manager()?;
    let email = normalize_email(&data.email)?;
    check_password(&data.password)?;

    let hashed = hash(&data.password)?;
    let staff = db::staff::create(&state.pool, manager.restaurant_id, &email, &hashed, data.role).await?;
    Ok((StatusCode::CREATED, Json(staff)))
}

/// GET /api/staff (manager): everyone but managers
pub async fn list(State(state): State<AppState>, principal: Principal) -> ApiResult<Vec<Staff>> {
    let manager = principal.require_manager()?;
    let staff = db::staff::list_non_managers(&state.pool, manager.restaurant_id).await?;
    Ok(Json(staff))
}
