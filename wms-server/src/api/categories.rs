use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::error::{ApiResponse, AppError};
use shared::models::{Category, CategoryCreate, CategoryReorder, CategoryUpdate};

use crate::auth::Principal;
use crate::db;
use crate::state::AppState;

use super::{ApiResult, restaurant_scope};

/// GET /api/categories (customer or staff), in position order
pub async fn list(State(state): State<AppState>, principal: Principal) -> ApiResult<Vec<Category>> {
    let restaurant_id = restaurant_scope(&state, &principal).await?;
    let categories = db::categories::list(&state.pool, restaurant_id).await?;
    Ok(Json(categories))
}

/// GET /api/categories/{id}
pub async fn get_one(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> ApiResult<Category> {
    let restaurant_id = restaurant_scope(&state, &principal).await?;
    let category = db::categories::get(&state.pool, restaurant_id, id).await?;
    Ok(Json(category))
}

/// POST /api/categories (manager)
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    Json(data): Json<CategoryCreate>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let manager = principal.require_manager()?;
    let category = db::categories::create(&state.pool, manager.restaurant_id, &data.name).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/categories/{id} (manager): rename
pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
    Json(data): Json<CategoryUpdate>,
) -> ApiResult<Category> {
    let manager = principal.require_manager()?;
    let category = match data.name {
        Some(name) => db::categories::rename(&state.pool, manager.restaurant_id, id, &name).await?,
        None => db::categories::get(&state.pool, manager.restaurant_id, id).await?,
    };
    Ok(Json(category))
}

/// DELETE /api/categories/{id} (manager)
pub async fn remove(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<()>> {
    let manager = principal.require_manager()?;
    db::categories::delete(&state.pool, manager.restaurant_id, id).await?;
    Ok(Json(ApiResponse::ok()))
}

/// PUT /api/categories/positions (manager)
pub async fn reposition(
    State(state): State<AppState>,
    principal: Principal,
    Json(data): Json<CategoryReorder>,
) -> ApiResult<Vec<Category>> {
    let manager = principal.require_manager()?;
    db::categories::reposition(&state.pool, manager.restaurant_id, &data.categories).await?;
    let categories = db::categories::list(&state.pool, manager.restaurant_id).await?;
    Ok(Json(categories))
}
