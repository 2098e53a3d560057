use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::error::{ApiResponse, AppError};
use shared::models::{MenuItem, MenuItemCreate, MenuItemReorder, MenuItemUpdate};

use crate::auth::Principal;
use crate::db;
use crate::state::AppState;

use super::{ApiResult, restaurant_scope};

#[derive(Deserialize)]
pub struct MenuItemQuery {
    pub category_id: Option<i64>,
}

/// GET /api/menu-items?category_id= (customer or staff)
pub async fn list(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<MenuItemQuery>,
) -> ApiResult<Vec<MenuItem>> {
    let restaurant_id = restaurant_scope(&state, &principal).await?;
    if let Some(category_id) = query.category_id {
        db::categories::get(&state.pool, restaurant_id, category_id).await?;
    }
    let items = db::menu_items::list(&state.pool, restaurant_id, query.category_id).await?;
    Ok(Json(items))
}

/// GET /api/menu-items/{id}
pub async fn get_one(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> ApiResult<MenuItem> {
    let restaurant_id = restaurant_scope(&state, &principal).await?;
    let item = db::menu_items::get(&state.pool, restaurant_id, id).await?;
    Ok(Json(item))
}

/// POST /api/menu-items (manager)
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    Json(data): Json<MenuItemCreate>,
) -> Result<(StatusCode, Json<MenuItem>), AppError> {
    let manager = principal.require_manager()?;
    let item = db::menu_items::create(&state.pool, manager.restaurant_id, &data).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/menu-items/{id} (manager)
pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
    Json(data): Json<MenuItemUpdate>,
) -> ApiResult<MenuItem> {
    let manager = principal.require_manager()?;
    let item = db::menu_items::update(&state.pool, manager.restaurant_id, id, &data).await?;
    Ok(Json(item))
}

/// DELETE /api/menu-items/{id} (manager)
pub async fn remove(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<()>> {
    let manager = principal.require_manager()?;
    db::menu_items::delete(&state.pool, manager.restaurant_id, id).await?;
    Ok(Json(ApiResponse::ok()))
}

/// PUT /api/menu-items/positions (manager)
pub async fn reposition(
    State(state): State<AppState>,
    principal: Principal,
    Json(data): Json<MenuItemReorder>,
) -> ApiResult<Vec<MenuItem>> {
    let manager = principal.require_manager()?;
    db::menu_items::reposition(
        &state.pool,
        manager.restaurant_id,
        data.category_id,
        &data.menu_items,
    )
    .await?;
    let items =
        db::menu_items::list(&state.pool, manager.restaurant_id, Some(data.category_id)).await?;
    Ok(Json(items))
}
