use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::error::AppError;
use shared::models::{Order, OrderItem, OrderItemStatus, OrderItemStatusUpdate, PlaceOrder};

use crate::auth::Principal;
use crate::db;
use crate::db::orders::OrderScope;
use crate::state::AppState;

use super::{ApiResult, customer_session};

#[derive(Deserialize)]
pub struct OrdersQuery {
    pub table: Option<i64>,
}

#[derive(Deserialize)]
pub struct OrderItemsQuery {
    pub status: Option<OrderItemStatus>,
}

/// POST /api/orders (customer)
pub async fn place(
    State(state): State<AppState>,
    principal: Principal,
    Json(data): Json<PlaceOrder>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let token = principal.require_customer()?;
    let session = customer_session(&state, token).await?;
    let order = db::orders::place(&state.pool, &session, &data.order_items).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders?table=
///
/// Customers see their own session's orders; staff name a table.
pub async fn list(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<OrdersQuery>,
) -> ApiResult<Vec<Order>> {
    let scope = match &principal {
        Principal::Customer(token) => OrderScope::Session(customer_session(&state, token).await?.id),
        Principal::Staff(staff) => {
            let table_number = query
                .table
                .ok_or_else(|| AppError::validation("Query parameter `table` is required"))?;
            OrderScope::Table {
                restaurant_id: staff.restaurant_id,
                table_number,
            }
        }
    };
    let orders = db::orders::list(&state.pool, scope).await?;
    Ok(Json(orders))
}

/// GET /api/orders/all (staff)
pub async fn list_all(State(state): State<AppState>, principal: Principal) -> ApiResult<Vec<Order>> {
    let staff = principal.require_staff()?;
    let orders = db::orders::list(&state.pool, OrderScope::Restaurant(staff.restaurant_id)).await?;
    Ok(Json(orders))
}

/// GET /api/order-items?status=
pub async fn list_items(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<OrderItemsQuery>,
) -> ApiResult<Vec<OrderItem>> {
    let (restaurant_id, session_id) = match &principal {
        Principal::Staff(staff) => (staff.restaurant_id, None),
        Principal::Customer(token) => {
            let session = customer_session(&state, token).await?;
            (session.restaurant_id, Some(session.id))
        }
    };
    let items = db::orders::list_items(&state.pool, restaurant_id, session_id, query.status).await?;
    Ok(Json(items))
}

/// PUT /api/order-items/{id}/status (staff)
pub async fn update_status(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
    Json(data): Json<OrderItemStatusUpdate>,
) -> ApiResult<OrderItem> {
    let staff = principal.require_staff()?;
    let item = db::orders::update_item_status(&state.pool, staff.restaurant_id, id, data.status).await?;
    Ok(Json(item))
}
